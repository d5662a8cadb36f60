//! The query-lowering engine: turns a catalog and a list of parsed queries
//! into the source fragments of a typed data-access layer for one target
//! driver variant.
//!
//! The engine itself is a single-pass, synchronous, side-effect-free
//! transform. The only mutation is the parameter-name synthesis pass that
//! runs once at construction; generation afterwards is pure and queries are
//! processed independently.

pub mod driver;
pub use driver::{Driver, MysqlDriver, PostgresDriver, SqliteDriver};

pub mod generate;

pub mod host;
pub use host::HostType;

pub mod mapping;
pub use mapping::{DbType, TypeMapping};

pub mod output;
pub use output::{GeneratedQuery, Output};

pub mod params;

use quarry_core::{Catalog, CatalogIr, Options, Query, Result};

use std::collections::BTreeSet;
use tracing::debug;

/// Emitted into every run's utils: generated methods surface driver errors
/// behind one boxed alias.
const ERROR_ALIAS: &str = "pub type Error = Box<dyn std::error::Error + Send + Sync>;";

/// One generation run over a catalog and its queries.
pub struct Generator {
    driver: Box<dyn Driver>,
    queries: Vec<Query>,
}

impl Generator {
    pub fn new(options: Options, catalog: &CatalogIr, mut queries: Vec<Query>) -> Result<Self> {
        debug!(
            driver = options.driver.as_str(),
            queries = queries.len(),
            "initializing query-lowering engine"
        );

        let driver = driver::new_driver(options, Catalog::from_ir(catalog));
        for query in &mut queries {
            params::synthesize_param_names(driver.as_ref(), query)?;
        }

        Ok(Self { driver, queries })
    }

    pub fn driver(&self) -> &dyn Driver {
        self.driver.as_ref()
    }

    pub fn queries(&self) -> &[Query] {
        &self.queries
    }

    pub fn generate(&self) -> Result<Output> {
        let mut queries = Vec::with_capacity(self.queries.len());
        let mut uses: BTreeSet<String> = self
            .driver
            .base_uses()
            .into_iter()
            .map(str::to_string)
            .collect();

        for query in &self.queries {
            debug!(query = %query.name, cmd = ?query.cmd, "lowering query");
            let generated = generate::query_fragments(self.driver.as_ref(), query)?;
            uses.extend(generated.uses.iter().cloned());
            queries.push(generated);
        }

        let mut utils = vec![ERROR_ALIAS.to_string()];
        if self.driver.expands_slices() && self.queries.iter().any(Query::has_slice_param) {
            utils.push(generate::slice_helper(self.driver.slice_prefix()));
        }
        utils.extend(
            self.driver
                .orm_adapters(&self.queries)
                .iter()
                .map(|adapter| adapter.to_string()),
        );

        Ok(Output {
            models: generate::common::model_structs(self.driver.as_ref(), &self.queries)?,
            scaffold: self.driver.scaffold(),
            utils,
            uses,
            package_references: self.driver.package_references(&self.queries),
            queries,
        })
    }
}

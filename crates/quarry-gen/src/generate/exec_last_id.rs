use super::{common, MethodPair};
use crate::driver::Driver;

use quarry_core::{Error, Query, Result};

pub(super) fn generate(driver: &dyn Driver, query: &Query) -> Result<MethodPair> {
    let id_column = driver
        .id_column(query)
        .cloned()
        .ok_or_else(|| Error::UnsupportedType {
            column: "id".to_string(),
            ty: String::new(),
            driver: driver.name(),
        })?;
    let return_type = driver.rust_type(&id_column, Some(query))?;

    let raw = common::assemble_raw_method(driver, query, &return_type)?;
    let orm = if driver.options().use_orm {
        Some(common::assemble_orm_method(driver, query, &return_type)?)
    } else {
        None
    };
    Ok(MethodPair { raw, orm })
}

//! Parameter deduplication, validation, and name synthesis.

use crate::driver::Driver;

use quarry_core::{Error, Parameter, Query, Result};

use indexmap::IndexMap;

/// Collapses repeated named parameters down to one representative per name,
/// preserving first-occurrence order.
///
/// The same named placeholder reused at several SQL positions arrives as
/// several parameters sharing a column name; that is expected and collapses
/// silently. Two same-named parameters that disagree on effective
/// nullability are a hard error: the generated argument field could not be
/// both optional and required.
pub fn deduplicate<'a>(driver: &dyn Driver, query: &'a Query) -> Result<Vec<&'a Parameter>> {
    let mut unique: IndexMap<&str, &Parameter> = IndexMap::new();

    for param in &query.params {
        let name = param.column.name.as_str();
        match unique.get(name) {
            Some(first) => {
                let first_not_null = driver.effective_not_null(&first.column, Some(query));
                let not_null = driver.effective_not_null(&param.column, Some(query));
                if first_not_null != not_null {
                    return Err(Error::ConflictingNullability {
                        ident: name.to_string(),
                        query: query.name.clone(),
                    });
                }
            }
            None => {
                unique.insert(name, param);
            }
        }
    }

    Ok(unique.into_values().collect())
}

/// The distinct parameter names of a query in first-occurrence order,
/// without nullability validation. Drivers that render positional
/// placeholders index into this list.
pub fn unique_names(query: &Query) -> Vec<&str> {
    let mut names: Vec<&str> = Vec::new();
    for param in &query.params {
        let name = param.column.name.as_str();
        if !names.contains(&name) {
            names.push(name);
        }
    }
    names
}

/// Name-synthesis pass: assigns a deterministic name to every parameter the
/// parser left unnamed, derived from the resolved host type and the
/// parameter number. Runs once when the engine is constructed; every later
/// pass sees fully-named parameters and stays pure.
pub fn synthesize_param_names(driver: &dyn Driver, query: &mut Query) -> Result<()> {
    let mut synthesized: Vec<Option<String>> = Vec::with_capacity(query.params.len());

    for param in &query.params {
        if param.column.name.is_empty() {
            let slug = driver.type_slug(&param.column, Some(query))?;
            synthesized.push(Some(format!("{}_{}", slug, param.number)));
        } else {
            synthesized.push(None);
        }
    }

    for (param, name) in query.params.iter_mut().zip(synthesized) {
        if let Some(name) = name {
            param.column.name = name;
        }
    }

    Ok(())
}

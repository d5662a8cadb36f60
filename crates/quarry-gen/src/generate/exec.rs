use super::{common, MethodPair};
use crate::driver::Driver;

use quarry_core::{Query, Result};

pub(super) fn generate(driver: &dyn Driver, query: &Query) -> Result<MethodPair> {
    let raw = common::assemble_raw_method(driver, query, "()")?;
    let orm = if driver.options().use_orm {
        Some(common::assemble_orm_method(driver, query, "()")?)
    } else {
        None
    };
    Ok(MethodPair { raw, orm })
}

use super::{common, MethodPair};
use crate::driver::Driver;

use quarry_core::{Query, Result};

pub(super) fn generate(driver: &dyn Driver, query: &Query) -> Result<MethodPair> {
    let return_type = format!("Vec<{}>", common::row_type_name(query));

    let raw = common::assemble_raw_method(driver, query, &return_type)?;
    let orm = if driver.options().use_orm {
        Some(common::assemble_orm_method(driver, query, &return_type)?)
    } else {
        None
    };
    Ok(MethodPair { raw, orm })
}

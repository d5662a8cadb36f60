use super::{common, MethodPair};
use crate::driver::Driver;

use quarry_core::{Query, Result};

/// Bulk-copy queries stream rows through the driver's bulk-load path; there
/// is no transaction dispatch and no ORM variant.
pub(super) fn generate(driver: &dyn Driver, query: &Query) -> Result<MethodPair> {
    let body = driver.copy_from_body(query)?;
    let async_kw = if driver.is_async() { "async " } else { "" };
    let name = common::method_name(query);
    let args = common::args_type_name(query);
    let self_param = driver.raw_self_param();

    let raw = format!(
        "pub {async_kw}fn {name}({self_param}, rows: Vec<{args}>) -> Result<u64, Error> {{\n{}\n}}",
        common::indent(&body, 4)
    );
    Ok(MethodPair { raw, orm: None })
}

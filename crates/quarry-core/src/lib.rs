pub mod catalog;
pub use catalog::Catalog;

pub mod error;
pub use error::{Error, Result};

pub mod ir;
pub use ir::{CatalogIr, Column, CommandKind, Parameter, Query, SchemaIr, Table, TableRef};

pub mod options;
pub use options::{DriverKind, Options, Override, OverrideType, RuntimeFlavor};

use crate::Result;

use serde::{Deserialize, Serialize};

/// Engine configuration, deserialized from the plugin options document.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Options {
    /// The target driver variant.
    pub driver: DriverKind,

    /// When true, generate the ORM-helper execution path alongside the raw
    /// driver path.
    pub use_orm: bool,

    /// Target runtime flavor; affects which host types receive a nullable
    /// projection.
    pub runtime: RuntimeFlavor,

    /// User type overrides, consulted before the general mapping table.
    pub overrides: Vec<Override>,

    /// Version pins for the optional external packages the generated code
    /// may reference. Unset pins fall back to the engine defaults.
    pub orm_version: Option<String>,
    pub json_version: Option<String>,
    pub time_version: Option<String>,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            driver: DriverKind::Postgres,
            use_orm: false,
            runtime: RuntimeFlavor::Modern,
            overrides: vec![],
            orm_version: None,
            json_version: None,
            time_version: None,
        }
    }
}

impl Options {
    pub fn from_json(raw: &str) -> Result<Self> {
        Ok(serde_json::from_str(raw)?)
    }
}

/// One supported database backend + execution runtime combination.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DriverKind {
    #[serde(rename = "postgresql")]
    Postgres,
    #[serde(rename = "mysql")]
    Mysql,
    #[serde(rename = "sqlite")]
    Sqlite,
}

impl DriverKind {
    pub fn as_str(self) -> &'static str {
        match self {
            DriverKind::Postgres => "postgresql",
            DriverKind::Mysql => "mysql",
            DriverKind::Sqlite => "sqlite",
        }
    }
}

/// The runtime flavor the generated code targets.
///
/// `Modern` treats every non-primitive host type as inherently nullable;
/// `Legacy` restricts the nullable projection to the fixed value-like set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RuntimeFlavor {
    Modern,
    Legacy,
}

impl RuntimeFlavor {
    pub fn is_modern(self) -> bool {
        matches!(self, RuntimeFlavor::Modern)
    }

    pub fn is_legacy(self) -> bool {
        matches!(self, RuntimeFlavor::Legacy)
    }
}

/// A user-declared rule forcing a specific host type/nullability for the
/// columns matching `column`, which is either `"queryName:columnName"` or
/// the wildcard form `"*:columnName"`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Override {
    pub column: String,
    pub rust_type: OverrideType,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OverrideType {
    #[serde(rename = "type")]
    pub ty: String,
    #[serde(default)]
    pub not_null: bool,
}

impl Override {
    pub fn matches(&self, query_name: &str, column_name: &str) -> bool {
        let mut parts = self.column.splitn(2, ':');
        let (query, column) = match (parts.next(), parts.next()) {
            (Some(query), Some(column)) => (query, column),
            _ => return false,
        };
        (query == "*" || query == query_name) && column == column_name
    }
}

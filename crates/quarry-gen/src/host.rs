//! The closed set of host types generated code can carry.
//!
//! Each driver's mapping table associates source type names with one of
//! these variants. Keeping the set closed (instead of passing type names
//! around as strings) lets the nullability rules and slug synthesis match
//! on it directly.

/// A Rust-side type that a database column can resolve to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HostType {
    Bool,
    I8,
    I16,
    I32,
    I64,
    F32,
    F64,
    Decimal,
    String,
    Bytes,
    Uuid,
    Date,
    Time,
    DateTime,
    DateTimeUtc,
    Json,
    IpAddr,
    /// Fallback for columns whose source type the parser left empty
    /// (synthesized expression columns and untyped literals).
    Object,
}

impl HostType {
    /// The rendered Rust type name. Types with an entry in
    /// [`HostType::uses`] render unqualified.
    pub fn render(self) -> &'static str {
        match self {
            HostType::Bool => "bool",
            HostType::I8 => "i8",
            HostType::I16 => "i16",
            HostType::I32 => "i32",
            HostType::I64 => "i64",
            HostType::F32 => "f32",
            HostType::F64 => "f64",
            HostType::Decimal => "Decimal",
            HostType::String => "String",
            HostType::Bytes => "Vec<u8>",
            HostType::Uuid => "Uuid",
            HostType::Date => "NaiveDate",
            HostType::Time => "NaiveTime",
            HostType::DateTime => "NaiveDateTime",
            HostType::DateTimeUtc => "DateTime<Utc>",
            HostType::Json | HostType::Object => "serde_json::Value",
            HostType::IpAddr => "IpAddr",
        }
    }

    /// Import paths the rendered name relies on.
    pub fn uses(self) -> &'static [&'static str] {
        match self {
            HostType::Decimal => &["rust_decimal::Decimal"],
            HostType::Uuid => &["uuid::Uuid"],
            HostType::Date => &["chrono::NaiveDate"],
            HostType::Time => &["chrono::NaiveTime"],
            HostType::DateTime => &["chrono::NaiveDateTime"],
            HostType::DateTimeUtc => &["chrono::DateTime", "chrono::Utc"],
            HostType::IpAddr => &["std::net::IpAddr"],
            _ => &[],
        }
    }

    /// Value-like types always support a nullable (`Option`) projection;
    /// the remaining types only do so under the modern runtime flavor.
    pub fn is_value_like(self) -> bool {
        !matches!(self, HostType::String | HostType::Bytes | HostType::Object)
    }

    /// Identifier fragment used when synthesizing names for unnamed
    /// parameters.
    pub fn slug(self) -> &'static str {
        match self {
            HostType::Bool => "bool",
            HostType::I8 => "i8",
            HostType::I16 => "i16",
            HostType::I32 => "i32",
            HostType::I64 => "i64",
            HostType::F32 => "f32",
            HostType::F64 => "f64",
            HostType::Decimal => "decimal",
            HostType::String => "string",
            HostType::Bytes => "bytes",
            HostType::Uuid => "uuid",
            HostType::Date => "date",
            HostType::Time => "time",
            HostType::DateTime => "date_time",
            HostType::DateTimeUtc => "timestamp",
            HostType::Json => "json",
            HostType::IpAddr => "ip_addr",
            HostType::Object => "object",
        }
    }

    /// Parses a user-supplied type name from an override rule. Accepts the
    /// rendered name plus the common fully-qualified spellings.
    pub fn parse(name: &str) -> Option<Self> {
        Some(match name {
            "bool" => HostType::Bool,
            "i8" => HostType::I8,
            "i16" => HostType::I16,
            "i32" => HostType::I32,
            "i64" => HostType::I64,
            "f32" => HostType::F32,
            "f64" => HostType::F64,
            "Decimal" | "rust_decimal::Decimal" => HostType::Decimal,
            "String" | "str" => HostType::String,
            "Vec<u8>" => HostType::Bytes,
            "Uuid" | "uuid::Uuid" => HostType::Uuid,
            "NaiveDate" | "chrono::NaiveDate" => HostType::Date,
            "NaiveTime" | "chrono::NaiveTime" => HostType::Time,
            "NaiveDateTime" | "chrono::NaiveDateTime" => HostType::DateTime,
            "DateTime<Utc>" | "chrono::DateTime<chrono::Utc>" => HostType::DateTimeUtc,
            "serde_json::Value" | "Json" => HostType::Json,
            "IpAddr" | "std::net::IpAddr" => HostType::IpAddr,
            _ => return None,
        })
    }
}

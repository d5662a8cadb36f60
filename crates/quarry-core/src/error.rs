/// An error that can occur while lowering queries.
///
/// Every variant is fatal for the generation run: a silently-wrong type
/// mapping would propagate through many queries, so no partial output is
/// produced and nothing is retried.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// No type mapping entry matches a column's source type/length.
    #[error("column {column} has unsupported column type: {ty} in {driver} driver")]
    UnsupportedType {
        column: String,
        ty: String,
        driver: &'static str,
    },

    /// Two same-named parameters disagree on nullability.
    #[error(
        "duplicate identifier '{ident}' used on nullable and non-nullable arguments in query '{query}'"
    )]
    ConflictingNullability { ident: String, query: String },

    /// A resolved host type has no registered scalar conversion function.
    #[error("no conversion function registered for id column type {ty} in {driver} driver")]
    MissingConvertFunc { ty: String, driver: &'static str },

    /// An array column resolved to a mapping without an array reader.
    #[error("no array reader registered for type {ty} in {driver} driver")]
    MissingArrayReader { ty: String, driver: &'static str },

    /// The plugin options document could not be deserialized.
    #[error("invalid engine options: {0}")]
    InvalidOptions(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

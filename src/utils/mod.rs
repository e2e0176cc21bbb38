pub mod config;
pub mod errors;

pub use config::{AppConfig, ColumnNames, EntryConfig, EntryOptions};
pub use errors::{CsvEachError, Result, StepError};

/// Strips leading and trailing whitespace, including the byte-order mark.
/// NEL (U+0085) is kept: it is a line terminator, not padding.
pub fn trim_whitespace(value: &str) -> &str {
    value.trim_matches(|c: char| (c.is_whitespace() && c != '\u{85}') || c == '\u{feff}')
}

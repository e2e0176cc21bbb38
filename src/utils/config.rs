use crate::utils::errors::{CsvEachError, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::PathBuf;

/// How the header of an operation is obtained.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "ColumnNamesRepr", into = "ColumnNamesRepr")]
pub enum ColumnNames {
    /// Derive the header from the first line of the file.
    #[default]
    Auto,
    /// Use these names; the first line is data unless `skip_first_line` is set.
    Explicit(Vec<String>),
}

#[derive(Clone, Serialize, Deserialize)]
#[serde(untagged)]
enum ColumnNamesRepr {
    Keyword(String),
    Names(Vec<String>),
}

impl TryFrom<ColumnNamesRepr> for ColumnNames {
    type Error = String;

    fn try_from(repr: ColumnNamesRepr) -> std::result::Result<Self, Self::Error> {
        match repr {
            ColumnNamesRepr::Keyword(k) if k == "auto" => Ok(ColumnNames::Auto),
            ColumnNamesRepr::Keyword(k) => {
                Err(format!("expected \"auto\" or a list of names, got {:?}", k))
            }
            ColumnNamesRepr::Names(names) => Ok(ColumnNames::Explicit(names)),
        }
    }
}

impl From<ColumnNames> for ColumnNamesRepr {
    fn from(names: ColumnNames) -> Self {
        match names {
            ColumnNames::Auto => ColumnNamesRepr::Keyword("auto".to_string()),
            ColumnNames::Explicit(names) => ColumnNamesRepr::Names(names),
        }
    }
}

/// Fully resolved options for one operation. Never mutated once built.
#[derive(Debug, Clone, PartialEq)]
pub struct EntryOptions {
    pub delimiter: char,
    pub trim_line: bool,
    pub trim_columns: bool,
    pub raise_on_empty_lines: bool,
    pub raise_on_missing_columns: bool,
    pub raise_on_extra_columns: bool,
    pub return_lines: bool,
    pub return_arrays: bool,
    pub handle_quotes: bool,
    /// Substituted for empty columns. The empty string disables substitution.
    pub default_value_on_empty_column: Value,
    pub default_value_on_missing_column: Value,
    pub column_names: ColumnNames,
    pub skip_first_line: bool,
    pub skip_empty_lines: bool,
}

impl Default for EntryOptions {
    fn default() -> Self {
        Self {
            delimiter: ',',
            trim_line: false,
            trim_columns: false,
            raise_on_empty_lines: true,
            raise_on_missing_columns: true,
            raise_on_extra_columns: true,
            return_lines: false,
            return_arrays: false,
            handle_quotes: true,
            default_value_on_empty_column: Value::String(String::new()),
            default_value_on_missing_column: Value::Null,
            column_names: ColumnNames::Auto,
            skip_first_line: false,
            skip_empty_lines: false,
        }
    }
}

impl EntryOptions {
    pub fn substitutes_empty_columns(&self) -> bool {
        self.default_value_on_empty_column != Value::String(String::new())
    }
}

/// One configuration layer. Unset fields fall through to the next layer
/// on [`EntryConfig::merge`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EntryConfig {
    pub filename: Option<PathBuf>,
    pub delimiter: Option<char>,
    pub trim_line: Option<bool>,
    pub trim_columns: Option<bool>,
    pub raise_on_empty_lines: Option<bool>,
    pub raise_on_missing_columns: Option<bool>,
    pub raise_on_extra_columns: Option<bool>,
    pub return_lines: Option<bool>,
    pub return_arrays: Option<bool>,
    pub handle_quotes: Option<bool>,
    pub default_value_on_empty_column: Option<Value>,
    pub default_value_on_missing_column: Option<Value>,
    pub column_names: Option<ColumnNames>,
    pub skip_first_line: Option<bool>,
    pub skip_empty_lines: Option<bool>,
}

impl From<EntryOptions> for EntryConfig {
    fn from(o: EntryOptions) -> Self {
        Self {
            filename: None,
            delimiter: Some(o.delimiter),
            trim_line: Some(o.trim_line),
            trim_columns: Some(o.trim_columns),
            raise_on_empty_lines: Some(o.raise_on_empty_lines),
            raise_on_missing_columns: Some(o.raise_on_missing_columns),
            raise_on_extra_columns: Some(o.raise_on_extra_columns),
            return_lines: Some(o.return_lines),
            return_arrays: Some(o.return_arrays),
            handle_quotes: Some(o.handle_quotes),
            default_value_on_empty_column: Some(o.default_value_on_empty_column),
            default_value_on_missing_column: Some(o.default_value_on_missing_column),
            column_names: Some(o.column_names),
            skip_first_line: Some(o.skip_first_line),
            skip_empty_lines: Some(o.skip_empty_lines),
        }
    }
}

fn required<T>(value: Option<T>, name: &'static str) -> Result<T> {
    value.ok_or(CsvEachError::MissingRequiredOption(name))
}

impl EntryConfig {
    /// Built-in defaults for every option. `filename` stays unset.
    pub fn defaults() -> Self {
        EntryOptions::default().into()
    }

    pub fn with_filename(mut self, filename: impl Into<PathBuf>) -> Self {
        self.filename = Some(filename.into());
        self
    }

    /// Fields set on `self` win; the rest come from `fallback`.
    pub fn merge(self, fallback: &EntryConfig) -> EntryConfig {
        EntryConfig {
            filename: self.filename.or_else(|| fallback.filename.clone()),
            delimiter: self.delimiter.or(fallback.delimiter),
            trim_line: self.trim_line.or(fallback.trim_line),
            trim_columns: self.trim_columns.or(fallback.trim_columns),
            raise_on_empty_lines: self.raise_on_empty_lines.or(fallback.raise_on_empty_lines),
            raise_on_missing_columns: self
                .raise_on_missing_columns
                .or(fallback.raise_on_missing_columns),
            raise_on_extra_columns: self
                .raise_on_extra_columns
                .or(fallback.raise_on_extra_columns),
            return_lines: self.return_lines.or(fallback.return_lines),
            return_arrays: self.return_arrays.or(fallback.return_arrays),
            handle_quotes: self.handle_quotes.or(fallback.handle_quotes),
            default_value_on_empty_column: self
                .default_value_on_empty_column
                .or_else(|| fallback.default_value_on_empty_column.clone()),
            default_value_on_missing_column: self
                .default_value_on_missing_column
                .or_else(|| fallback.default_value_on_missing_column.clone()),
            column_names: self
                .column_names
                .or_else(|| fallback.column_names.clone()),
            skip_first_line: self.skip_first_line.or(fallback.skip_first_line),
            skip_empty_lines: self.skip_empty_lines.or(fallback.skip_empty_lines),
        }
    }

    /// Checks that the source path and every option are present.
    pub fn resolve(self) -> Result<(PathBuf, EntryOptions)> {
        let filename = required(self.filename.clone(), "filename")?;
        let options = self.into_options()?;
        Ok((filename, options))
    }

    /// Like [`EntryConfig::resolve`] without requiring a source path.
    pub fn into_options(self) -> Result<EntryOptions> {
        let options = EntryOptions {
            delimiter: required(self.delimiter, "delimiter")?,
            trim_line: required(self.trim_line, "trim_line")?,
            trim_columns: required(self.trim_columns, "trim_columns")?,
            raise_on_empty_lines: required(self.raise_on_empty_lines, "raise_on_empty_lines")?,
            raise_on_missing_columns: required(
                self.raise_on_missing_columns,
                "raise_on_missing_columns",
            )?,
            raise_on_extra_columns: required(
                self.raise_on_extra_columns,
                "raise_on_extra_columns",
            )?,
            return_lines: required(self.return_lines, "return_lines")?,
            return_arrays: required(self.return_arrays, "return_arrays")?,
            handle_quotes: required(self.handle_quotes, "handle_quotes")?,
            default_value_on_empty_column: required(
                self.default_value_on_empty_column,
                "default_value_on_empty_column",
            )?,
            default_value_on_missing_column: required(
                self.default_value_on_missing_column,
                "default_value_on_missing_column",
            )?,
            column_names: required(self.column_names, "column_names")?,
            skip_first_line: required(self.skip_first_line, "skip_first_line")?,
            skip_empty_lines: required(self.skip_empty_lines, "skip_empty_lines")?,
        };

        if let ColumnNames::Explicit(names) = &options.column_names {
            if let Some(position) = names.iter().position(|n| n.is_empty()) {
                return Err(CsvEachError::InvalidOption {
                    name: "column_names",
                    reason: format!("column name at position {} is empty", position),
                });
            }
        }

        Ok(options)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub reader: ReaderConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub entry: EntryConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReaderConfig {
    /// How many lines the file reader may run ahead of the pipeline.
    pub read_ahead_lines: usize,
}

impl Default for ReaderConfig {
    fn default() -> Self {
        Self {
            read_ahead_lines: 64,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "plain".to_string(),
        }
    }
}

impl AppConfig {
    pub fn load_from_file(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| CsvEachError::ConfigError(format!("{}: {}", path, e)))?;
        toml::from_str(&content)
            .map_err(|e| CsvEachError::ConfigError(format!("{}: {}", path, e)))
    }

    /// Defaults when `path` is unset or names no file. A file that exists but
    /// cannot be read or parsed is an error.
    pub fn load_or_default(path: Option<&str>) -> Result<Self> {
        match path {
            Some(p) if std::path::Path::new(p).exists() => Self::load_from_file(p),
            _ => Ok(Self::default()),
        }
    }
}

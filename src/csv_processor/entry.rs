use crate::utils::{CsvEachError, Result};
use serde::Serialize;
use serde_json::{Map, Value};

/// Value handed to the caller's step for one line.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Entry {
    /// Raw line text, when `return_lines` is set.
    Line(String),
    /// Column values in file order, when `return_arrays` is set.
    Array(Vec<Value>),
    /// Column values keyed by header name, in header order.
    Record(Map<String, Value>),
}

impl Entry {
    pub fn as_line(&self) -> Option<&str> {
        match self {
            Entry::Line(line) => Some(line),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[Value]> {
        match self {
            Entry::Array(values) => Some(values),
            _ => None,
        }
    }

    pub fn as_record(&self) -> Option<&Map<String, Value>> {
        match self {
            Entry::Record(record) => Some(record),
            _ => None,
        }
    }

    /// Looks up a column by header name. Only records have names.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.as_record().and_then(|record| record.get(name))
    }

    pub fn into_value(self) -> Value {
        match self {
            Entry::Line(line) => Value::String(line),
            Entry::Array(values) => Value::Array(values),
            Entry::Record(record) => Value::Object(record),
        }
    }
}

/// Ordered, non-empty column names. Resolved once per operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Header {
    names: Vec<String>,
}

impl Header {
    /// Header supplied by the caller. Names were checked when the options
    /// were resolved.
    pub fn explicit(names: Vec<String>) -> Self {
        Self { names }
    }

    /// Takes the columns of the given line as names. Every cell must be a
    /// non-empty string.
    pub fn from_columns(line: usize, columns: Vec<Value>) -> Result<Self> {
        let mut names = Vec::with_capacity(columns.len());
        for column in columns {
            match column {
                Value::String(name) if !name.is_empty() => names.push(name),
                _ => return Err(CsvEachError::EmptyHeaderColumn { line }),
            }
        }
        Ok(Self { names })
    }

    /// Number of columns a data line is expected to have.
    pub fn width(&self) -> usize {
        self.names.len()
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Pairs names with values by position. Values past the last name are
    /// dropped.
    pub fn pair(&self, values: Vec<Value>) -> Map<String, Value> {
        self.names.iter().cloned().zip(values).collect()
    }
}

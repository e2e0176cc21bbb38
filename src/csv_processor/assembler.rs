use crate::csv_processor::entry::{Entry, Header};
use crate::csv_processor::tokenizer::tokenize;
use crate::utils::{trim_whitespace, ColumnNames, CsvEachError, EntryOptions, Result};
use serde_json::Value;

/// Header of a run, plus whether its first line has gone by.
#[derive(Debug, Default)]
pub struct HeaderSlot {
    header: Option<Header>,
    first_line_seen: bool,
}

/// Turns raw lines into entries according to the options of one operation.
pub struct RecordAssembler<'a> {
    options: &'a EntryOptions,
}

impl<'a> RecordAssembler<'a> {
    pub fn new(options: &'a EntryOptions) -> Self {
        Self { options }
    }

    /// Slot holding the caller's header, if one was supplied.
    pub fn initial_slot(&self) -> HeaderSlot {
        let header = match &self.options.column_names {
            ColumnNames::Auto => None,
            ColumnNames::Explicit(names) => Some(Header::explicit(names.clone())),
        };
        HeaderSlot {
            header,
            first_line_seen: false,
        }
    }

    /// Processes line `line_number`. Returns `Ok(None)` when the line is
    /// consumed without producing an entry (header line, skipped line).
    ///
    /// The first line that is not skipped as empty either becomes the header
    /// (no header yet) or is dropped when `skip_first_line` is set.
    pub fn assemble(
        &self,
        line_number: usize,
        line: &str,
        slot: &mut HeaderSlot,
    ) -> Result<Option<Entry>> {
        let line = if self.options.trim_line {
            trim_whitespace(line)
        } else {
            line
        };

        if line.is_empty() {
            if self.options.skip_empty_lines {
                tracing::trace!(line = line_number, "Skipping empty line");
                return Ok(None);
            }
            if self.options.raise_on_empty_lines {
                return Err(CsvEachError::EmptyLine { line: line_number });
            }
        }

        if self.options.return_lines {
            return Ok(Some(Entry::Line(line.to_string())));
        }

        let mut columns = self.columns(line);

        let first_line = !std::mem::replace(&mut slot.first_line_seen, true);

        let Some(header) = slot.header.as_ref() else {
            let header = Header::from_columns(line_number, columns)?;
            tracing::debug!(line = line_number, columns = header.width(), "Header resolved");
            slot.header = Some(header);
            return Ok(None);
        };

        if first_line && self.options.skip_first_line {
            return Ok(None);
        }

        self.fit_to_header(line_number, header, &mut columns)?;

        if self.options.return_arrays {
            Ok(Some(Entry::Array(columns)))
        } else {
            Ok(Some(Entry::Record(header.pair(columns))))
        }
    }

    fn columns(&self, line: &str) -> Vec<Value> {
        let substitute = self.options.substitutes_empty_columns();

        tokenize(line, self.options.delimiter, self.options.handle_quotes)
            .into_iter()
            .map(|column| {
                let column = if self.options.trim_columns {
                    trim_whitespace(&column).to_string()
                } else {
                    column
                };
                if substitute && column.is_empty() {
                    self.options.default_value_on_empty_column.clone()
                } else {
                    Value::String(column)
                }
            })
            .collect()
    }

    /// Applies the column-count policy. Short lines are padded with the
    /// missing-column default, long lines are cut to the header length.
    fn fit_to_header(
        &self,
        line_number: usize,
        header: &Header,
        columns: &mut Vec<Value>,
    ) -> Result<()> {
        let expected = header.width();
        let found = columns.len();

        if found < expected {
            if self.options.raise_on_missing_columns {
                return Err(CsvEachError::MissingColumns {
                    line: line_number,
                    expected,
                    found,
                });
            }
            columns.resize(expected, self.options.default_value_on_missing_column.clone());
        } else if found > expected {
            if self.options.raise_on_extra_columns {
                return Err(CsvEachError::ExtraColumns {
                    line: line_number,
                    expected,
                    found,
                });
            }
            columns.truncate(expected);
        }

        Ok(())
    }
}

pub mod csv_processor;
pub mod each_entry;
pub mod utils;

pub use csv_processor::{
    tokenize, Entry, EntryPipeline, Header, LineReaderHandle, LineSource, MemoryLineSource,
};
pub use each_entry::{each_entry, CsvEach};
pub use utils::{AppConfig, ColumnNames, CsvEachError, EntryConfig, EntryOptions, Result};

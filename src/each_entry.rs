use crate::csv_processor::{Entry, EntryPipeline, LineReaderHandle};
use crate::utils::{EntryConfig, Result, StepError};
use std::future::Future;
use std::path::Path;

pub const DEFAULT_READ_AHEAD: usize = 64;

/// Holds instance-level defaults layered over the built-in ones. Each call
/// to [`CsvEach::each_entry`] layers its own config on top.
#[derive(Debug, Clone)]
pub struct CsvEach {
    config: EntryConfig,
    read_ahead: usize,
}

impl Default for CsvEach {
    fn default() -> Self {
        Self::new(EntryConfig::default())
    }
}

impl CsvEach {
    pub fn new(config: EntryConfig) -> Self {
        Self {
            config: config.merge(&EntryConfig::defaults()),
            read_ahead: DEFAULT_READ_AHEAD,
        }
    }

    /// Bounds how many lines the file reader may buffer ahead of the steps.
    pub fn with_read_ahead(mut self, read_ahead: usize) -> Self {
        self.read_ahead = read_ahead.max(1);
        self
    }

    /// Streams the configured file and awaits `step` for every entry, in
    /// file order. Resolves once every line has been processed, or fails
    /// with the first error.
    pub async fn each_entry<F, Fut, E>(&self, config: EntryConfig, step: F) -> Result<()>
    where
        F: FnMut(Entry) -> Fut,
        Fut: Future<Output = std::result::Result<(), E>>,
        E: Into<StepError>,
    {
        let (filename, options) = config.merge(&self.config).resolve()?;

        let source = LineReaderHandle::open(&filename, self.read_ahead).await?;
        tracing::debug!(file = %source.path().display(), "Starting entry stream");

        EntryPipeline::new(options).run(source, step).await
    }
}

/// Streams `filename` with built-in defaults overridden by `config`.
pub async fn each_entry<F, Fut, E>(
    filename: impl AsRef<Path>,
    config: EntryConfig,
    step: F,
) -> Result<()>
where
    F: FnMut(Entry) -> Fut,
    Fut: Future<Output = std::result::Result<(), E>>,
    E: Into<StepError>,
{
    CsvEach::default()
        .each_entry(config.with_filename(filename.as_ref()), step)
        .await
}

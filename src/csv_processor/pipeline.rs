use crate::csv_processor::assembler::{HeaderSlot, RecordAssembler};
use crate::csv_processor::entry::Entry;
use crate::csv_processor::reader::LineSource;
use crate::utils::{CsvEachError, EntryOptions, Result, StepError};
use std::future::Future;

/// Bookkeeping for one run. Lives exactly as long as [`EntryPipeline::run`].
#[derive(Debug, Default)]
pub struct PipelineState {
    pub line_number: usize,
    pub header: HeaderSlot,
    pub entries_emitted: usize,
}

/// Drives lines from a [`LineSource`] through the assembler and into the
/// caller's step, one line at a time.
///
/// A line is only pulled once the step for the previous entry has settled,
/// so steps never overlap and always run in file order.
pub struct EntryPipeline {
    options: EntryOptions,
}

impl EntryPipeline {
    pub fn new(options: EntryOptions) -> Self {
        Self { options }
    }

    /// Runs until the source is exhausted or the first error. Lines the
    /// source still holds at that point are never processed.
    pub async fn run<S, F, Fut, E>(&self, mut source: S, mut step: F) -> Result<()>
    where
        S: LineSource,
        F: FnMut(Entry) -> Fut,
        Fut: Future<Output = std::result::Result<(), E>>,
        E: Into<StepError>,
    {
        let assembler = RecordAssembler::new(&self.options);
        let mut state = PipelineState {
            header: assembler.initial_slot(),
            ..Default::default()
        };

        while let Some(line) = source.next_line().await? {
            state.line_number += 1;
            tracing::trace!(line = state.line_number, "Processing line");

            let entry = match assembler.assemble(state.line_number, &line, &mut state.header) {
                Ok(Some(entry)) => entry,
                Ok(None) => continue,
                Err(e) => {
                    tracing::warn!(line = state.line_number, error = %e, "Line rejected");
                    return Err(e);
                }
            };

            if let Err(e) = step(entry).await {
                let e = CsvEachError::StepFailed(e.into());
                tracing::warn!(line = state.line_number, error = %e, "Step failed");
                return Err(e);
            }
            state.entries_emitted += 1;
        }

        tracing::info!(
            lines = state.line_number,
            entries = state.entries_emitted,
            "Finished streaming entries"
        );

        Ok(())
    }
}

use crate::utils::{CsvEachError, Result};
use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use tokio::fs::File;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// Produces decoded text lines in file order, one per call.
///
/// `Ok(None)` signals end of input; no line follows it.
#[allow(async_fn_in_trait)]
pub trait LineSource {
    async fn next_line(&mut self) -> Result<Option<String>>;
}

/// Reads a file line by line on a background task.
///
/// The task runs at most `read_ahead` lines ahead of the consumer. Dropping
/// the handle stops the task and discards whatever it had buffered.
pub struct LineReaderHandle {
    path: PathBuf,
    line_rx: mpsc::Receiver<std::io::Result<String>>,
    task: JoinHandle<()>,
}

impl LineReaderHandle {
    pub async fn open(path: impl AsRef<Path>, read_ahead: usize) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let file = File::open(&path).await.map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => {
                CsvEachError::FileNotFound(path.display().to_string())
            }
            _ => CsvEachError::IoError(e),
        })?;

        let (line_tx, line_rx) = mpsc::channel(read_ahead.max(1));
        let task_path = path.clone();

        let task = tokio::spawn(async move {
            let mut lines = BufReader::new(file).lines();
            let mut read = 0usize;

            loop {
                match lines.next_line().await {
                    Ok(Some(line)) => {
                        read += 1;
                        if line_tx.send(Ok(line)).await.is_err() {
                            tracing::debug!(
                                path = %task_path.display(),
                                lines_read = read,
                                "Line consumer gone, reader stopping"
                            );
                            return;
                        }
                    }
                    Ok(None) => break,
                    Err(e) => {
                        tracing::warn!(
                            path = %task_path.display(),
                            error = %e,
                            "Failed to read line"
                        );
                        let _ = line_tx.send(Err(e)).await;
                        return;
                    }
                }
            }

            tracing::debug!(path = %task_path.display(), lines_read = read, "Reached end of input");
        });

        tracing::debug!(path = %path.display(), read_ahead, "Line reader started");

        Ok(Self {
            path,
            line_rx,
            task,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl LineSource for LineReaderHandle {
    async fn next_line(&mut self) -> Result<Option<String>> {
        match self.line_rx.recv().await {
            Some(Ok(line)) => Ok(Some(line)),
            Some(Err(e)) => Err(CsvEachError::IoError(e)),
            None => Ok(None),
        }
    }
}

impl Drop for LineReaderHandle {
    fn drop(&mut self) {
        self.task.abort();
    }
}

/// Lines held in memory.
#[derive(Debug, Clone, Default)]
pub struct MemoryLineSource {
    lines: VecDeque<String>,
}

impl MemoryLineSource {
    pub fn new<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            lines: lines.into_iter().map(Into::into).collect(),
        }
    }

    /// Splits on `\n` or `\r\n`. A trailing line break does not start a line.
    pub fn from_text(text: &str) -> Self {
        Self::new(text.lines())
    }
}

impl LineSource for MemoryLineSource {
    async fn next_line(&mut self) -> Result<Option<String>> {
        Ok(self.lines.pop_front())
    }
}

pub mod assembler;
pub mod entry;
pub mod pipeline;
pub mod reader;
pub mod tokenizer;

pub use assembler::{HeaderSlot, RecordAssembler};
pub use entry::{Entry, Header};
pub use pipeline::{EntryPipeline, PipelineState};
pub use reader::{LineReaderHandle, LineSource, MemoryLineSource};
pub use tokenizer::tokenize;

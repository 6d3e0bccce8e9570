//! The storage engine seam.
//!
//! Physical encoding, compression and file layout live outside of weft. The write path hands
//! schema-shaped rows to a [`RecordSink`]; the read path pulls them back from a [`RecordSource`].
//! [`MemoryTable`] implements both and keeps everything in memory.

pub use memory::MemoryTable;
pub use sink::RecordSink;
pub use source::RecordSource;

mod memory;
mod sink;
mod source;

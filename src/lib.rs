//! Size-bounded splitting of large JSONL files.
//!
//! A JSONL input is streamed once and cut into `<stem>_partNNN.jsonl` files that
//! each stay within a byte budget, never breaking a line across two files.
//! Concatenating the outputs in index order reproduces the input byte for byte.
//!
//! ```no_run
//! use jsonl_split::{ChunkWriter, SplitConfig};
//!
//! # fn main() -> jsonl_split::Result<()> {
//! let config = SplitConfig::builder().max_size_mb(80).build()?;
//! let report = ChunkWriter::new(config).split("corpus.jsonl", "chunks")?;
//! for chunk in &report.chunks {
//!     println!("{} ({:.2} MB)", chunk.path.display(), chunk.megabytes());
//! }
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms, unreachable_pub)]

pub mod chunk_writer;
pub mod config;
pub mod error;
pub mod naming;

pub use chunk_writer::{estimate_chunks, split_jsonl, ChunkFile, ChunkWriter, SplitReport};
pub use config::{SplitConfig, SplitConfigBuilder, BYTES_PER_MB, DEFAULT_MAX_SIZE_MB};
pub use error::{Result, SplitError};

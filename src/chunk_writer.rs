//! Streaming, size-bounded splitting of JSONL files.
//!
//! Input lines are treated as opaque byte runs ending in `\n` (or end of file).
//! Whole lines are accumulated until the next one would push the buffer past the
//! byte budget, at which point the buffer is written out as the next
//! `<stem>_partNNN.jsonl`. A line larger than the budget is never truncated; it
//! lands alone in its own chunk.

use std::fs::{self, File};
use std::io::{self, BufRead, BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};

use indicatif::{ProgressBar, ProgressStyle};
use log::{debug, info, warn};
use serde::Serialize;

use crate::config::{SplitConfig, BYTES_PER_MB};
use crate::error::{Result, SplitError};
use crate::naming;

/// One output file produced by a split.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChunkFile {
    /// 1-based chunk index in creation order.
    pub index: usize,
    /// Location of the written file.
    pub path: PathBuf,
    /// Size of the file in bytes.
    pub bytes: u64,
    /// Number of lines in the chunk; `None` for a verbatim short-circuit copy.
    pub lines: Option<u64>,
}

impl ChunkFile {
    /// Size in megabytes, for display.
    #[must_use]
    pub fn megabytes(&self) -> f64 {
        self.bytes as f64 / BYTES_PER_MB as f64
    }
}

/// Outcome of a completed split.
#[derive(Debug, Clone, Serialize)]
pub struct SplitReport {
    /// Input file that was split.
    pub input: PathBuf,
    /// Size of the input in bytes.
    pub input_bytes: u64,
    /// Budget the split ran with.
    pub max_chunk_bytes: u64,
    /// `true` when the input already fit the budget and was copied whole.
    pub short_circuit: bool,
    /// Output files in creation order.
    pub chunks: Vec<ChunkFile>,
}

impl SplitReport {
    /// Output paths in chunk order.
    #[must_use]
    pub fn paths(&self) -> Vec<PathBuf> {
        self.chunks.iter().map(|chunk| chunk.path.clone()).collect()
    }

    /// Sum of all written chunk sizes.
    #[must_use]
    pub fn total_bytes(&self) -> u64 {
        self.chunks.iter().map(|chunk| chunk.bytes).sum()
    }

    /// Chunks that exceed the budget (only possible for a single oversized line).
    pub fn oversized(&self) -> impl Iterator<Item = &ChunkFile> + '_ {
        self.chunks
            .iter()
            .filter(move |chunk| !self.short_circuit && chunk.bytes > self.max_chunk_bytes)
    }
}

/// Advisory chunk count, `ceil(total / budget)`.
///
/// Oversized lines and imperfect packing can make the real count larger.
#[must_use]
pub fn estimate_chunks(total_bytes: u64, max_chunk_bytes: u64) -> u64 {
    if max_chunk_bytes == 0 {
        return 0;
    }
    total_bytes.div_ceil(max_chunk_bytes)
}

/// Splits `input` into `output_dir` with a megabyte budget and returns the written paths.
pub fn split_jsonl(
    input: impl AsRef<Path>,
    output_dir: impl AsRef<Path>,
    max_size_mb: u64,
) -> Result<Vec<PathBuf>> {
    let config = SplitConfig::from_megabytes(max_size_mb)?;
    let report = ChunkWriter::new(config).split(input, output_dir)?;
    Ok(report.paths())
}

/// Splits JSONL files according to a [`SplitConfig`].
#[derive(Debug, Clone, Default)]
pub struct ChunkWriter {
    config: SplitConfig,
}

impl ChunkWriter {
    /// Creates a writer for the given configuration.
    #[must_use]
    pub fn new(config: SplitConfig) -> Self {
        Self { config }
    }

    /// Splits `input` into `output_dir`.
    pub fn split(
        &self,
        input: impl AsRef<Path>,
        output_dir: impl AsRef<Path>,
    ) -> Result<SplitReport> {
        self.split_with(input, output_dir, |_| {})
    }

    /// Splits `input` into `output_dir`, calling `on_chunk` as each file is closed.
    pub fn split_with<F>(
        &self,
        input: impl AsRef<Path>,
        output_dir: impl AsRef<Path>,
        mut on_chunk: F,
    ) -> Result<SplitReport>
    where
        F: FnMut(&ChunkFile),
    {
        self.config.validate()?;
        let input = input.as_ref();
        let output_dir = output_dir.as_ref();
        let budget = self.config.max_chunk_bytes;

        let metadata = fs::metadata(input).map_err(|err| SplitError::from_io(err, input))?;
        if !metadata.is_file() {
            return Err(SplitError::NotFound {
                path: input.to_path_buf(),
            });
        }
        let input_bytes = metadata.len();

        fs::create_dir_all(output_dir).map_err(|err| SplitError::from_io(err, output_dir))?;

        let mut report = SplitReport {
            input: input.to_path_buf(),
            input_bytes,
            max_chunk_bytes: budget,
            short_circuit: input_bytes <= budget,
            chunks: Vec::new(),
        };

        if report.short_circuit {
            debug!(
                "{} is {input_bytes} bytes, within the {budget} byte budget; copying whole",
                input.display()
            );
            let chunk = copy_whole(input, output_dir, input_bytes)?;
            info!(
                "File already within size limit, copied: {}",
                chunk.path.display()
            );
            on_chunk(&chunk);
            report.chunks.push(chunk);
            return Ok(report);
        }

        info!("File size: {:.2} MB", input_bytes as f64 / BYTES_PER_MB as f64);
        info!(
            "Estimated chunk count: {}",
            estimate_chunks(input_bytes, budget)
        );

        let stem = naming::stem(input)?;
        let file = File::open(input).map_err(|err| SplitError::from_io(err, input))?;
        let bar = self.progress_bar(input_bytes);
        let mut reader = BufReader::new(bar.wrap_read(file));

        let mut created = Vec::new();
        let outcome = stream_chunks(
            &mut reader,
            input,
            output_dir,
            &stem,
            budget,
            &mut created,
            |chunk| {
                on_chunk(&chunk);
                report.chunks.push(chunk);
            },
        );
        bar.finish_and_clear();

        if let Err(err) = outcome {
            remove_partial(&created);
            return Err(err);
        }

        info!("Created {} chunks in total.", report.chunks.len());
        Ok(report)
    }

    fn progress_bar(&self, len: u64) -> ProgressBar {
        if !self.config.show_progress {
            return ProgressBar::hidden();
        }
        let bar = ProgressBar::new(len);
        bar.set_style(
            ProgressStyle::with_template(
                "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] \
                 {bytes}/{total_bytes} ({eta})",
            )
            .unwrap_or_else(|_| ProgressStyle::default_bar()),
        );
        bar
    }
}

/// Short-circuit path: raw byte copy under the original base name.
fn copy_whole(input: &Path, output_dir: &Path, input_bytes: u64) -> Result<ChunkFile> {
    let dest = output_dir.join(naming::base_name(input)?);

    if is_same_file(input, &dest) {
        debug!("{} is already in the output directory", dest.display());
        return Ok(ChunkFile {
            index: 1,
            path: dest,
            bytes: input_bytes,
            lines: None,
        });
    }

    let mut reader = File::open(input).map_err(|err| SplitError::from_io(err, input))?;
    let copied = copy_into(&mut reader, &dest)?;

    Ok(ChunkFile {
        index: 1,
        path: dest,
        bytes: copied,
        lines: None,
    })
}

/// Copies `reader` into a freshly created `dest`, removing `dest` again if the copy fails.
fn copy_into<R: Read>(reader: &mut R, dest: &Path) -> Result<u64> {
    let out = File::create(dest).map_err(|err| SplitError::io(err, dest))?;
    let mut writer = BufWriter::new(out);
    let copied = io::copy(reader, &mut writer).and_then(|copied| {
        writer.flush()?;
        Ok(copied)
    });
    drop(writer);

    copied.map_err(|err| {
        remove_partial(&[dest.to_path_buf()]);
        SplitError::io(err, dest)
    })
}

/// Same device and inode, so hardlinks and symlinks to the input both count.
#[cfg(unix)]
fn is_same_file(a: &Path, b: &Path) -> bool {
    use std::os::unix::fs::MetadataExt;

    match (fs::metadata(a), fs::metadata(b)) {
        (Ok(a), Ok(b)) => a.dev() == b.dev() && a.ino() == b.ino(),
        _ => false,
    }
}

// Hardlinks are not detected here.
#[cfg(not(unix))]
fn is_same_file(a: &Path, b: &Path) -> bool {
    match (fs::canonicalize(a), fs::canonicalize(b)) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}

/// Streaming path. A path is pushed to `created` once its file has been opened,
/// so the caller can clean up after a failure without touching files this run
/// never wrote.
fn stream_chunks<R, F>(
    reader: &mut R,
    input: &Path,
    output_dir: &Path,
    stem: &str,
    budget: u64,
    created: &mut Vec<PathBuf>,
    mut emit: F,
) -> Result<()>
where
    R: BufRead,
    F: FnMut(ChunkFile),
{
    let mut line = Vec::new();
    let mut buffer: Vec<u8> = Vec::new();
    let mut buffered_lines = 0u64;
    let mut index = 1usize;

    loop {
        line.clear();
        let read = reader
            .read_until(b'\n', &mut line)
            .map_err(|err| SplitError::io(err, input))?;
        if read == 0 {
            break;
        }

        let line_bytes = line.len() as u64;
        if buffer.len() as u64 + line_bytes > budget && !buffer.is_empty() {
            let chunk = flush_chunk(output_dir, stem, index, &buffer, buffered_lines, created)?;
            log_chunk(&chunk, budget);
            emit(chunk);
            index += 1;
            buffer.clear();
            buffered_lines = 0;
        }

        buffer.extend_from_slice(&line);
        buffered_lines += 1;
    }

    if !buffer.is_empty() {
        let chunk = flush_chunk(output_dir, stem, index, &buffer, buffered_lines, created)?;
        log_chunk(&chunk, budget);
        emit(chunk);
    }
    Ok(())
}

fn flush_chunk(
    output_dir: &Path,
    stem: &str,
    index: usize,
    content: &[u8],
    lines: u64,
    created: &mut Vec<PathBuf>,
) -> Result<ChunkFile> {
    let path = naming::chunk_path(output_dir, stem, index);
    let mut file = File::create(&path).map_err(|err| SplitError::io(err, &path))?;
    created.push(path.clone());

    file.write_all(content)
        .and_then(|()| file.flush())
        .map_err(|err| SplitError::io(err, &path))?;

    Ok(ChunkFile {
        index,
        path,
        bytes: content.len() as u64,
        lines: Some(lines),
    })
}

fn log_chunk(chunk: &ChunkFile, budget: u64) {
    info!(
        "Chunk {} created: {} ({:.2} MB)",
        chunk.index,
        chunk.path.display(),
        chunk.megabytes()
    );
    if chunk.bytes > budget {
        warn!(
            "Chunk {} holds a single {} byte line, larger than the {budget} byte budget",
            chunk.index, chunk.bytes
        );
    }
}

fn remove_partial(created: &[PathBuf]) {
    for path in created {
        match fs::remove_file(path) {
            Ok(()) => warn!("Removed partial output {}", path.display()),
            Err(err) if err.kind() == io::ErrorKind::NotFound => {}
            Err(err) => warn!("Could not remove partial output {}: {err}", path.display()),
        }
    }
}

//! JSON-lines input and JSON document output.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use memchr::memchr_iter;
use memmap2::Mmap;
use rayon::prelude::*;

use crate::document::MatchDocument;
use crate::error::AegisError;
use crate::events::RawRecord;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReadStats {
    pub lines: usize,
    pub blank: usize,
    pub malformed: usize,
}

/// Read every record from a JSON-lines file, in line order.
///
/// Lines are parsed in parallel. Blank and undecodable lines are counted
/// and dropped.
pub fn read_records(path: &Path) -> Result<(Vec<RawRecord>, ReadStats), AegisError> {
    let unavailable = |source| AegisError::InputUnavailable {
        path: path.to_path_buf(),
        source,
    };
    let file = File::open(path).map_err(unavailable)?;
    // SAFETY: the file is opened read-only and not modified during the run.
    let mmap = unsafe { Mmap::map(&file) }.map_err(unavailable)?;

    let (records, stats) = parse_lines(mmap.as_ref());
    tracing::info!(
        path = %path.display(),
        lines = stats.lines,
        records = records.len(),
        malformed = stats.malformed,
        "Input read"
    );
    Ok((records, stats))
}

/// Split `bytes` on newlines and decode each line.
pub fn parse_lines(bytes: &[u8]) -> (Vec<RawRecord>, ReadStats) {
    let mut line_ranges: Vec<(usize, usize)> = Vec::new();
    let mut start = 0;
    for end in memchr_iter(b'\n', bytes) {
        line_ranges.push((start, end));
        start = end + 1;
    }
    if start < bytes.len() {
        line_ranges.push((start, bytes.len()));
    }

    let parsed: Vec<Option<RawRecord>> = line_ranges
        .par_iter()
        .enumerate()
        .map(|(idx, &(start, end))| parse_line(idx + 1, &bytes[start..end]))
        .collect();

    let mut stats = ReadStats {
        lines: line_ranges.len(),
        ..ReadStats::default()
    };
    stats.blank = line_ranges
        .iter()
        .filter(|&&(s, e)| bytes[s..e].trim_ascii().is_empty())
        .count();
    stats.malformed = parsed.iter().filter(|r| r.is_none()).count() - stats.blank;

    (parsed.into_iter().flatten().collect(), stats)
}

fn parse_line(line_number: usize, line: &[u8]) -> Option<RawRecord> {
    let line = line.trim_ascii();
    if line.is_empty() {
        return None;
    }
    match serde_json::from_slice(line) {
        Ok(record) => Some(record),
        Err(err) => {
            tracing::debug!(line = line_number, error = %err, "Skipping malformed line");
            None
        }
    }
}

/// Serialize `document` to `path`, pretty-printed unless `compact`.
pub fn write_document(
    document: &MatchDocument,
    path: &Path,
    compact: bool,
) -> Result<(), AegisError> {
    let unwritable = |source| AegisError::OutputUnwritable {
        path: path.to_path_buf(),
        source,
    };
    let file = File::create(path).map_err(unwritable)?;
    let mut writer = BufWriter::new(file);

    if compact {
        serde_json::to_writer(&mut writer, document)?;
    } else {
        serde_json::to_writer_pretty(&mut writer, document)?;
    }
    writer.write_all(b"\n").map_err(unwritable)?;
    writer.flush().map_err(unwritable)?;

    tracing::info!(path = %path.display(), "Document written");
    Ok(())
}

//! Edge-list input
//!
//! Reads whitespace-separated edge records, one per line:
//!
//! ```text
//! # comment
//! 1 2
//! 2 3 extra-tokens-are-ignored
//! ```
//!
//! A record whose first two tokens are not integers is malformed. In lenient mode
//! malformed records are counted and skipped; in strict mode the first one aborts
//! the read with its line number.

use crate::error::{TriangleError, TriangleResult};
use crate::sharding::Edge;
use flate2::read::MultiGzDecoder;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufRead, BufReader, Lines};
use std::path::Path;
use tracing::{debug, warn};
use tripart_algorithms::VertexId;

/// Policy for records that do not decode to two integers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParseMode {
    /// Fail on the first malformed record
    Strict,
    /// Skip malformed records
    #[default]
    Lenient,
}

/// Blank lines and lines starting with `#` or `%` carry no record
pub fn is_comment(line: &str) -> bool {
    let trimmed = line.trim_start();
    trimmed.is_empty() || trimmed.starts_with('#') || trimmed.starts_with('%')
}

/// Parse the first two whitespace-separated tokens of a record
pub fn parse_edge(line: &str) -> Option<(VertexId, VertexId)> {
    let mut tokens = line.split_whitespace();
    let a = tokens.next()?.parse().ok()?;
    let b = tokens.next()?.parse().ok()?;
    Some((a, b))
}

/// Iterator over the edges of a line-oriented reader
pub struct EdgeReader<R> {
    lines: Lines<R>,
    mode: ParseMode,
    line_no: usize,
    skipped: usize,
}

impl<R: BufRead> EdgeReader<R> {
    pub fn new(reader: R, mode: ParseMode) -> Self {
        Self {
            lines: reader.lines(),
            mode,
            line_no: 0,
            skipped: 0,
        }
    }

    /// Malformed records skipped so far (always 0 in strict mode)
    pub fn skipped(&self) -> usize {
        self.skipped
    }

    /// Lines consumed so far, comments included
    pub fn lines_read(&self) -> usize {
        self.line_no
    }
}

impl<R: BufRead> Iterator for EdgeReader<R> {
    type Item = TriangleResult<Edge>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let line = match self.lines.next()? {
                Ok(line) => line,
                Err(e) => return Some(Err(e.into())),
            };
            self.line_no += 1;

            if is_comment(&line) {
                continue;
            }

            match parse_edge(&line) {
                Some((a, b)) => return Some(Ok(Edge::new(a, b))),
                None => match self.mode {
                    ParseMode::Strict => {
                        return Some(Err(TriangleError::MalformedRecord {
                            line: self.line_no,
                            record: line,
                        }))
                    }
                    ParseMode::Lenient => {
                        self.skipped += 1;
                        if self.skipped == 1 {
                            warn!("Skipping malformed record at line {}: {:?}", self.line_no, line);
                        } else {
                            debug!("Skipping malformed record at line {}: {:?}", self.line_no, line);
                        }
                    }
                },
            }
        }
    }
}

/// Open an edge-list file, decompressing `.gz` files on the fly
pub fn open_edge_file(path: impl AsRef<Path>) -> TriangleResult<Box<dyn BufRead + Send>> {
    let path = path.as_ref();
    let file = File::open(path)?;
    let is_gzip = path
        .extension()
        .map(|ext| ext.eq_ignore_ascii_case("gz"))
        .unwrap_or(false);

    debug!("Opening edge list {:?} (gzip: {})", path, is_gzip);
    if is_gzip {
        Ok(Box::new(BufReader::new(MultiGzDecoder::new(file))))
    } else {
        Ok(Box::new(BufReader::new(file)))
    }
}

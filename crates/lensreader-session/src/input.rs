//! Tag sources.
//!
//! The external reader process writes one line per read while a tag is in
//! the field and nothing otherwise. [`TagLineReader`] turns that byte stream
//! into [`TagId`]s, skipping status chatter, over-long lines and lines that
//! are not valid UTF-8.

#![allow(async_fn_in_trait)]

use futures::StreamExt;
use lensreader_core::constants::MAX_LINE_LENGTH;
use lensreader_core::{TagId, normalize};
use std::io;
use tokio::io::AsyncRead;
use tokio::sync::mpsc;
use tokio_util::codec::{FramedRead, LinesCodec, LinesCodecError};
use tracing::{error, trace, warn};

/// A stream of normalized tag reads.
pub trait TagSource {
    /// Wait for the next tag read. Returns `None` once the source is closed.
    ///
    /// Implementations must be cancel safe; the session loop races this
    /// against the debounce timer.
    async fn next_tag(&mut self) -> Option<TagId>;
}

impl TagSource for mpsc::Receiver<TagId> {
    async fn next_tag(&mut self) -> Option<TagId> {
        self.recv().await
    }
}

/// Line-oriented reader over the reader process output.
///
/// # Examples
///
/// ```
/// use lensreader_session::{TagLineReader, TagSource};
///
/// #[tokio::main]
/// async fn main() {
///     let output: &[u8] = b"Reader ready\n04:04:A5:2C:F2:2A:5E:80\n";
///     let mut reader = TagLineReader::new(output);
///
///     let id = reader.next_tag().await.unwrap();
///     assert_eq!(id.as_str(), "04a52cf22a5e80");
///     assert_eq!(reader.ignored_lines(), 1);
///     assert!(reader.next_tag().await.is_none());
/// }
/// ```
#[derive(Debug)]
pub struct TagLineReader<R> {
    lines: FramedRead<R, LinesCodec>,
    ignored: u64,
    after_error: bool,
}

impl<R: AsyncRead + Unpin> TagLineReader<R> {
    /// Wrap a byte stream.
    pub fn new(reader: R) -> Self {
        Self {
            lines: FramedRead::new(reader, LinesCodec::new_with_max_length(MAX_LINE_LENGTH)),
            ignored: 0,
            after_error: false,
        }
    }

    /// Number of lines skipped so far.
    pub fn ignored_lines(&self) -> u64 {
        self.ignored
    }
}

impl<R: AsyncRead + Unpin> TagSource for TagLineReader<R> {
    async fn next_tag(&mut self) -> Option<TagId> {
        loop {
            match self.lines.next().await {
                Some(Ok(line)) => match normalize(&line) {
                    Ok(id) => return Some(id),
                    Err(_) => {
                        trace!(line = %line.trim(), "Ignoring non-tag line");
                        self.ignored += 1;
                    }
                },
                Some(Err(LinesCodecError::MaxLineLengthExceeded)) => {
                    warn!(max = MAX_LINE_LENGTH, "Discarding over-long reader line");
                    self.ignored += 1;
                    self.after_error = true;
                }
                Some(Err(LinesCodecError::Io(e))) if e.kind() == io::ErrorKind::InvalidData => {
                    warn!(error = %e, "Discarding undecodable reader line");
                    self.ignored += 1;
                    self.after_error = true;
                }
                Some(Err(LinesCodecError::Io(e))) => {
                    error!(error = %e, "Reader input failed");
                    return None;
                }
                // FramedRead yields one None after a decoder error, then resumes.
                None if self.after_error => self.after_error = false,
                None => return None,
            }
        }
    }
}

//! Line-by-line processing loop.

use super::{ParsedLine, RecordParser};
use crate::config::MAX_LINE_LEN;
use crate::error::{CidrqError, LineError, ParseError, Result};
use crate::processing::ErrorPolicy;
use std::io::{BufRead, Read, Write};

/// Reads a stream line by line, parses each line and hands it to a handler.
///
/// Parse failures and handler failures both go through the [`ErrorPolicy`],
/// which decides whether the run continues.
#[derive(Debug, Clone)]
pub struct LineProcessor {
    parser: RecordParser,
    policy: ErrorPolicy,
    max_line_len: usize,
}

impl LineProcessor {
    pub fn new(parser: RecordParser, policy: ErrorPolicy) -> LineProcessor {
        LineProcessor {
            parser,
            policy,
            max_line_len: MAX_LINE_LEN,
        }
    }

    /// Override the longest accepted line (in bytes, terminator excluded).
    pub fn with_max_line_len(mut self, max_line_len: usize) -> LineProcessor {
        self.max_line_len = max_line_len;
        self
    }

    pub fn parser(&self) -> &RecordParser {
        &self.parser
    }

    pub fn policy(&self) -> ErrorPolicy {
        self.policy
    }

    /// Process every line of `reader`, returning the number of lines read.
    ///
    /// # Arguments
    /// * `reader` - The input stream
    /// * `out` - Output stream, shared by the handler and the `print` policy
    /// * `handler` - Called once per successfully parsed line
    ///
    /// # Errors
    /// * The first line fault under the `abort` policy
    /// * Read or write failures, and lines longer than the configured cap
    pub fn process<R, W, F>(&self, mut reader: R, out: &mut W, mut handler: F) -> Result<usize>
    where
        R: BufRead,
        W: Write,
        F: FnMut(&ParsedLine<'_>, &mut W) -> std::result::Result<(), LineError>,
    {
        let mut buf = Vec::new();
        let mut num_lines = 0;

        loop {
            buf.clear();
            // Room for the cap plus a `\r\n` terminator.
            let read = reader
                .by_ref()
                .take(self.max_line_len as u64 + 2)
                .read_until(b'\n', &mut buf)?;
            if read == 0 {
                break;
            }
            num_lines += 1;

            if buf.last() == Some(&b'\n') {
                buf.pop();
                if buf.last() == Some(&b'\r') {
                    buf.pop();
                }
            }
            if buf.len() > self.max_line_len {
                return Err(CidrqError::LineTooLong {
                    line: num_lines,
                    max: self.max_line_len,
                });
            }

            let line = match std::str::from_utf8(&buf) {
                Ok(line) => line,
                Err(_) => {
                    self.policy
                        .handle(&buf, LineError::Parse(ParseError::InvalidUtf8), out)?;
                    continue;
                }
            };

            match self.parser.parse_line(line) {
                Ok(parsed) => {
                    if let Err(e) = handler(&parsed, out) {
                        self.policy.handle(line.as_bytes(), e, out)?;
                    }
                }
                Err(e) => self.policy.handle(line.as_bytes(), e.into(), out)?,
            }
        }

        log::info!("Processed {} lines", num_lines);
        Ok(num_lines)
    }
}

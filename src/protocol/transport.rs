use std::io::{self, BufRead, BufReader, Read, Write};

use log::trace;

use super::{DictError, Status};

/// Line that ends a data block.
const BLOCK_TERMINATOR: &str = ".";

/// Line framing over a bidirectional channel.
///
/// Reads are buffered; writes go straight to the underlying stream and are flushed
/// after every command line.
pub struct LineTransport<T: Read + Write> {
    stream: BufReader<T>,
}

impl<T: Read + Write> LineTransport<T> {
    pub fn new(stream: T) -> Self {
        Self {
            stream: BufReader::new(stream),
        }
    }

    pub fn write_line(&mut self, line: &str) -> Result<(), DictError> {
        trace!("> {line}");
        let stream = self.stream.get_mut();
        stream.write_all(line.as_bytes())?;
        stream.write_all(b"\n")?;
        stream.flush()?;
        Ok(())
    }

    /// Read one line with its terminator removed. End of stream is an error.
    pub fn read_line(&mut self) -> Result<String, DictError> {
        let mut buf = Vec::new();
        let read = self.stream.read_until(b'\n', &mut buf)?;
        if read == 0 {
            return Err(DictError::Connection {
                reason: "server closed the connection".to_string(),
                source: Some(io::ErrorKind::UnexpectedEof.into()),
            });
        }

        let line = String::from_utf8_lossy(&buf)
            .trim_end_matches(['\r', '\n'])
            .to_string();
        trace!("< {line}");
        Ok(line)
    }

    pub fn read_status(&mut self) -> Result<Status, DictError> {
        let line = self.read_line()?;
        line.as_str().try_into()
    }

    /// Read lines up to the lone `.` terminator, which is not returned.
    ///
    /// A data line holding only `.` cannot be told apart from the terminator.
    pub fn read_block(&mut self) -> Result<Vec<String>, DictError> {
        let mut lines = Vec::new();
        loop {
            let line = self.read_line()?;
            if line == BLOCK_TERMINATOR {
                return Ok(lines);
            }
            lines.push(line);
        }
    }

    pub fn get_ref(&self) -> &T {
        self.stream.get_ref()
    }
}

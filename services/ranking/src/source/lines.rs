use async_trait::async_trait;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};

use super::{EventSource, TransportError};

/// One payload per line of an async reader.
///
/// Line terminators are stripped. Blank lines and invalid UTF-8 (replaced
/// lossily) are passed through and left for the decoder to reject.
pub struct LineSource<R> {
    reader: R,
    buf: Vec<u8>,
    label: String,
}

impl<R: AsyncBufRead + Unpin + Send> LineSource<R> {
    pub fn new(reader: R, label: impl Into<String>) -> Self {
        Self {
            reader,
            buf: Vec::new(),
            label: label.into(),
        }
    }
}

#[async_trait]
impl<R: AsyncBufRead + Unpin + Send> EventSource for LineSource<R> {
    fn name(&self) -> &str {
        &self.label
    }

    async fn next_payload(&mut self) -> Result<Option<String>, TransportError> {
        self.buf.clear();
        let read = self
            .reader
            .read_until(b'\n', &mut self.buf)
            .await
            .map_err(|e| TransportError::Read(e.to_string()))?;
        if read == 0 {
            return Ok(None);
        }

        let mut line = self.buf.as_slice();
        if let Some(rest) = line.strip_suffix(b"\n") {
            line = rest.strip_suffix(b"\r").unwrap_or(rest);
        }
        Ok(Some(String::from_utf8_lossy(line).into_owned()))
    }
}

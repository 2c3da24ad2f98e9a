//! Wordnet line protocol framing.
//!
//! Requests are single lines of text from the client. Responses are one or
//! more logical lines, each followed by `\r`, then the end-of-response
//! marker and a newline:
//!
//! ```text
//! Welcome to Wordnet!\rEnter username:\r[EOR]\n
//! ```
//!
//! The marker lets a client find the end of a multi-line response on a
//! line-oriented stream.

use bytes::BytesMut;
use std::io;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tracing::trace;

/// End-of-response marker
pub const EOR: &str = "[EOR]";

/// Separator written after every logical line of a response
pub const LINE_BREAK: u8 = b'\r';

/// Terminator written after the marker
const FRAME_END: u8 = b'\n';

/// Initial capacity of the response buffer
const RESPONSE_CAPACITY: usize = 256;

/// Accumulates the lines of one response before it is sent as a frame.
///
/// Nothing reaches the wire until [`Response::send`] is called, and the
/// buffer is empty again once it returns.
#[derive(Debug)]
pub struct Response {
    buf: BytesMut,
}

impl Response {
    /// Create an empty response buffer
    pub fn new() -> Self {
        Response {
            buf: BytesMut::with_capacity(RESPONSE_CAPACITY),
        }
    }

    /// Append one logical line
    pub fn line(&mut self, text: &str) -> &mut Self {
        self.buf.extend_from_slice(text.as_bytes());
        self.buf.extend_from_slice(&[LINE_BREAK]);
        self
    }

    /// Append several logical lines in order
    pub fn lines(&mut self, lines: &[&str]) -> &mut Self {
        for text in lines {
            self.line(text);
        }
        self
    }

    /// True when no line has been added since the last frame
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// Terminate the accumulated lines and take them as one frame,
    /// leaving the buffer empty.
    pub fn frame(&mut self) -> BytesMut {
        self.buf.extend_from_slice(EOR.as_bytes());
        self.buf.extend_from_slice(&[FRAME_END]);
        self.buf.split()
    }

    /// Write the framed response in a single write and flush it.
    pub async fn send<W>(&mut self, writer: &mut W) -> io::Result<()>
    where
        W: AsyncWrite + Unpin,
    {
        debug_assert!(!self.is_empty(), "response has no lines");
        let frame = self.frame();
        trace!(bytes = frame.len(), "Sending frame");
        writer.write_all(&frame).await?;
        writer.flush().await
    }
}

impl Default for Response {
    fn default() -> Self {
        Self::new()
    }
}

/// Longest line a client may send before the read fails
pub const MAX_LINE_LENGTH: usize = 8 * 1024;

/// Read lines until one has non-whitespace content.
///
/// A line ends at `\r`, `\n` or `\r\n`; the empty line between the two
/// bytes of a `\r\n` is skipped like any other blank line. Returns the
/// trimmed line, or `None` once the client has closed its side of the
/// stream. Bytes that are not valid UTF-8 are replaced rather than treated
/// as an error. A line longer than [`MAX_LINE_LENGTH`] is an
/// `InvalidData` error.
pub async fn read_non_empty_line<R>(reader: &mut R) -> io::Result<Option<String>>
where
    R: AsyncBufRead + Unpin,
{
    let mut line = Vec::with_capacity(64);

    loop {
        let (terminated, used) = {
            let available = reader.fill_buf().await?;
            if available.is_empty() {
                trace!("End of stream");
                return Ok(non_blank(&line));
            }

            match available.iter().position(|&b| b == LINE_BREAK || b == FRAME_END) {
                Some(end) => {
                    line.extend_from_slice(&available[..end]);
                    (true, end + 1)
                }
                None => {
                    line.extend_from_slice(available);
                    (false, available.len())
                }
            }
        };
        reader.consume(used);

        if line.len() > MAX_LINE_LENGTH {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                "line exceeds maximum length",
            ));
        }

        if terminated {
            if let Some(text) = non_blank(&line) {
                return Ok(Some(text));
            }
            line.clear();
        }
    }
}

/// Trimmed text of `line`, unless it is only whitespace
fn non_blank(line: &[u8]) -> Option<String> {
    let text = String::from_utf8_lossy(line);
    let trimmed = text.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::BufReader;

    #[test]
    fn test_frame_single_line() {
        let mut response = Response::new();
        response.line("Enter password:");
        assert_eq!(&response.frame()[..], b"Enter password:\r[EOR]\n");
    }

    #[test]
    fn test_frame_multi_line() {
        let mut response = Response::new();
        response.lines(&["Welcome to Wordnet!", "Enter username:"]);
        assert_eq!(
            &response.frame()[..],
            b"Welcome to Wordnet!\rEnter username:\r[EOR]\n"
        );
    }

    #[test]
    fn test_frame_clears_buffer() {
        let mut response = Response::new();
        response.line("T*PP**").line("Try again:");
        assert!(!response.is_empty());

        let _ = response.frame();
        assert!(response.is_empty());

        response.line("Try again:");
        assert_eq!(&response.frame()[..], b"Try again:\r[EOR]\n");
    }

    #[tokio::test]
    async fn test_send_writes_one_frame() {
        let mut writer = tokio_test::io::Builder::new()
            .write(b"Welcome Sammy!\rGuess the mystery six-letter word\r[EOR]\n")
            .build();

        let mut response = Response::new();
        response.lines(&["Welcome Sammy!", "Guess the mystery six-letter word"]);
        response.send(&mut writer).await.unwrap();
        assert!(response.is_empty());
    }

    #[tokio::test]
    async fn test_read_skips_blank_lines() {
        let mut reader = BufReader::new(&b"\n   \r\n\t\n  Sammy  \r\nWOOF\n"[..]);

        let first = read_non_empty_line(&mut reader).await.unwrap();
        assert_eq!(first.as_deref(), Some("Sammy"));

        let second = read_non_empty_line(&mut reader).await.unwrap();
        assert_eq!(second.as_deref(), Some("WOOF"));

        let end = read_non_empty_line(&mut reader).await.unwrap();
        assert_eq!(end, None);
    }

    #[tokio::test]
    async fn test_read_carriage_return_terminated_lines() {
        let mut reader = BufReader::new(&b"Sammy\rWOOF\r"[..]);

        let first = read_non_empty_line(&mut reader).await.unwrap();
        assert_eq!(first.as_deref(), Some("Sammy"));

        let second = read_non_empty_line(&mut reader).await.unwrap();
        assert_eq!(second.as_deref(), Some("WOOF"));

        assert_eq!(read_non_empty_line(&mut reader).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_read_mixed_line_endings() {
        let mut reader = BufReader::new(&b"Sammy\r\nWOOF\rtopple\n\r\r\nripple\r"[..]);

        for expected in ["Sammy", "WOOF", "topple", "ripple"] {
            let line = read_non_empty_line(&mut reader).await.unwrap();
            assert_eq!(line.as_deref(), Some(expected));
        }
        assert_eq!(read_non_empty_line(&mut reader).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_read_carriage_return_does_not_wait_for_newline() {
        let (mut client, server) = tokio::io::duplex(64);
        let mut reader = BufReader::new(server);

        // Client keeps the stream open after the bare `\r`
        client.write_all(b"Sammy\r").await.unwrap();

        let line = tokio::time::timeout(
            std::time::Duration::from_secs(5),
            read_non_empty_line(&mut reader),
        )
        .await
        .expect("line ending at \\r was not returned")
        .unwrap();
        assert_eq!(line.as_deref(), Some("Sammy"));
    }

    #[tokio::test]
    async fn test_read_line_too_long() {
        let mut input = vec![b'a'; MAX_LINE_LENGTH + 1];
        input.push(b'\n');
        let mut reader = BufReader::new(&input[..]);

        let err = read_non_empty_line(&mut reader).await.unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidData);
    }

    #[tokio::test]
    async fn test_read_line_at_length_limit() {
        let mut input = vec![b'a'; MAX_LINE_LENGTH];
        input.push(b'\n');
        let mut reader = BufReader::new(&input[..]);

        let line = read_non_empty_line(&mut reader).await.unwrap().unwrap();
        assert_eq!(line.len(), MAX_LINE_LENGTH);
    }

    #[tokio::test]
    async fn test_read_only_blank_lines_is_end_of_stream() {
        let mut reader = BufReader::new(&b"\n \n\r\n"[..]);
        assert_eq!(read_non_empty_line(&mut reader).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_read_last_line_without_newline() {
        let mut reader = BufReader::new(&b"topple"[..]);
        let line = read_non_empty_line(&mut reader).await.unwrap();
        assert_eq!(line.as_deref(), Some("topple"));
    }

    #[tokio::test]
    async fn test_read_invalid_utf8_is_replaced() {
        let mut reader = BufReader::new(&b"ab\xffcd\n"[..]);
        let line = read_non_empty_line(&mut reader).await.unwrap().unwrap();
        assert_eq!(line, "ab\u{fffd}cd");
    }
}

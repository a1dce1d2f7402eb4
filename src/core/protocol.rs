// src/core/protocol.rs

//! Implements the line-oriented wire protocol: a bounded decoder for incoming
//! command lines and an encoder for framed replies.
//!
//! Requests are single newline-terminated lines. Replies are zero or more
//! text lines followed by a sentinel. The server emits one uniform sentinel,
//! a lone `END` line; readers written against the older convention (trailing
//! blank line) must accept either.

use crate::core::ServeError;
use bytes::{Buf, BufMut, BytesMut};
use tokio_util::codec::{Decoder, Encoder};

/// The end-of-response sentinel line.
pub const SENTINEL: &str = "END";

/// Maximum length of one command line, in bytes. Input beyond this bound is
/// truncated silently by the decoder, never surfaced as an error.
pub const MAX_LINE_LEN: usize = 256;

/// One framed server reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    /// Response body lines, terminated on the wire by the sentinel.
    Body(Vec<String>),
    /// An admission redirect. Sent in place of a body, with no sentinel.
    Redirect(u16),
}

impl Reply {
    /// A single-line body reply.
    pub fn line(text: impl Into<String>) -> Self {
        Reply::Body(vec![text.into()])
    }
}

/// A `tokio_util::codec` implementation framing command lines in and
/// `Reply` values out.
#[derive(Debug, Default)]
pub struct LineCommandCodec {
    /// Set after an overlong line was truncated; the remainder up to the
    /// next newline is dropped without being surfaced.
    discarding: bool,
}

impl Decoder for LineCommandCodec {
    type Item = String;
    type Error = ServeError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        loop {
            if self.discarding {
                match src.iter().position(|&b| b == b'\n') {
                    Some(pos) => {
                        src.advance(pos + 1);
                        self.discarding = false;
                    }
                    None => {
                        src.clear();
                        return Ok(None);
                    }
                }
                continue;
            }

            let search_window = src.len().min(MAX_LINE_LEN + 1);
            if let Some(pos) = src[..search_window].iter().position(|&b| b == b'\n') {
                let line = src.split_to(pos + 1);
                return Ok(Some(trim_line(&line[..pos])));
            }

            if src.len() > MAX_LINE_LEN {
                // Overlong line: truncate at the bound and silently drop the
                // rest up to the newline.
                let line = src.split_to(MAX_LINE_LEN);
                self.discarding = true;
                return Ok(Some(trim_line(&line)));
            }

            return Ok(None);
        }
    }
}

/// Decodes one raw line, stripping a trailing carriage return. Invalid UTF-8
/// is replaced rather than rejected; the grammar will not recognize it.
fn trim_line(raw: &[u8]) -> String {
    let raw = raw.strip_suffix(b"\r").unwrap_or(raw);
    String::from_utf8_lossy(raw).into_owned()
}

impl Encoder<Reply> for LineCommandCodec {
    type Error = ServeError;

    fn encode(&mut self, item: Reply, dst: &mut BytesMut) -> Result<(), Self::Error> {
        match item {
            Reply::Body(lines) => {
                for line in &lines {
                    dst.put_slice(line.as_bytes());
                    dst.put_u8(b'\n');
                }
                dst.put_slice(SENTINEL.as_bytes());
                dst.put_u8(b'\n');
            }
            Reply::Redirect(port) => {
                dst.put_slice(format!("redirect {port}\n").as_bytes());
            }
        }
        Ok(())
    }
}

/// True if a received line marks end-of-response under either sentinel
/// convention: the uniform `END` line or the legacy trailing blank line.
pub fn is_sentinel_line(line: &str) -> bool {
    line == SENTINEL || line.is_empty()
}

/// Parses a `redirect <port>` line, if that is what it is.
pub fn parse_redirect(line: &str) -> Option<u16> {
    line.strip_prefix("redirect ")?.trim().parse().ok()
}

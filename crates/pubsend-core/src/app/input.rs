//! Input decoding: turn the data argument (or stdin) into raw payloads.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use tokio::io::{AsyncRead, AsyncReadExt};

use crate::domain::PublishError;

/// Data argument that switches to reading stdin.
pub const STDIN_MARKER: &str = "-";

/// Payloads described by the data argument.
///
/// `-` reads newline-delimited base64 from `stdin`; anything else is a single
/// message (see [`decode_inline`]).
pub async fn read_payloads<R>(data: &str, mut stdin: R) -> Result<Vec<Vec<u8>>, PublishError>
where
    R: AsyncRead + Unpin,
{
    if data != STDIN_MARKER {
        return Ok(vec![decode_inline(data)]);
    }

    tracing::debug!("reading data from stdin");
    let mut buf = Vec::new();
    stdin.read_to_end(&mut buf).await?;
    decode_lines(&buf)
}

/// Decode one base64 message per line, skipping blank lines.
///
/// Errors report the 0-based index of the line in the raw input.
pub fn decode_lines(input: &[u8]) -> Result<Vec<Vec<u8>>, PublishError> {
    let mut out = Vec::new();
    for (line, raw) in input.split(|b| *b == b'\n').enumerate() {
        let trimmed = raw.trim_ascii();
        if trimmed.is_empty() {
            continue;
        }
        let payload = STANDARD
            .decode(trimmed)
            .map_err(|source| PublishError::DecodeLine { line, source })?;
        out.push(payload);
    }
    Ok(out)
}

/// Base64-decode `arg`, or use its raw bytes if it is not valid base64.
pub fn decode_inline(arg: &str) -> Vec<u8> {
    STANDARD
        .decode(arg)
        .unwrap_or_else(|_| arg.as_bytes().to_vec())
}

// src/runner/drain.rs

//! Chunked draining of child output pipes.

use tokio::io::{AsyncRead, AsyncReadExt};
use tracing::warn;

/// Default number of bytes read from a child pipe per read call.
///
/// Small on purpose: many short reads keep the runtime responsive while a
/// chatty child is streaming, at the cost of some throughput.
pub const DEFAULT_READ_CHUNK: usize = 64;

/// Read a child output pipe to end-of-stream, `chunk` bytes at a time.
///
/// Returns the accumulated bytes, or `None` if no data ever arrived. The
/// accumulator is created lazily on the first data arrival, so "no output"
/// and "empty output" stay distinguishable.
///
/// The accumulator is a raw byte-exact concatenation of every chunk in
/// arrival order; nothing is framed, trimmed or re-encoded.
///
/// A read error ends the capture for this stream only: it is logged, the
/// bytes collected so far are kept, and the invocation as a whole carries on.
pub async fn drain_stream<R>(mut pipe: R, chunk: usize, stream: &'static str) -> Option<Vec<u8>>
where
    R: AsyncRead + Unpin,
{
    let mut acc: Option<Vec<u8>> = None;
    let mut buf = vec![0u8; chunk];

    loop {
        match pipe.read(&mut buf).await {
            // Zero bytes means the write end is closed; the stream is done.
            Ok(0) => break,
            Ok(n) => {
                acc.get_or_insert_with(Vec::new).extend_from_slice(&buf[..n]);
            }
            Err(e) => {
                warn!(
                    stream,
                    error = %e,
                    "read error on child pipe; keeping bytes collected so far"
                );
                break;
            }
        }
    }

    acc
}

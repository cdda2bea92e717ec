use bytes::{Bytes, BytesMut};

/// Append-only byte accumulator for one request's inbound or outbound body.
///
/// Two instances exist per request, one owned by each transcoding wrapper.
/// The buffer is never read until the terminal chunk has been fed; `take`
/// hands the accumulated bytes out and resets the buffer.
#[derive(Debug)]
pub(crate) struct BodyBuffer {
    buf: BytesMut,
    chunks: usize,
}

impl BodyBuffer {
    pub(crate) fn new() -> Self {
        Self { buf: BytesMut::with_capacity(4096), chunks: 0 }
    }

    /// Appends one body chunk, empty chunks included.
    pub(crate) fn feed(&mut self, data: &[u8]) {
        self.buf.extend_from_slice(data);
        self.chunks += 1;
    }

    /// Number of chunks fed so far.
    pub(crate) fn chunks(&self) -> usize {
        self.chunks
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// Takes the accumulated bytes, leaving the buffer empty.
    pub(crate) fn take(&mut self) -> Bytes {
        self.chunks = 0;
        self.buf.split().freeze()
    }
}

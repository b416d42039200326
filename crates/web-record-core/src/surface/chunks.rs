/// Append-only, in-order buffer of encoded media chunks.
#[derive(Debug, Default)]
pub struct ChunkBuffer {
    chunks: Vec<Vec<u8>>,
    total_bytes: usize,
}

impl ChunkBuffer {
    /// Append a chunk. Empty chunks are skipped.
    pub fn push(&mut self, chunk: Vec<u8>) {
        if chunk.is_empty() {
            return;
        }
        self.total_bytes += chunk.len();
        self.chunks.push(chunk);
    }

    /// Number of buffered chunks.
    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    /// True if nothing was buffered.
    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    /// Sum of all chunk sizes.
    pub fn total_bytes(&self) -> usize {
        self.total_bytes
    }

    /// Concatenate the chunks into a single container.
    pub fn into_container(self) -> Vec<u8> {
        let mut container = Vec::with_capacity(self.total_bytes);
        for chunk in self.chunks {
            container.extend_from_slice(&chunk);
        }
        container
    }
}

//! Lazily generated upload payload.

use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};

/// Largest buffer handed to the request body at once.
pub const MAX_CHUNK_SIZE: usize = 1024 * 1024;

/// Random bytes produced one bounded chunk at a time.
///
/// Only the chunk currently being yielded is ever held in memory, so the
/// payload size is independent of memory use. Bytes come from a CSPRNG
/// seeded once from the operating system.
pub struct RandomPayload {
    total: u64,
    remaining: u64,
    chunk_size: usize,
    rng: StdRng,
}

impl RandomPayload {
    pub fn new(total: u64) -> Self {
        Self::with_rng(total, StdRng::from_entropy())
    }

    pub(crate) fn with_rng(total: u64, rng: StdRng) -> Self {
        let chunk_size = total.min(MAX_CHUNK_SIZE as u64) as usize;

        Self { total, remaining: total, chunk_size, rng }
    }

    /// Total number of bytes the payload will yield.
    pub fn len(&self) -> u64 {
        self.total
    }

    pub fn is_empty(&self) -> bool {
        self.total == 0
    }
}

impl Iterator for RandomPayload {
    type Item = Vec<u8>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }

        let size = self.remaining.min(self.chunk_size as u64) as usize;
        let mut chunk = vec![0u8; size];
        self.rng.fill_bytes(&mut chunk);
        self.remaining -= size as u64;

        Some(chunk)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        if self.chunk_size == 0 {
            return (0, Some(0));
        }

        let chunks =
            self.remaining.div_ceil(self.chunk_size as u64) as usize;
        (chunks, Some(chunks))
    }
}

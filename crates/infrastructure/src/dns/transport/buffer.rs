/// Initial receive capacity: the largest message either transport can carry.
pub const SCRATCH_CAPACITY: usize = 65536;

/// Owned response accumulator.
///
/// `data` is always fully allocated; `filled` marks how much of it holds
/// bytes received so far.
#[derive(Debug, Default)]
pub struct ResponseBuffer {
    data: Vec<u8>,
    filled: usize,
}

impl ResponseBuffer {
    pub fn scratch() -> Self {
        Self::with_len(SCRATCH_CAPACITY)
    }

    pub fn with_len(len: usize) -> Self {
        Self {
            data: vec![0u8; len],
            filled: 0,
        }
    }

    pub fn filled(&self) -> &[u8] {
        &self.data[..self.filled]
    }

    pub fn unfilled_mut(&mut self) -> &mut [u8] {
        &mut self.data[self.filled..]
    }

    pub fn advance(&mut self, n: usize) {
        self.filled = (self.filled + n).min(self.data.len());
    }

    /// Copies as much of `bytes` as fits; returns the number copied.
    pub fn extend_from_slice(&mut self, bytes: &[u8]) -> usize {
        let n = bytes.len().min(self.data.len() - self.filled);
        self.data[self.filled..self.filled + n].copy_from_slice(&bytes[..n]);
        self.filled += n;
        n
    }

    pub fn capacity(&self) -> usize {
        self.data.len()
    }

    pub fn is_full(&self) -> bool {
        self.filled == self.data.len()
    }

    pub fn to_vec(&self) -> Vec<u8> {
        self.filled().to_vec()
    }
}

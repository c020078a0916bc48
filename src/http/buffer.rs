/// Growable buffer of bytes read from the stream but not yet parsed.
///
/// Physical capacity only grows, doubling whenever the held bytes would
/// overflow it. Consumed bytes are dropped by shifting the remainder to the
/// front, so the unparsed tail always starts at offset 0.
#[derive(Debug)]
pub struct ByteAccumulator {
    data: Vec<u8>,
    len: usize,
}

impl ByteAccumulator {
    /// Creates an empty accumulator with the given initial capacity (at least 1).
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            data: vec![0; capacity.max(1)],
            len: 0,
        }
    }

    /// Copies `chunk` to the tail, doubling capacity as often as needed first.
    pub fn append(&mut self, chunk: &[u8]) {
        let needed = self.len + chunk.len();

        if needed > self.data.len() {
            self.data.resize(grown_capacity(self.data.len(), needed), 0);
        }

        self.data[self.len..needed].copy_from_slice(chunk);
        self.len = needed;
    }

    /// Discards the first `n` held bytes. Asking for more than is held
    /// discards everything.
    pub fn consume(&mut self, n: usize) {
        let n = n.min(self.len);
        if n == 0 {
            return;
        }

        self.data.copy_within(n..self.len, 0);
        self.len -= n;
    }

    /// The currently held, unconsumed bytes.
    pub fn view(&self) -> &[u8] {
        &self.data[..self.len]
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn capacity(&self) -> usize {
        self.data.len()
    }
}

/// Doubles `current` until it holds `needed` bytes. Falls back to exactly
/// `needed` once another doubling would overflow `usize`.
pub(crate) fn grown_capacity(current: usize, needed: usize) -> usize {
    let mut capacity = current.max(1);
    while capacity < needed {
        capacity = match capacity.checked_mul(2) {
            Some(doubled) => doubled,
            None => return needed,
        };
    }
    capacity
}

impl Default for ByteAccumulator {
    fn default() -> Self {
        Self::with_capacity(8)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn append_doubles_until_it_fits() {
        let mut buf = ByteAccumulator::with_capacity(4);
        buf.append(b"0123456789");

        assert_eq!(buf.capacity(), 16);
        assert_eq!(buf.view(), b"0123456789");
    }

    #[test]
    fn growth_stops_doubling_before_overflow() {
        assert_eq!(grown_capacity(8, 9), 16);
        assert_eq!(grown_capacity(8, 8), 8);
        assert_eq!(grown_capacity(0, 3), 4);

        let half = usize::MAX / 2 + 1;
        assert_eq!(grown_capacity(half, usize::MAX), usize::MAX);
        assert_eq!(grown_capacity(half, half + 1), half + 1);
    }
}

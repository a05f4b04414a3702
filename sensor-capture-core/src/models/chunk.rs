use std::fmt::Write as _;

/// One fixed-size unit of data copied out of the shared buffer.
///
/// Immutable once produced; the sink takes ownership on write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaptureChunk {
    sequence: u64,
    data: Vec<u8>,
}

impl CaptureChunk {
    pub fn new(sequence: u64, data: Vec<u8>) -> Self {
        Self { sequence, data }
    }

    /// Zero-based position of this chunk within its session.
    pub fn sequence(&self) -> u64 {
        self.sequence
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Uppercase hex rendering of the first `max_bytes` bytes, space separated.
    pub fn preview(&self, max_bytes: usize) -> String {
        let shown = &self.data[..self.data.len().min(max_bytes)];
        let mut out = String::with_capacity(shown.len() * 3);
        for (i, byte) in shown.iter().enumerate() {
            if i > 0 {
                out.push(' ');
            }
            // Writing into a String cannot fail.
            let _ = write!(out, "{:02X}", byte);
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn preview_is_uppercase_hex() {
        let chunk = CaptureChunk::new(0, vec![0x00, 0xab, 0x7f, 0x10]);
        assert_eq!(chunk.preview(16), "00 AB 7F 10");
    }

    #[test]
    fn preview_truncates_to_limit() {
        let chunk = CaptureChunk::new(3, (0u8..64).collect());
        let preview = chunk.preview(16);
        assert_eq!(preview.split(' ').count(), 16);
        assert!(preview.ends_with("0F"));
    }

    #[test]
    fn preview_of_empty_chunk() {
        let chunk = CaptureChunk::new(0, Vec::new());
        assert!(chunk.is_empty());
        assert_eq!(chunk.preview(16), "");
    }
}

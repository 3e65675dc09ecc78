//! Minimal XDR writer
//!
//! The network speaks XDR (RFC 4506): big-endian 4-byte words, unions
//! tagged with a u32 discriminant, variable opaques length-prefixed and
//! padded to a word boundary. Only the pieces the two envelope shapes need
//! are implemented.

/// Append-only XDR byte writer
#[derive(Debug, Default)]
pub struct XdrWriter {
    buf: Vec<u8>,
}

impl XdrWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn put_u32(&mut self, value: u32) {
        self.buf.extend_from_slice(&value.to_be_bytes());
    }

    pub fn put_u64(&mut self, value: u64) {
        self.buf.extend_from_slice(&value.to_be_bytes());
    }

    pub fn put_i64(&mut self, value: i64) {
        self.buf.extend_from_slice(&value.to_be_bytes());
    }

    /// Fixed-length opaque: raw bytes, padded to a word boundary
    pub fn put_opaque_fixed(&mut self, bytes: &[u8]) {
        self.buf.extend_from_slice(bytes);
        self.pad();
    }

    /// Variable-length opaque: u32 length, bytes, padding
    pub fn put_opaque_var(&mut self, bytes: &[u8]) {
        self.put_u32(bytes.len() as u32);
        self.buf.extend_from_slice(bytes);
        self.pad();
    }

    pub fn extend(&mut self, other: &XdrWriter) {
        self.buf.extend_from_slice(&other.buf);
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.buf
    }

    fn pad(&mut self) {
        while self.buf.len() % 4 != 0 {
            self.buf.push(0);
        }
    }
}

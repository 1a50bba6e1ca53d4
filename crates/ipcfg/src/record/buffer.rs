//! Bounds-checked access to an enumeration buffer.

use zerocopy::{FromBytes, IntoBytes};

use crate::codepage::{self, CodePage};
use crate::error::{Error, Result};

/// Storage the host fills with linked adapter records.
///
/// Backed by `u64` words so every record starts suitably aligned for the
/// host to write it.
#[derive(Debug, Clone, Default)]
pub struct AdapterBuffer {
    words: Vec<u64>,
}

impl AdapterBuffer {
    /// Initial size handed to the first enumeration attempt.
    pub const INITIAL_SIZE: usize = 15 * 1024;

    /// Create a buffer of at least `size` bytes.
    pub fn with_size(size: usize) -> Self {
        Self {
            words: vec![0; size.div_ceil(8)],
        }
    }

    /// Size in bytes.
    pub fn len(&self) -> usize {
        self.words.len() * 8
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    /// Grow (or shrink) to at least `size` bytes, zeroing the contents.
    pub fn resize(&mut self, size: usize) {
        self.words.clear();
        self.words.resize(size.div_ceil(8), 0);
    }

    /// The raw bytes.
    pub fn as_bytes(&self) -> &[u8] {
        self.words.as_bytes()
    }

    /// The raw bytes, for the host (or a test double) to fill.
    pub fn as_mut_bytes(&mut self) -> &mut [u8] {
        self.words.as_mut_bytes()
    }

    /// Absolute address of the first byte, which the record pointers are relative to.
    pub fn base(&self) -> u64 {
        self.words.as_ptr() as usize as u64
    }

    /// View for decoding.
    pub fn records(&self) -> RecordBuffer<'_> {
        RecordBuffer::new(self.as_bytes(), self.base())
    }
}

/// A byte slice whose embedded pointers are absolute addresses, `base` being
/// the address of the first byte.
///
/// Every pointer is translated into an offset and checked against the slice
/// before anything is read, so a corrupt record yields an error instead of a
/// wild read.
#[derive(Debug, Clone, Copy)]
pub struct RecordBuffer<'a> {
    bytes: &'a [u8],
    base: u64,
}

impl<'a> RecordBuffer<'a> {
    pub fn new(bytes: &'a [u8], base: u64) -> Self {
        Self { bytes, base }
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn base(&self) -> u64 {
        self.base
    }

    /// Translate a pointer into an offset into the buffer.
    pub fn offset(&self, ptr: u64) -> Result<usize> {
        ptr.checked_sub(self.base)
            .and_then(|off| usize::try_from(off).ok())
            .filter(|off| *off < self.bytes.len())
            .ok_or_else(|| {
                Error::InvalidRecord(format!(
                    "pointer {ptr:#x} outside buffer at {:#x} ({} bytes)",
                    self.base,
                    self.bytes.len()
                ))
            })
    }

    /// Bytes from `ptr` to the end of the buffer.
    pub fn tail(&self, ptr: u64) -> Result<&'a [u8]> {
        let off = self.offset(ptr)?;
        Ok(&self.bytes[off..])
    }

    /// `len` bytes starting at `ptr`.
    pub fn slice(&self, ptr: u64, len: usize) -> Result<&'a [u8]> {
        let tail = self.tail(ptr)?;
        tail.get(..len).ok_or(Error::Truncated {
            expected: len,
            actual: tail.len(),
        })
    }

    /// Copy a record out of the buffer.
    pub fn read<T: FromBytes>(&self, ptr: u64) -> Result<T> {
        let tail = self.tail(ptr)?;
        T::read_from_prefix(tail)
            .map(|(value, _)| value)
            .map_err(|_| Error::Truncated {
                expected: size_of::<T>(),
                actual: tail.len(),
            })
    }

    /// Read a NUL-terminated string in the ANSI code page. Null is empty.
    pub fn ansi_string(&self, ptr: u64) -> Result<String> {
        if ptr == 0 {
            return Ok(String::new());
        }
        let tail = self.tail(ptr)?;
        let end = tail
            .iter()
            .position(|b| *b == 0)
            .ok_or_else(|| Error::InvalidRecord(format!("unterminated string at {ptr:#x}")))?;
        Ok(codepage::decode(&tail[..end], CodePage::Ansi))
    }

    /// Read a NUL-terminated UTF-16 string. Null is empty.
    pub fn wide_string(&self, ptr: u64) -> Result<String> {
        if ptr == 0 {
            return Ok(String::new());
        }
        let tail = self.tail(ptr)?;
        let mut units = Vec::new();
        for pair in tail.chunks_exact(2) {
            let unit = u16::from_ne_bytes([pair[0], pair[1]]);
            if unit == 0 {
                return Ok(String::from_utf16_lossy(&units));
            }
            units.push(unit);
        }
        Err(Error::InvalidRecord(format!(
            "unterminated UTF-16 string at {ptr:#x}"
        )))
    }
}

/// Decode a fixed-size UTF-16 array up to its first NUL.
pub fn wide_array(units: &[u16]) -> String {
    let end = units.iter().position(|u| *u == 0).unwrap_or(units.len());
    String::from_utf16_lossy(&units[..end])
}

#[cfg(test)]
mod tests {
    use super::*;

    const BASE: u64 = 0x1000;

    #[test]
    fn test_offset_bounds() {
        let data = [0u8; 16];
        let buf = RecordBuffer::new(&data, BASE);
        assert_eq!(buf.offset(BASE).unwrap(), 0);
        assert_eq!(buf.offset(BASE + 15).unwrap(), 15);
        assert!(matches!(buf.offset(BASE + 16), Err(Error::InvalidRecord(_))));
        assert!(matches!(buf.offset(BASE - 1), Err(Error::InvalidRecord(_))));
    }

    #[test]
    fn test_read_truncated() {
        let data = [1u8, 0, 0, 0, 2, 0];
        let buf = RecordBuffer::new(&data, BASE);
        assert_eq!(buf.read::<u32>(BASE).unwrap(), u32::from_ne_bytes([1, 0, 0, 0]));
        match buf.read::<u32>(BASE + 4) {
            Err(Error::Truncated { expected, actual }) => {
                assert_eq!(expected, 4);
                assert_eq!(actual, 2);
            }
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn test_ansi_string() {
        let data = b"{4D36E972}\0junk";
        let buf = RecordBuffer::new(data, BASE);
        assert_eq!(buf.ansi_string(BASE).unwrap(), "{4D36E972}");
        assert_eq!(buf.ansi_string(0).unwrap(), "");
        assert!(buf.ansi_string(BASE + 11).is_err());
    }

    #[test]
    fn test_wide_string() {
        let mut data = Vec::new();
        for unit in "Wi-Fi".encode_utf16().chain([0]) {
            data.extend_from_slice(&unit.to_ne_bytes());
        }
        let buf = RecordBuffer::new(&data, BASE);
        assert_eq!(buf.wide_string(BASE).unwrap(), "Wi-Fi");
        assert_eq!(buf.wide_string(0).unwrap(), "");

        // Missing terminator
        let cut = RecordBuffer::new(&data[..4], BASE);
        assert!(cut.wide_string(BASE).is_err());
    }

    #[test]
    fn test_wide_array() {
        let mut units = [0u16; 8];
        for (slot, unit) in units.iter_mut().zip("corp".encode_utf16()) {
            *slot = unit;
        }
        assert_eq!(wide_array(&units), "corp");
        assert_eq!(wide_array(&[]), "");
    }

    #[test]
    fn test_adapter_buffer() {
        let mut buf = AdapterBuffer::with_size(AdapterBuffer::INITIAL_SIZE);
        assert_eq!(buf.len(), 15 * 1024);
        assert_eq!(buf.base() % 8, 0);
        buf.resize(20_001);
        assert!(buf.len() >= 20_001);
        assert_eq!(buf.records().len(), buf.len());
    }
}

//! Persisted Record Framing
//!
//! Config and data pages hold fixed-layout little-endian records:
//!
//! ```text
//! ┌────────┬─────────┬──────────────────────┬───────┐
//! │ magic  │ version │ body                 │ crc-8 │
//! │ u16 LE │ u8      │ fields, little-endian│ u8    │
//! └────────┴─────────┴──────────────────────┴───────┘
//! ```
//!
//! The CRC covers everything before it. A record with the wrong magic,
//! version or checksum is reported as [`StorageError::Corrupt`], never
//! partially applied.

use crate::errors::StorageError;

/// Largest record a storage page holds
pub const PAGE_SIZE: usize = 256;

const HEADER_LEN: usize = 3;
const CRC_POLY: u8 = 0x07;

/// CRC-8 (polynomial 0x07, init 0)
pub fn crc8(bytes: &[u8]) -> u8 {
    bytes.iter().fold(0u8, |mut crc, byte| {
        crc ^= byte;
        for _ in 0..8 {
            crc = if crc & 0x80 != 0 { (crc << 1) ^ CRC_POLY } else { crc << 1 };
        }
        crc
    })
}

/// Serializes one record into a page buffer
pub struct RecordWriter<'a> {
    buf: &'a mut [u8],
    len: usize,
}

impl<'a> RecordWriter<'a> {
    /// Start a record with its header
    pub fn new(buf: &'a mut [u8], magic: u16, version: u8) -> Result<Self, StorageError> {
        let mut writer = Self { buf, len: 0 };
        writer.put_u16(magic)?;
        writer.put_u8(version)?;
        Ok(writer)
    }

    fn put(&mut self, bytes: &[u8]) -> Result<&mut Self, StorageError> {
        let end = self.len + bytes.len();
        // Keep room for the trailing CRC
        if end >= self.buf.len() {
            return Err(StorageError::TooLarge);
        }
        self.buf[self.len..end].copy_from_slice(bytes);
        self.len = end;
        Ok(self)
    }

    /// Append a byte
    pub fn put_u8(&mut self, value: u8) -> Result<&mut Self, StorageError> {
        self.put(&[value])
    }

    /// Append a flag as one byte
    pub fn put_bool(&mut self, value: bool) -> Result<&mut Self, StorageError> {
        self.put_u8(value as u8)
    }

    /// Append a u16
    pub fn put_u16(&mut self, value: u16) -> Result<&mut Self, StorageError> {
        self.put(&value.to_le_bytes())
    }

    /// Append a u32
    pub fn put_u32(&mut self, value: u32) -> Result<&mut Self, StorageError> {
        self.put(&value.to_le_bytes())
    }

    /// Append an i32
    pub fn put_i32(&mut self, value: i32) -> Result<&mut Self, StorageError> {
        self.put(&value.to_le_bytes())
    }

    /// Seal with the checksum; returns the record length
    pub fn finish(self) -> Result<usize, StorageError> {
        let crc = crc8(&self.buf[..self.len]);
        let slot = self.buf.get_mut(self.len).ok_or(StorageError::TooLarge)?;
        *slot = crc;
        Ok(self.len + 1)
    }
}

/// Reads fields back out of a validated record
pub struct RecordReader<'a> {
    body: &'a [u8],
    pos: usize,
}

impl<'a> RecordReader<'a> {
    /// Validate framing and position at the first body field
    pub fn open(bytes: &'a [u8], magic: u16, version: u8) -> Result<Self, StorageError> {
        if bytes.len() < HEADER_LEN + 1 {
            return Err(StorageError::Corrupt);
        }
        let (framed, crc) = bytes.split_at(bytes.len() - 1);
        if crc8(framed) != crc[0] {
            return Err(StorageError::Corrupt);
        }
        if u16::from_le_bytes([framed[0], framed[1]]) != magic || framed[2] != version {
            return Err(StorageError::Corrupt);
        }
        Ok(Self { body: &framed[HEADER_LEN..], pos: 0 })
    }

    fn take<const N: usize>(&mut self) -> Result<[u8; N], StorageError> {
        let end = self.pos + N;
        let mut out = [0u8; N];
        out.copy_from_slice(self.body.get(self.pos..end).ok_or(StorageError::Corrupt)?);
        self.pos = end;
        Ok(out)
    }

    /// Next byte
    pub fn get_u8(&mut self) -> Result<u8, StorageError> {
        Ok(self.take::<1>()?[0])
    }

    /// Next flag
    pub fn get_bool(&mut self) -> Result<bool, StorageError> {
        match self.get_u8()? {
            0 => Ok(false),
            1 => Ok(true),
            _ => Err(StorageError::Corrupt),
        }
    }

    /// Next u16
    pub fn get_u16(&mut self) -> Result<u16, StorageError> {
        Ok(u16::from_le_bytes(self.take()?))
    }

    /// Next u32
    pub fn get_u32(&mut self) -> Result<u32, StorageError> {
        Ok(u32::from_le_bytes(self.take()?))
    }

    /// Next i32
    pub fn get_i32(&mut self) -> Result<i32, StorageError> {
        Ok(i32::from_le_bytes(self.take()?))
    }
}

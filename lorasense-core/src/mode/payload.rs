//! Uplink payload builder
//!
//! Payloads are big-endian (network order) and always start with the mode
//! index so the decoder on the application server knows the layout.

use heapless::Vec;

use crate::constants::payload::{MAX_PAYLOAD_LEN, READING_SENTINEL};
use crate::errors::{RadioError, SensorError};
use crate::mode::ModeId;

/// Result of pushing into a [`Payload`]
pub type PayloadResult<'a> = Result<&'a mut Payload, RadioError>;

/// Uplink payload under construction
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Payload {
    bytes: Vec<u8, MAX_PAYLOAD_LEN>,
}

impl Payload {
    /// Empty payload
    pub fn new() -> Self {
        Self::default()
    }

    /// Payload starting with the mode header byte
    pub fn for_mode(mode: ModeId) -> Self {
        let mut payload = Self::new();
        // An empty payload always has room for one byte
        let _ = payload.bytes.push(mode.index());
        payload
    }

    fn extend(&mut self, bytes: &[u8]) -> PayloadResult<'_> {
        self.bytes
            .extend_from_slice(bytes)
            .map_err(|_| RadioError::PayloadTooLarge)?;
        Ok(self)
    }

    /// Append a byte
    pub fn push_u8(&mut self, value: u8) -> PayloadResult<'_> {
        self.extend(&[value])
    }

    /// Append a u16
    pub fn push_u16(&mut self, value: u16) -> PayloadResult<'_> {
        self.extend(&value.to_be_bytes())
    }

    /// Append a u32
    pub fn push_u32(&mut self, value: u32) -> PayloadResult<'_> {
        self.extend(&value.to_be_bytes())
    }

    /// Append an i32
    pub fn push_i32(&mut self, value: i32) -> PayloadResult<'_> {
        self.extend(&value.to_be_bytes())
    }

    /// Append a sensor reading, substituting the sentinel on failure
    pub fn push_reading(&mut self, reading: Result<i32, SensorError>) -> PayloadResult<'_> {
        self.push_i32(reading.unwrap_or(READING_SENTINEL))
    }

    /// Encoded bytes
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Encoded length
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Whether nothing has been pushed
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn big_endian_fields_after_header() {
        let mut payload = Payload::for_mode(ModeId::Counter1);
        payload.push_u16(0x0102).unwrap().push_u32(0x0A0B0C0D).unwrap();
        assert_eq!(payload.as_bytes(), &[1, 0x01, 0x02, 0x0A, 0x0B, 0x0C, 0x0D]);
    }

    #[test]
    fn failed_reading_becomes_sentinel() {
        let mut payload = Payload::new();
        payload.push_reading(Err(SensorError::Timeout)).unwrap();
        assert_eq!(payload.as_bytes(), &READING_SENTINEL.to_be_bytes());
    }

    #[test]
    fn overflow_is_reported() {
        let mut payload = Payload::new();
        for _ in 0..MAX_PAYLOAD_LEN / 4 {
            payload.push_u32(0).unwrap();
        }
        assert_eq!(payload.push_u32(0).err(), Some(RadioError::PayloadTooLarge));
    }
}

//! Byte-level marshaling for RAPI buffers.
//!
//! Every value on the wire is little-endian. Strings travel as UTF-16LE with
//! a leading u32 length in characters (no terminator). Raw byte runs carry a
//! leading u32 byte count.

use crate::phone::error::PhoneError;

pub fn encode_utf16le(s: &str) -> Vec<u8> {
    s.encode_utf16().flat_map(u16::to_le_bytes).collect()
}

pub fn decode_utf16le(raw: &[u8]) -> Result<String, PhoneError> {
    if raw.len() % 2 != 0 {
        return Err(PhoneError::Protocol(
            "odd-length UTF-16 string payload".to_string(),
        ));
    }
    let units = raw
        .chunks_exact(2)
        .map(|pair| u16::from_le_bytes([pair[0], pair[1]]));
    char::decode_utf16(units)
        .collect::<Result<String, _>>()
        .map_err(|_| PhoneError::Protocol("unpaired UTF-16 surrogate in reply".to_string()))
}

/// Outgoing request payload. The first field is always the command code.
#[derive(Debug)]
pub struct Frame {
    payload: Vec<u8>,
}

impl Frame {
    pub fn new(command: u32) -> Self {
        let mut payload = Vec::with_capacity(64);
        payload.extend_from_slice(&command.to_le_bytes());
        Self { payload }
    }

    pub fn put_u16(&mut self, value: u16) {
        self.payload.extend_from_slice(&value.to_le_bytes());
    }

    pub fn put_u32(&mut self, value: u32) {
        self.payload.extend_from_slice(&value.to_le_bytes());
    }

    /// String parameter: u32 character count, then UTF-16LE units.
    pub fn put_string(&mut self, s: &str) {
        let units = encode_utf16le(s);
        self.put_u32((units.len() / 2) as u32);
        self.payload.extend_from_slice(&units);
    }

    /// Nullable string parameter: u32 presence flag, then the string if set.
    pub fn put_opt_string(&mut self, s: Option<&str>) {
        match s {
            Some(s) => {
                self.put_u32(1);
                self.put_string(s);
            }
            None => self.put_u32(0),
        }
    }

    /// Counted byte run: u32 byte count, then the bytes.
    pub fn put_data(&mut self, data: &[u8]) {
        self.put_u32(data.len() as u32);
        self.payload.extend_from_slice(data);
    }

    pub fn command(&self) -> u32 {
        u32::from_le_bytes([
            self.payload[0],
            self.payload[1],
            self.payload[2],
            self.payload[3],
        ])
    }

    pub fn payload(&self) -> &[u8] {
        &self.payload
    }
}

/// Reply payload positioned past the status words.
///
/// Replies open with `result_1`; when it equals 1 an HRESULT follows, and a
/// nonzero HRESULT means the remote call failed. Whatever remains is
/// command-specific output read with the `take_*` methods.
#[derive(Debug)]
pub struct Reply {
    data: Vec<u8>,
    pos: usize,
}

impl Reply {
    pub fn parse(data: Vec<u8>) -> Result<Self, PhoneError> {
        let mut reply = Reply { data, pos: 0 };
        let result_1 = reply.take_u32()?;
        if result_1 == 1 {
            let hresult = reply.take_u32()?;
            if hresult != 0 {
                return Err(PhoneError::Remote(hresult));
            }
        }
        Ok(reply)
    }

    /// Reader over a raw payload with no status words, for test fixtures.
    #[cfg(test)]
    pub(crate) fn raw(data: Vec<u8>) -> Self {
        Reply { data, pos: 0 }
    }

    fn take(&mut self, n: usize) -> Result<&[u8], PhoneError> {
        if self.data.len() - self.pos < n {
            return Err(PhoneError::Protocol(format!(
                "reply truncated: wanted {} bytes, {} left",
                n,
                self.data.len() - self.pos
            )));
        }
        let slice = &self.data[self.pos..self.pos + n];
        self.pos += n;
        Ok(slice)
    }

    pub fn take_u16(&mut self) -> Result<u16, PhoneError> {
        let b = self.take(2)?;
        Ok(u16::from_le_bytes([b[0], b[1]]))
    }

    pub fn take_u32(&mut self) -> Result<u32, PhoneError> {
        let b = self.take(4)?;
        Ok(u32::from_le_bytes([b[0], b[1], b[2], b[3]]))
    }

    pub fn take_u64(&mut self) -> Result<u64, PhoneError> {
        let b = self.take(8)?;
        Ok(u64::from_le_bytes([
            b[0], b[1], b[2], b[3], b[4], b[5], b[6], b[7],
        ]))
    }

    pub fn take_bool(&mut self) -> Result<bool, PhoneError> {
        Ok(self.take_u32()? != 0)
    }

    pub fn take_string(&mut self) -> Result<String, PhoneError> {
        let chars = self.take_u32()? as usize;
        let raw = self.take(chars * 2)?.to_vec();
        decode_utf16le(&raw)
    }

    pub fn skip(&mut self, n: usize) -> Result<(), PhoneError> {
        self.take(n).map(|_| ())
    }

    pub fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::phone::error::PhoneError;

    #[test]
    fn frame_opens_with_command_code() {
        let mut frame = Frame::new(0x29);
        frame.put_u32(7);
        assert_eq!(frame.command(), 0x29);
        assert_eq!(&frame.payload()[..4], &0x29u32.to_le_bytes());
        assert_eq!(&frame.payload()[4..], &7u32.to_le_bytes());
    }

    #[test]
    fn strings_round_trip() {
        let mut frame = Frame::new(0);
        frame.put_string("\\Storage Card\\app.cab");

        let mut reply = Reply::raw(frame.payload()[4..].to_vec());
        assert_eq!(reply.take_string().unwrap(), "\\Storage Card\\app.cab");
        assert_eq!(reply.remaining(), 0);
    }

    #[test]
    fn non_ascii_strings_round_trip() {
        let mut frame = Frame::new(0);
        frame.put_string("Tête de lit 漢字");
        let mut reply = Reply::raw(frame.payload()[4..].to_vec());
        assert_eq!(reply.take_string().unwrap(), "Tête de lit 漢字");
    }

    #[test]
    fn opt_string_writes_presence_flag() {
        let mut frame = Frame::new(0);
        frame.put_opt_string(None);
        frame.put_opt_string(Some("x"));

        let mut reply = Reply::raw(frame.payload()[4..].to_vec());
        assert_eq!(reply.take_u32().unwrap(), 0);
        assert_eq!(reply.take_u32().unwrap(), 1);
        assert_eq!(reply.take_string().unwrap(), "x");
    }

    #[test]
    fn counted_data_round_trips() {
        let mut frame = Frame::new(0);
        frame.put_data(b"abc");
        let mut reply = Reply::raw(frame.payload()[4..].to_vec());
        assert_eq!(reply.take_u32().unwrap(), 3);
        assert_eq!(reply.take(3).unwrap(), b"abc");
    }

    #[test]
    fn reply_accepts_success_status() {
        let mut data = Vec::new();
        data.extend_from_slice(&1u32.to_le_bytes()); // result_1: HRESULT follows
        data.extend_from_slice(&0u32.to_le_bytes()); // S_OK
        data.extend_from_slice(&42u32.to_le_bytes());

        let mut reply = Reply::parse(data).unwrap();
        assert_eq!(reply.take_u32().unwrap(), 42);
    }

    #[test]
    fn reply_surfaces_remote_hresult() {
        let mut data = Vec::new();
        data.extend_from_slice(&1u32.to_le_bytes());
        data.extend_from_slice(&0x8007_0057u32.to_le_bytes()); // E_INVALIDARG

        match Reply::parse(data) {
            Err(PhoneError::Remote(hr)) => assert_eq!(hr, 0x8007_0057),
            other => panic!("expected remote failure, got {:?}", other),
        }
    }

    #[test]
    fn reply_without_hresult_reads_payload_directly() {
        let mut data = Vec::new();
        data.extend_from_slice(&0u32.to_le_bytes()); // result_1 != 1
        data.extend_from_slice(&9u32.to_le_bytes());

        let mut reply = Reply::parse(data).unwrap();
        assert_eq!(reply.take_u32().unwrap(), 9);
    }

    #[test]
    fn truncated_reply_is_a_protocol_error() {
        let data = 1u32.to_le_bytes()[..3].to_vec();
        assert!(matches!(
            Reply::parse(data),
            Err(PhoneError::Protocol(_))
        ));

        let mut reply = Reply::raw(vec![1, 0]);
        assert!(reply.take_u32().is_err());
    }

    #[test]
    fn odd_length_string_is_rejected() {
        assert!(decode_utf16le(&[0x41]).is_err());
    }
}

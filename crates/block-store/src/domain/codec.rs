//! # Payload Codec
//!
//! Big-endian primitive encoder/decoder handed to payloads while they
//! serialize themselves. The store never interprets the bytes.

use super::pointer::BlockPointer;
use std::io::{self, Write};

/// Byte sink for a payload's serialized state.
pub struct Encoder<'a> {
    out: &'a mut dyn Write,
    written: u64,
}

impl<'a> Encoder<'a> {
    pub fn new(out: &'a mut dyn Write) -> Self {
        Self { out, written: 0 }
    }

    /// Bytes written through this encoder so far.
    pub fn written(&self) -> u64 {
        self.written
    }

    pub fn write_bytes(&mut self, bytes: &[u8]) -> io::Result<()> {
        self.out.write_all(bytes)?;
        self.written += bytes.len() as u64;
        Ok(())
    }

    pub fn write_u8(&mut self, value: u8) -> io::Result<()> {
        self.write_bytes(&[value])
    }

    pub fn write_bool(&mut self, value: bool) -> io::Result<()> {
        self.write_u8(u8::from(value))
    }

    pub fn write_i32(&mut self, value: i32) -> io::Result<()> {
        self.write_bytes(&value.to_be_bytes())
    }

    pub fn write_u32(&mut self, value: u32) -> io::Result<()> {
        self.write_bytes(&value.to_be_bytes())
    }

    pub fn write_i64(&mut self, value: i64) -> io::Result<()> {
        self.write_bytes(&value.to_be_bytes())
    }

    pub fn write_u64(&mut self, value: u64) -> io::Result<()> {
        self.write_bytes(&value.to_be_bytes())
    }

    pub fn write_pointer(&mut self, pointer: BlockPointer) -> io::Result<()> {
        self.write_i64(pointer.position())
    }

    /// Length-prefixed (u32) byte string.
    pub fn write_sized_bytes(&mut self, bytes: &[u8]) -> io::Result<()> {
        let len = u32::try_from(bytes.len()).map_err(|_| {
            io::Error::new(io::ErrorKind::InvalidInput, "byte string exceeds u32 length")
        })?;
        self.write_u32(len)?;
        self.write_bytes(bytes)
    }

    /// Length-prefixed UTF-8 string.
    pub fn write_str(&mut self, value: &str) -> io::Result<()> {
        self.write_sized_bytes(value.as_bytes())
    }

    /// Bytes `write_sized_bytes` / `write_str` occupy for a value of `len` bytes.
    ///
    /// Saturates at `u32::MAX`, which no store accepts as a payload size.
    pub const fn sized_len(len: usize) -> u32 {
        if len > (u32::MAX - 4) as usize {
            u32::MAX
        } else {
            4 + len as u32
        }
    }
}

/// Byte source bounded to exactly one block's payload.
pub struct Decoder<'a> {
    input: &'a [u8],
    position: usize,
}

impl<'a> Decoder<'a> {
    pub fn new(input: &'a [u8]) -> Self {
        Self { input, position: 0 }
    }

    /// Bytes not consumed yet.
    pub fn remaining(&self) -> usize {
        self.input.len() - self.position
    }

    pub fn read_bytes(&mut self, len: usize) -> io::Result<&'a [u8]> {
        if len > self.remaining() {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                format!(
                    "payload read of {} bytes with only {} remaining",
                    len,
                    self.remaining()
                ),
            ));
        }
        let slice = &self.input[self.position..self.position + len];
        self.position += len;
        Ok(slice)
    }

    fn read_array<const N: usize>(&mut self) -> io::Result<[u8; N]> {
        let mut array = [0u8; N];
        array.copy_from_slice(self.read_bytes(N)?);
        Ok(array)
    }

    pub fn read_u8(&mut self) -> io::Result<u8> {
        Ok(self.read_array::<1>()?[0])
    }

    pub fn read_bool(&mut self) -> io::Result<bool> {
        match self.read_u8()? {
            0 => Ok(false),
            1 => Ok(true),
            other => Err(io::Error::new(
                io::ErrorKind::InvalidData,
                format!("invalid boolean byte {:#04x}", other),
            )),
        }
    }

    pub fn read_i32(&mut self) -> io::Result<i32> {
        self.read_array().map(i32::from_be_bytes)
    }

    pub fn read_u32(&mut self) -> io::Result<u32> {
        self.read_array().map(u32::from_be_bytes)
    }

    pub fn read_i64(&mut self) -> io::Result<i64> {
        self.read_array().map(i64::from_be_bytes)
    }

    pub fn read_u64(&mut self) -> io::Result<u64> {
        self.read_array().map(u64::from_be_bytes)
    }

    pub fn read_pointer(&mut self) -> io::Result<BlockPointer> {
        self.read_i64().map(BlockPointer::at)
    }

    pub fn read_sized_bytes(&mut self) -> io::Result<&'a [u8]> {
        let len = self.read_u32()? as usize;
        self.read_bytes(len)
    }

    pub fn read_string(&mut self) -> io::Result<String> {
        let bytes = self.read_sized_bytes()?;
        String::from_utf8(bytes.to_vec())
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
    }
}

use super::{KiwiError, Result};

#[derive(Debug, Clone)]
pub struct ByteReader<'a> {
    data: &'a [u8],
    offset: usize,
}

impl<'a> ByteReader<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, offset: 0 }
    }

    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn is_at_end(&self) -> bool {
        self.offset >= self.data.len()
    }

    pub fn read_byte(&mut self) -> Result<u8> {
        let b = *self.data.get(self.offset).ok_or(KiwiError::UnexpectedEof {
            offset: self.offset,
        })?;
        self.offset += 1;
        Ok(b)
    }

    pub fn read_bool(&mut self) -> Result<bool> {
        Ok(self.read_byte()? != 0)
    }

    pub fn read_byte_array(&mut self) -> Result<&'a [u8]> {
        let len = self.read_var_uint()? as usize;
        let end = self
            .offset
            .checked_add(len)
            .filter(|end| *end <= self.data.len())
            .ok_or(KiwiError::UnexpectedEof {
                offset: self.data.len(),
            })?;
        let out = &self.data[self.offset..end];
        self.offset = end;
        Ok(out)
    }

    pub fn read_var_uint(&mut self) -> Result<u32> {
        let mut value = 0u32;
        let mut shift = 0u32;
        loop {
            let byte = self.read_byte()?;
            value |= u32::from(byte & 127).wrapping_shl(shift);
            shift += 7;
            if byte & 128 == 0 || shift >= 35 {
                return Ok(value);
            }
        }
    }

    pub fn read_var_int(&mut self) -> Result<i32> {
        let v = self.read_var_uint()?;
        Ok(if v & 1 != 0 {
            !((v >> 1) as i32)
        } else {
            (v >> 1) as i32
        })
    }

    pub fn read_var_uint64(&mut self) -> Result<u64> {
        let mut value = 0u64;
        let mut shift = 0u32;
        loop {
            let byte = self.read_byte()?;
            if byte & 128 == 0 || shift >= 56 {
                value |= u64::from(byte) << shift;
                return Ok(value);
            }
            value |= u64::from(byte & 127) << shift;
            shift += 7;
        }
    }

    pub fn read_var_int64(&mut self) -> Result<i64> {
        let v = self.read_var_uint64()?;
        Ok(if v & 1 != 0 {
            !((v >> 1) as i64)
        } else {
            (v >> 1) as i64
        })
    }

    pub fn read_var_float(&mut self) -> Result<f32> {
        let first = self.read_byte()?;
        if first == 0 {
            return Ok(0.0);
        }
        let rest = [self.read_byte()?, self.read_byte()?, self.read_byte()?];
        let bits = u32::from_le_bytes([first, rest[0], rest[1], rest[2]]);
        // The exponent is stored in the low byte; rotate it back into place.
        Ok(f32::from_bits(bits.rotate_left(23)))
    }

    /// Reads a null-terminated UTF-8 string.
    pub fn read_string(&mut self) -> Result<String> {
        let rest = &self.data[self.offset.min(self.data.len())..];
        let len = rest
            .iter()
            .position(|b| *b == 0)
            .ok_or(KiwiError::UnexpectedEof {
                offset: self.data.len(),
            })?;
        let s = String::from_utf8_lossy(&rest[..len]).into_owned();
        self.offset += len + 1;
        Ok(s)
    }
}

#[derive(Debug, Clone, Default)]
pub struct ByteWriter {
    data: Vec<u8>,
}

impl ByteWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn into_inner(self) -> Vec<u8> {
        self.data
    }

    pub fn write_byte(&mut self, b: u8) {
        self.data.push(b);
    }

    pub fn write_bool(&mut self, v: bool) {
        self.write_byte(u8::from(v));
    }

    pub fn write_byte_array(&mut self, bytes: &[u8]) {
        self.write_var_uint(bytes.len() as u32);
        self.data.extend_from_slice(bytes);
    }

    pub fn write_var_uint(&mut self, mut value: u32) {
        loop {
            let byte = (value & 127) as u8;
            value >>= 7;
            if value == 0 {
                self.write_byte(byte);
                return;
            }
            self.write_byte(byte | 128);
        }
    }

    pub fn write_var_int(&mut self, value: i32) {
        self.write_var_uint(((value << 1) ^ (value >> 31)) as u32);
    }

    pub fn write_var_uint64(&mut self, mut value: u64) {
        let mut i = 0;
        while value > 127 && i < 8 {
            self.write_byte((value & 127) as u8 | 128);
            value >>= 7;
            i += 1;
        }
        self.write_byte(value as u8);
    }

    pub fn write_var_int64(&mut self, value: i64) {
        self.write_var_uint64(((value << 1) ^ (value >> 63)) as u64);
    }

    pub fn write_var_float(&mut self, value: f32) {
        let bits = value.to_bits().rotate_right(23);
        if bits & 255 == 0 {
            self.write_byte(0);
            return;
        }
        self.data.extend_from_slice(&bits.to_le_bytes());
    }

    pub fn write_string(&mut self, s: &str) {
        self.data.extend_from_slice(s.as_bytes());
        self.write_byte(0);
    }
}

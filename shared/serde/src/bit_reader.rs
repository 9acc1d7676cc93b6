use crate::error::SerdeErr;

/// Cursor over an immutable byte buffer, yielding bits least-significant
/// first within each byte.
pub struct BitReader<'b> {
    buffer: &'b [u8],
    position: usize,
    end: usize,
}

impl<'b> BitReader<'b> {
    pub fn new(buffer: &'b [u8]) -> Self {
        Self {
            buffer,
            position: 0,
            end: buffer.len() * 8,
        }
    }

    /// Current cursor, in bits from the start of the buffer
    pub fn position(&self) -> usize {
        self.position
    }

    /// Total number of bits in the buffer
    pub fn end(&self) -> usize {
        self.end
    }

    pub fn remaining(&self) -> usize {
        self.end - self.position
    }

    pub fn is_empty(&self) -> bool {
        self.position >= self.end
    }

    fn ensure(&self, requested: usize) -> Result<(), SerdeErr> {
        if requested > self.remaining() {
            return Err(SerdeErr::Overrun {
                position: self.position,
                requested,
                remaining: self.remaining(),
            });
        }
        Ok(())
    }

    pub fn read_bit(&mut self) -> Result<bool, SerdeErr> {
        Ok(self.read_bits(1)? == 1)
    }

    /// Reads the next `n` bits (at most 32) as an unsigned integer.
    pub fn read_bits(&mut self, n: u32) -> Result<u32, SerdeErr> {
        if n > 32 {
            return Err(SerdeErr::WidthTooLarge {
                position: self.position,
                requested: n,
            });
        }
        self.ensure(n as usize)?;

        let mut value: u64 = 0;
        let mut written: u32 = 0;
        while written < n {
            let byte = self.buffer[self.position >> 3];
            let offset = (self.position & 7) as u32;
            let take = (8 - offset).min(n - written);
            let chunk = (u64::from(byte) >> offset) & ((1u64 << take) - 1);

            value |= chunk << written;
            written += take;
            self.position += take as usize;
        }

        Ok(value as u32)
    }

    /// Copies `bit_length` bits out as whole bytes; a trailing partial byte
    /// holds the remaining low bits.
    pub fn read_raw(&mut self, bit_length: usize) -> Result<Vec<u8>, SerdeErr> {
        self.ensure(bit_length)?;

        let mut output = Vec::with_capacity((bit_length + 7) / 8);
        let mut remaining = bit_length;
        while remaining >= 8 {
            output.push(self.read_bits(8)? as u8);
            remaining -= 8;
        }
        if remaining > 0 {
            output.push(self.read_bits(remaining as u32)? as u8);
        }

        Ok(output)
    }

    /// Reads bytes until a zero byte or until `max_size - 1` bytes have been
    /// consumed. The terminator is not included in the result.
    pub fn read_cstring(&mut self, max_size: usize) -> Result<Vec<u8>, SerdeErr> {
        let mut output = Vec::new();
        for _ in 0..max_size.saturating_sub(1) {
            let byte = self.read_bits(8)? as u8;
            if byte == 0 {
                break;
            }
            output.push(byte);
        }
        Ok(output)
    }

    /// Little-endian base-128 varint, capped at five groups (35 bits) even
    /// when the last group still has its continuation bit set.
    pub fn read_var35(&mut self) -> Result<u32, SerdeErr> {
        let mut value: u32 = 0;
        let mut shift: u32 = 0;

        loop {
            let group = self.read_bits(8)?;
            value |= (group & 0x7F).wrapping_shl(shift);
            shift += 7;

            if group & 0x80 == 0 || shift >= 35 {
                return Ok(value);
            }
        }
    }

    /// Mixed-width varint: a 6-bit head whose bits 4-5 select a 0, 4, 8 or
    /// 28 bit extension placed above the head's low nibble.
    pub fn read_var_uint(&mut self) -> Result<u32, SerdeErr> {
        let head = self.read_bits(6)?;

        let width = match (head >> 4) & 3 {
            0 => return Ok(head),
            1 => 4,
            2 => 8,
            _ => 28,
        };

        let extension = self.read_bits(width)?;
        Ok((extension << 4) | (head & 0xF))
    }
}

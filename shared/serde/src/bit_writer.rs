/// Sink for LSB-first bit streams. Every method beyond `write_bit` is the
/// inverse of the matching [`BitReader`](crate::BitReader) primitive.
pub trait BitWrite {
    fn write_bit(&mut self, bit: bool);

    /// Writes the low `n` bits of `value`, least significant first.
    fn write_bits(&mut self, value: u32, n: u32) {
        let mut temp = value;
        for _ in 0..n {
            self.write_bit(temp & 1 != 0);
            temp >>= 1;
        }
    }

    fn write_byte(&mut self, byte: u8) {
        self.write_bits(u32::from(byte), 8);
    }

    fn write_bytes(&mut self, bytes: &[u8]) {
        for byte in bytes {
            self.write_byte(*byte);
        }
    }

    /// Writes the bytes followed by a zero terminator.
    fn write_cstring(&mut self, bytes: &[u8]) {
        self.write_bytes(bytes);
        self.write_byte(0);
    }

    fn write_var35(&mut self, value: u32) {
        let mut rest = value;
        loop {
            let mut group = rest & 0x7F;
            rest >>= 7;
            if rest != 0 {
                group |= 0x80;
            }
            self.write_bits(group, 8);
            if rest == 0 {
                return;
            }
        }
    }

    fn write_var_uint(&mut self, value: u32) {
        let (selector, width) = if value < (1 << 4) {
            (0, 0)
        } else if value < (1 << 8) {
            (1, 4)
        } else if value < (1 << 12) {
            (2, 8)
        } else {
            (3, 28)
        };

        self.write_bits((value & 0xF) | (selector << 4), 6);
        if width > 0 {
            self.write_bits(value >> 4, width);
        }
    }
}

/// A growable BitWrite implementation. Used to assemble baselines, entity
/// deltas and string-table payloads bit for bit.
pub struct BitWriter {
    scratch: u8,
    scratch_index: u8,
    buffer: Vec<u8>,
    bits_written: u32,
}

impl BitWriter {
    pub fn new() -> Self {
        Self {
            scratch: 0,
            scratch_index: 0,
            buffer: Vec::with_capacity(64),
            bits_written: 0,
        }
    }

    fn flush_scratch(&mut self) {
        if self.scratch_index > 0 {
            let byte = (self.scratch << (8 - self.scratch_index)).reverse_bits();
            self.buffer.push(byte);
            self.scratch = 0;
            self.scratch_index = 0;
        }
    }

    /// Pads the final partial byte with zero bits.
    pub fn to_bytes(mut self) -> Vec<u8> {
        self.flush_scratch();
        self.buffer
    }

    pub fn bits_written(&self) -> u32 {
        self.bits_written
    }
}

impl Default for BitWriter {
    fn default() -> Self {
        Self::new()
    }
}

impl BitWrite for BitWriter {
    fn write_bit(&mut self, bit: bool) {
        self.scratch <<= 1;

        if bit {
            self.scratch |= 1;
        }

        self.scratch_index += 1;
        self.bits_written += 1;

        if self.scratch_index >= 8 {
            self.buffer.push(self.scratch.reverse_bits());
            self.scratch_index = 0;
            self.scratch = 0;
        }
    }
}

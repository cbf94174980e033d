//! LZW decompression
//!
//! TIFF LZW packs codes most significant bit first and widens the code one
//! entry early (at 511, 1023 and 2047 rather than 512, 1024 and 2048).

use crate::error::{Error, Result};

const CLEAR_CODE: u16 = 256;
const EOI_CODE: u16 = 257;
const FIRST_CODE: usize = 258;
const MAX_CODES: usize = 4096;
const MIN_WIDTH: u32 = 9;
const MAX_WIDTH: u32 = 12;

/// Decompresses LZW compressed data
pub fn decompress(data: &[u8], expected_len: usize) -> Result<Vec<u8>> {
    let mut output = Vec::with_capacity(expected_len);
    LzwTable::new().decode(data, &mut output)?;
    Ok(output)
}

/// String table stored as prefix links so entries never get copied
struct LzwTable {
    prefix: Vec<u16>,
    suffix: Vec<u8>,
    first: Vec<u8>,
    len: Vec<usize>,
}

impl LzwTable {
    fn new() -> Self {
        let mut table = Self {
            prefix: Vec::with_capacity(MAX_CODES),
            suffix: Vec::with_capacity(MAX_CODES),
            first: Vec::with_capacity(MAX_CODES),
            len: Vec::with_capacity(MAX_CODES),
        };
        table.reset();
        table
    }

    fn reset(&mut self) {
        self.prefix.clear();
        self.suffix.clear();
        self.first.clear();
        self.len.clear();
        for byte in 0..=255u8 {
            self.prefix.push(0);
            self.suffix.push(byte);
            self.first.push(byte);
            self.len.push(1);
        }
        // clear and end-of-information occupy 256 and 257
        for _ in 0..2 {
            self.prefix.push(0);
            self.suffix.push(0);
            self.first.push(0);
            self.len.push(0);
        }
    }

    fn next_code(&self) -> usize {
        self.len.len()
    }

    fn push(&mut self, prefix: u16, byte: u8) {
        if self.next_code() >= MAX_CODES {
            return;
        }
        let p = prefix as usize;
        self.prefix.push(prefix);
        self.suffix.push(byte);
        self.first.push(self.first[p]);
        self.len.push(self.len[p] + 1);
    }

    /// Appends the string for `code` to `out`
    fn emit(&self, code: u16, out: &mut Vec<u8>) {
        let len = self.len[code as usize];
        let start = out.len();
        out.resize(start + len, 0);
        let mut current = code as usize;
        for slot in out[start..].iter_mut().rev() {
            *slot = self.suffix[current];
            current = self.prefix[current] as usize;
        }
    }

    fn decode(&mut self, data: &[u8], out: &mut Vec<u8>) -> Result<()> {
        let mut reader = BitReader::new(data);
        let mut width = MIN_WIDTH;
        let mut previous: Option<u16> = None;

        while let Some(code) = reader.read(width) {
            if code == EOI_CODE {
                break;
            }
            if code == CLEAR_CODE {
                self.reset();
                width = MIN_WIDTH;
                previous = None;
                continue;
            }

            let code_index = code as usize;
            match previous {
                None => {
                    if code_index >= 256 {
                        return Err(Error::InvalidFormat(format!(
                            "LZW: code {} after clear is not a literal",
                            code
                        )));
                    }
                    self.emit(code, out);
                }
                Some(prev) => {
                    if code_index < self.next_code() {
                        self.emit(code, out);
                        let byte = self.first[code_index];
                        self.push(prev, byte);
                    } else if code_index == self.next_code() {
                        // code refers to the entry being defined: prev + first(prev)
                        let byte = self.first[prev as usize];
                        self.push(prev, byte);
                        self.emit(code, out);
                    } else {
                        return Err(Error::InvalidFormat(format!(
                            "LZW: code {} beyond table size {}",
                            code,
                            self.next_code()
                        )));
                    }
                }
            }
            previous = Some(code);

            if self.next_code() + 1 >= (1 << width) && width < MAX_WIDTH {
                width += 1;
            }
        }

        Ok(())
    }
}

/// Most-significant-bit-first code reader
struct BitReader<'a> {
    data: &'a [u8],
    position: usize,
    buffer: u32,
    bits: u32,
}

impl<'a> BitReader<'a> {
    fn new(data: &'a [u8]) -> Self {
        Self { data, position: 0, buffer: 0, bits: 0 }
    }

    fn read(&mut self, width: u32) -> Option<u16> {
        while self.bits < width {
            let byte = *self.data.get(self.position)?;
            self.position += 1;
            self.buffer = (self.buffer << 8) | byte as u32;
            self.bits += 8;
        }
        self.bits -= width;
        let code = (self.buffer >> self.bits) & ((1 << width) - 1);
        self.buffer &= (1 << self.bits) - 1;
        Some(code as u16)
    }
}

//! Tag value reading operations

use crate::error::{Error, Result};
use crate::formats::tiff::tags::field_types::*;
use crate::formats::tiff::IFDEntry;
use crate::io::{slice_at, ByteOrder};

/// Decodes tag values straight out of the mapped file
#[derive(Clone, Copy)]
pub struct TagReader<'a> {
    data: &'a [u8],
    byte_order: ByteOrder,
}

impl<'a> TagReader<'a> {
    pub fn new(data: &'a [u8], byte_order: ByteOrder) -> Self {
        Self { data, byte_order }
    }

    /// Raw value bytes of an entry
    pub fn read_bytes(&self, entry: &IFDEntry) -> Result<&'a [u8]> {
        let len = usize::try_from(entry.byte_len())
            .map_err(|_| Error::InvalidFormat(format!("Tag {} too large", entry.tag)))?;
        slice_at(self.data, entry.data_offset, len)
    }

    /// Reads integer tag values widened to u64
    pub fn read_u64s(&self, entry: &IFDEntry) -> Result<Vec<u64>> {
        let bytes = self.read_bytes(entry)?;
        let size = entry.field_type_size();
        let order = self.byte_order;

        let decode: fn(ByteOrder, &[u8]) -> u64 = match entry.field_type {
            BYTE | UNDEFINED => |_, b| b[0] as u64,
            SHORT => |o, b| o.u16(b) as u64,
            LONG | IFD => |o, b| o.u32(b) as u64,
            LONG8 | IFD8 => |o, b| o.u64(b),
            other => {
                return Err(Error::InvalidFormat(format!(
                    "Tag {} has non-integer type {}",
                    entry.tag, other
                )))
            }
        };

        Ok(bytes.chunks_exact(size).map(|chunk| decode(order, chunk)).collect())
    }

    /// Reads tag values as u16 array
    pub fn read_u16s(&self, entry: &IFDEntry) -> Result<Vec<u16>> {
        Ok(self
            .read_u64s(entry)?
            .into_iter()
            .map(|v| v as u16)
            .collect())
    }

    /// Reads numeric tag values as f64, whatever their stored type
    pub fn read_doubles(&self, entry: &IFDEntry) -> Result<Vec<f64>> {
        let bytes = self.read_bytes(entry)?;
        let order = self.byte_order;
        let size = entry.field_type_size();

        let values = bytes.chunks_exact(size).map(|b| match entry.field_type {
            BYTE | UNDEFINED => b[0] as f64,
            SBYTE => b[0] as i8 as f64,
            SHORT => order.u16(b) as f64,
            SSHORT => order.u16(b) as i16 as f64,
            LONG | IFD => order.u32(b) as f64,
            SLONG => order.u32(b) as i32 as f64,
            LONG8 | IFD8 => order.u64(b) as f64,
            SLONG8 => order.u64(b) as i64 as f64,
            FLOAT => f32::from_bits(order.u32(b)) as f64,
            DOUBLE => order.f64(b),
            RATIONAL => order.u32(b) as f64 / order.u32(&b[4..]) as f64,
            SRATIONAL => order.u32(b) as i32 as f64 / order.u32(&b[4..]) as i32 as f64,
            _ => f64::NAN,
        });

        Ok(values.collect())
    }

    /// Reads ASCII string from tag, trimming the terminating NULs
    pub fn read_ascii(&self, entry: &IFDEntry) -> Result<String> {
        let bytes = self.read_bytes(entry)?;
        let text = String::from_utf8_lossy(bytes);
        Ok(text.trim_end_matches('\0').to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::formats::tiff::tags;

    #[test]
    fn test_read_shorts_big_endian() {
        let data = [0u8, 0, 0x01, 0x00, 0x00, 0x02];
        let reader = TagReader::new(&data, ByteOrder::BigEndian);
        let entry = IFDEntry::new(tags::BITS_PER_SAMPLE, SHORT, 2, 2, 256);
        assert_eq!(reader.read_u64s(&entry).unwrap(), vec![256, 2]);
    }

    #[test]
    fn test_read_doubles_mixed_types() {
        let mut data = Vec::new();
        data.extend_from_slice(&0.5f64.to_le_bytes());
        data.extend_from_slice(&30.0f64.to_le_bytes());
        let reader = TagReader::new(&data, ByteOrder::LittleEndian);

        let entry = IFDEntry::new(tags::MODEL_PIXEL_SCALE, DOUBLE, 2, 0, 0);
        assert_eq!(reader.read_doubles(&entry).unwrap(), vec![0.5, 30.0]);

        let rational = [3u8, 0, 0, 0, 2, 0, 0, 0];
        let reader = TagReader::new(&rational, ByteOrder::LittleEndian);
        let entry = IFDEntry::new(282, RATIONAL, 1, 0, 0);
        assert_eq!(reader.read_doubles(&entry).unwrap(), vec![1.5]);
    }

    #[test]
    fn test_read_ascii() {
        let data = b"-9999\0";
        let reader = TagReader::new(data, ByteOrder::LittleEndian);
        let entry = IFDEntry::new(tags::GDAL_NODATA, ASCII, 6, 0, 0);
        assert_eq!(reader.read_ascii(&entry).unwrap(), "-9999");
    }

    #[test]
    fn test_out_of_range() {
        let data = [0u8; 4];
        let reader = TagReader::new(&data, ByteOrder::LittleEndian);
        let entry = IFDEntry::new(tags::TILE_OFFSETS, LONG, 4, 0, 0);
        assert!(reader.read_u64s(&entry).is_err());

        let entry = IFDEntry::new(tags::TILE_OFFSETS, DOUBLE, 1, 0, 0);
        assert!(reader.read_u64s(&entry).is_err());
    }
}

//! TIFF reader modules

pub mod tags;
pub mod tiles;
pub mod parallel;

use std::collections::HashSet;
use std::fs::File;
use std::path::Path;
use std::sync::Arc;

use memmap2::Mmap;

use crate::error::{Error, Result};
use crate::formats::tiff::{Tiff, IFD, IFDEntry, TIFF_MAGIC, BIGTIFF_MAGIC};
use crate::formats::tiff::tags::field_types;
use crate::io::ByteOrder;

use self::tags::TagReader;

const MAX_IFDS: usize = 1000;

/// Memory-mapped TIFF/BigTIFF reader
///
/// Cloning is cheap; clones share the same mapping.
#[derive(Clone)]
pub struct TiffReader {
    mmap: Arc<Mmap>,
    byte_order: ByteOrder,
    is_big_tiff: bool,
}

impl TiffReader {
    /// Maps a TIFF file and validates its header
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path)?;
        // SAFETY: the mapping is read-only and sources are not rewritten while served
        let mmap = unsafe { Mmap::map(&file)? };

        #[cfg(unix)]
        unsafe {
            libc::madvise(
                mmap.as_ptr() as *mut libc::c_void,
                mmap.len(),
                libc::MADV_WILLNEED,
            );
        }

        let byte_order = ByteOrder::detect(&mmap)?;
        let magic = byte_order.read_u16(&mmap, 2)?;

        let is_big_tiff = match magic {
            TIFF_MAGIC => false,
            BIGTIFF_MAGIC => true,
            _ => return Err(Error::InvalidMagic(magic)),
        };

        if is_big_tiff {
            let offset_size = byte_order.read_u16(&mmap, 4)?;
            if offset_size != 8 {
                return Err(Error::InvalidFormat(
                    format!("Invalid BigTIFF offset size: {}", offset_size)
                ));
            }
        }

        Ok(Self {
            mmap: Arc::new(mmap),
            byte_order,
            is_big_tiff,
        })
    }

    /// The whole mapped file
    pub fn data(&self) -> &[u8] {
        &self.mmap
    }

    pub fn byte_order(&self) -> ByteOrder {
        self.byte_order
    }

    pub fn is_big_tiff(&self) -> bool {
        self.is_big_tiff
    }

    /// Tag value decoder over the mapped file
    pub fn tag_reader(&self) -> TagReader<'_> {
        TagReader::new(&self.mmap, self.byte_order)
    }

    /// Walks the IFD chain and returns the file structure
    pub fn read(&self) -> Result<Tiff> {
        let mut tiff = Tiff::new(self.is_big_tiff, self.byte_order);
        let mut visited = HashSet::new();
        let mut next_ifd_offset = self.read_offset(if self.is_big_tiff { 8 } else { 4 })?;

        while next_ifd_offset != 0 {
            if tiff.ifd_count() >= MAX_IFDS {
                return Err(Error::InvalidFormat("Too many IFDs".to_string()));
            }
            if !visited.insert(next_ifd_offset) {
                return Err(Error::InvalidFormat(format!(
                    "IFD chain loops back to offset {}",
                    next_ifd_offset
                )));
            }

            let (ifd, following) = self.read_ifd(tiff.ifd_count(), next_ifd_offset)?;
            tiff.add_ifd(ifd);
            next_ifd_offset = following;
        }

        Ok(tiff)
    }

    /// Reads a 4-byte (classic) or 8-byte (BigTIFF) offset
    fn read_offset(&self, at: u64) -> Result<u64> {
        if self.is_big_tiff {
            self.byte_order.read_u64(&self.mmap, at)
        } else {
            Ok(self.byte_order.read_u32(&self.mmap, at)? as u64)
        }
    }

    /// Reads a single IFD, returning it with the offset of the next one
    fn read_ifd(&self, number: usize, offset: u64) -> Result<(IFD, u64)> {
        let order = self.byte_order;
        let data: &[u8] = &self.mmap;

        let (entry_count, header_size, entry_size, count_size) = if self.is_big_tiff {
            (order.read_u64(data, offset)?, 8u64, 20u64, 8u64)
        } else {
            (order.read_u16(data, offset)? as u64, 2, 12, 4)
        };

        let mut ifd = IFD::new(number, offset);

        for i in 0..entry_count {
            let pos = offset + header_size + i * entry_size;
            let tag = order.read_u16(data, pos)?;
            let field_type = order.read_u16(data, pos + 2)?;
            let count = if self.is_big_tiff {
                order.read_u64(data, pos + 4)?
            } else {
                order.read_u32(data, pos + 4)? as u64
            };

            let value_pos = pos + 4 + count_size;
            let mut entry = IFDEntry::new(tag, field_type, count, value_pos, 0);
            if !entry.is_inline(self.is_big_tiff) {
                entry.data_offset = self.read_offset(value_pos)?;
            }
            if count > 0 {
                entry.value = self.first_integer(&entry)?;
            }
            ifd.add_entry(entry);
        }

        let next = self.read_offset(offset + header_size + entry_count * entry_size)?;
        Ok((ifd, next))
    }

    /// First value of an integer-typed entry, 0 for other types
    fn first_integer(&self, entry: &IFDEntry) -> Result<u64> {
        let order = self.byte_order;
        let data: &[u8] = &self.mmap;
        let at = entry.data_offset;

        Ok(match entry.field_type {
            field_types::BYTE | field_types::UNDEFINED => {
                crate::io::slice_at(data, at, 1)?[0] as u64
            }
            field_types::SHORT => order.read_u16(data, at)? as u64,
            field_types::LONG | field_types::IFD => order.read_u32(data, at)? as u64,
            field_types::LONG8 | field_types::IFD8 => order.read_u64(data, at)?,
            _ => 0,
        })
    }
}

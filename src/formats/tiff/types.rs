//! TIFF data structures

use super::ifd::IFD;
use crate::io::ByteOrder;
use std::fmt;

/// Represents a TIFF or BigTIFF file
#[derive(Debug)]
pub struct Tiff {
    /// Whether this is BigTIFF format
    pub is_big_tiff: bool,
    /// Byte order of every value in the file
    pub byte_order: ByteOrder,
    /// Image File Directories
    pub ifds: Vec<IFD>,
}

impl Tiff {
    /// Creates a new TIFF structure
    pub fn new(is_big_tiff: bool, byte_order: ByteOrder) -> Self {
        Self {
            is_big_tiff,
            byte_order,
            ifds: Vec::new(),
        }
    }

    /// Adds an IFD to this TIFF
    pub fn add_ifd(&mut self, ifd: IFD) {
        self.ifds.push(ifd);
    }

    /// Returns the main (first) IFD
    pub fn main_ifd(&self) -> Option<&IFD> {
        self.ifds.first()
    }

    /// Returns the number of IFDs
    pub fn ifd_count(&self) -> usize {
        self.ifds.len()
    }

    /// Full resolution image followed by its reduced-resolution overviews,
    /// in file order
    pub fn pyramid(&self) -> Vec<&IFD> {
        self.ifds
            .iter()
            .enumerate()
            .filter(|(i, ifd)| *i == 0 || ifd.is_overview())
            .map(|(_, ifd)| ifd)
            .collect()
    }

    /// Internal transparency masks, in file order
    pub fn masks(&self) -> Vec<&IFD> {
        self.ifds.iter().filter(|ifd| ifd.is_mask()).collect()
    }
}

impl fmt::Display for Tiff {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = if self.is_big_tiff { "BigTIFF" } else { "TIFF" };
        writeln!(f, "Format: {} ({:?})", kind, self.byte_order)?;
        writeln!(f, "IFDs: {}", self.ifds.len())?;

        for ifd in &self.ifds {
            let kind = if ifd.number == 0 {
                "full resolution"
            } else if ifd.is_mask() {
                "mask"
            } else if ifd.is_overview() {
                "overview"
            } else {
                "other"
            };
            write!(f, "  IFD {} [{}]", ifd.number, kind)?;
            if let Some(dims) = ifd.dimensions() {
                write!(f, " {} x {}", dims.width, dims.height)?;
            }
            write!(f, ", {} band(s)", ifd.samples_per_pixel())?;
            if let Some(data_type) = ifd.data_type() {
                write!(f, " {}", data_type.name())?;
            }
            if let Some(tile) = ifd.tile_dimensions() {
                write!(f, ", tiles {} x {}", tile.width, tile.height)?;
            } else {
                write!(f, ", strips")?;
            }
            writeln!(f, ", compression {}", ifd.compression())?;
        }

        Ok(())
    }
}

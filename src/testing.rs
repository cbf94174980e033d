//! GeoTIFF fixtures written to temporary files

use std::io::Write;

use flate2::write::ZlibEncoder;
use tempfile::NamedTempFile;

use crate::formats::tiff::tags::{self, field_types};
use crate::types::DataType;

/// Builds small tiled little-endian GeoTIFFs with optional overviews
#[derive(Debug, Clone)]
pub struct GeoTiffBuilder {
    width: u32,
    height: u32,
    tile: u32,
    data_type: DataType,
    bands: Vec<Vec<f64>>,
    epsg: u16,
    origin: (f64, f64),
    pixel_size: (f64, f64),
    nodata: Option<String>,
    deflate: bool,
    alpha_last: bool,
    mask: Option<Vec<bool>>,
    overview_factors: Vec<u32>,
}

impl GeoTiffBuilder {
    /// Single band raster filled by `f(x, y)`
    pub fn new(width: u32, height: u32, f: impl Fn(u32, u32) -> f64) -> Self {
        let band = (0..height)
            .flat_map(|y| (0..width).map(move |x| (x, y)))
            .map(|(x, y)| f(x, y))
            .collect();
        Self {
            width,
            height,
            tile: 16,
            data_type: DataType::U8,
            bands: vec![band],
            epsg: 4326,
            origin: (0.0, height as f64),
            pixel_size: (1.0, 1.0),
            nodata: None,
            deflate: false,
            alpha_last: false,
            mask: None,
            overview_factors: Vec::new(),
        }
    }

    /// Adds another band filled by `f(x, y)`
    pub fn band(mut self, f: impl Fn(u32, u32) -> f64) -> Self {
        let band = (0..self.height)
            .flat_map(|y| (0..self.width).map(move |x| (x, y)))
            .map(|(x, y)| f(x, y))
            .collect();
        self.bands.push(band);
        self
    }

    pub fn data_type(mut self, data_type: DataType) -> Self {
        self.data_type = data_type;
        self
    }

    pub fn tile(mut self, tile: u32) -> Self {
        self.tile = tile;
        self
    }

    /// CRS and north-west corner with pixel size
    pub fn georef(mut self, epsg: u16, west: f64, north: f64, size_x: f64, size_y: f64) -> Self {
        self.epsg = epsg;
        self.origin = (west, north);
        self.pixel_size = (size_x, size_y);
        self
    }

    pub fn nodata(mut self, nodata: &str) -> Self {
        self.nodata = Some(nodata.to_string());
        self
    }

    pub fn deflate(mut self) -> Self {
        self.deflate = true;
        self
    }

    /// Marks the last band as unassociated alpha
    pub fn alpha_last(mut self) -> Self {
        self.alpha_last = true;
        self
    }

    /// Adds a 1-bit internal mask per level, valid where `f(x, y)` holds
    pub fn internal_mask(mut self, f: impl Fn(u32, u32) -> bool) -> Self {
        let mask = (0..self.height)
            .flat_map(|y| (0..self.width).map(move |x| (x, y)))
            .map(|(x, y)| f(x, y))
            .collect();
        self.mask = Some(mask);
        self
    }

    pub fn overview(mut self, factor: u32) -> Self {
        self.overview_factors.push(factor);
        self
    }

    /// Writes the file and returns its handle
    pub fn write(&self) -> NamedTempFile {
        let mut buf: Vec<u8> = Vec::new();
        buf.extend_from_slice(b"II");
        buf.extend_from_slice(&42u16.to_le_bytes());
        buf.extend_from_slice(&0u32.to_le_bytes());

        let mut levels = vec![(1u32, self.width, self.height)];
        for &factor in &self.overview_factors {
            levels.push((factor, self.width.div_ceil(factor), self.height.div_ceil(factor)));
        }

        let mut ifds = Vec::new();
        for &(factor, width, height) in &levels {
            let (offsets, counts) = self.write_tiles(&mut buf, factor, width, height);
            ifds.push(self.entries(factor, width, height, offsets, counts));
            if let Some(mask) = &self.mask {
                let (offsets, counts) =
                    self.write_mask_tiles(&mut buf, mask, factor, width, height);
                ifds.push(self.mask_entries(factor, width, height, offsets, counts));
            }
        }

        let mut next_slot = 4usize;
        for entries in ifds {
            if buf.len() % 2 == 1 {
                buf.push(0);
            }
            let ifd_offset = buf.len() as u32;
            buf[next_slot..next_slot + 4].copy_from_slice(&ifd_offset.to_le_bytes());

            let extra_start = buf.len() + 2 + 12 * entries.len() + 4;
            let mut extra: Vec<u8> = Vec::new();
            buf.extend_from_slice(&(entries.len() as u16).to_le_bytes());

            for (tag, field_type, count, payload) in entries {
                buf.extend_from_slice(&tag.to_le_bytes());
                buf.extend_from_slice(&field_type.to_le_bytes());
                buf.extend_from_slice(&count.to_le_bytes());
                if payload.len() <= 4 {
                    let mut inline = payload.clone();
                    inline.resize(4, 0);
                    buf.extend_from_slice(&inline);
                } else {
                    let offset = (extra_start + extra.len()) as u32;
                    buf.extend_from_slice(&offset.to_le_bytes());
                    extra.extend_from_slice(&payload);
                    if extra.len() % 2 == 1 {
                        extra.push(0);
                    }
                }
            }
            next_slot = buf.len();
            buf.extend_from_slice(&0u32.to_le_bytes());
            buf.extend_from_slice(&extra);
        }

        let mut file = NamedTempFile::new().unwrap();
        file.write_all(&buf).unwrap();
        file.flush().unwrap();
        file
    }

    fn write_tiles(
        &self,
        buf: &mut Vec<u8>,
        factor: u32,
        width: u32,
        height: u32,
    ) -> (Vec<u32>, Vec<u32>) {
        let spp = self.bands.len();
        let size = self.data_type.size();
        let across = width.div_ceil(self.tile);
        let down = height.div_ceil(self.tile);
        let mut offsets = Vec::new();
        let mut counts = Vec::new();

        for ty in 0..down {
            for tx in 0..across {
                let mut tile = Vec::with_capacity((self.tile * self.tile) as usize * spp * size);
                for row in 0..self.tile {
                    for col in 0..self.tile {
                        let x = tx * self.tile + col;
                        let y = ty * self.tile + row;
                        for band in &self.bands {
                            let value = if x < width && y < height {
                                let sx = (x * factor).min(self.width - 1);
                                let sy = (y * factor).min(self.height - 1);
                                band[(sy * self.width + sx) as usize]
                            } else {
                                0.0
                            };
                            self.encode(value, &mut tile);
                        }
                    }
                }
                let tile = self.compress(tile);
                offsets.push(buf.len() as u32);
                counts.push(tile.len() as u32);
                buf.extend_from_slice(&tile);
            }
        }
        (offsets, counts)
    }

    /// Bit-packed mask tiles, most significant bit first
    fn write_mask_tiles(
        &self,
        buf: &mut Vec<u8>,
        mask: &[bool],
        factor: u32,
        width: u32,
        height: u32,
    ) -> (Vec<u32>, Vec<u32>) {
        let row_bytes = self.tile.div_ceil(8) as usize;
        let mut offsets = Vec::new();
        let mut counts = Vec::new();

        for ty in 0..height.div_ceil(self.tile) {
            for tx in 0..width.div_ceil(self.tile) {
                let mut tile = vec![0u8; row_bytes * self.tile as usize];
                for row in 0..self.tile {
                    for col in 0..self.tile {
                        let x = tx * self.tile + col;
                        let y = ty * self.tile + row;
                        if x >= width || y >= height {
                            continue;
                        }
                        let sx = (x * factor).min(self.width - 1);
                        let sy = (y * factor).min(self.height - 1);
                        if mask[(sy * self.width + sx) as usize] {
                            let byte = row as usize * row_bytes + col as usize / 8;
                            tile[byte] |= 0x80 >> (col % 8);
                        }
                    }
                }
                let tile = self.compress(tile);
                offsets.push(buf.len() as u32);
                counts.push(tile.len() as u32);
                buf.extend_from_slice(&tile);
            }
        }
        (offsets, counts)
    }

    fn compress(&self, tile: Vec<u8>) -> Vec<u8> {
        if !self.deflate {
            return tile;
        }
        let mut encoder = ZlibEncoder::new(Vec::new(), flate2::Compression::default());
        encoder.write_all(&tile).unwrap();
        encoder.finish().unwrap()
    }

    fn encode(&self, value: f64, out: &mut Vec<u8>) {
        match self.data_type {
            DataType::U8 => out.push(value as u8),
            DataType::I8 => out.push(value as i8 as u8),
            DataType::U16 => out.extend_from_slice(&(value as u16).to_le_bytes()),
            DataType::I16 => out.extend_from_slice(&(value as i16).to_le_bytes()),
            DataType::U32 => out.extend_from_slice(&(value as u32).to_le_bytes()),
            DataType::I32 => out.extend_from_slice(&(value as i32).to_le_bytes()),
            DataType::F32 => out.extend_from_slice(&(value as f32).to_le_bytes()),
            DataType::F64 => out.extend_from_slice(&value.to_le_bytes()),
        }
    }

    #[allow(clippy::type_complexity)]
    fn entries(
        &self,
        factor: u32,
        width: u32,
        height: u32,
        offsets: Vec<u32>,
        counts: Vec<u32>,
    ) -> Vec<(u16, u16, u32, Vec<u8>)> {
        let spp = self.bands.len() as u16;
        let bits = (self.data_type.size() * 8) as u16;
        let format: u16 = match self.data_type {
            DataType::F32 | DataType::F64 => 3,
            DataType::I8 | DataType::I16 | DataType::I32 => 2,
            _ => 1,
        };
        let per_band = |value: u16| vec![value; spp as usize];
        let subfile = if factor == 1 { 0 } else { 1 };
        let photometric = if spp >= 3 { 2 } else { 1 };
        let mut entries = vec![
            (tags::NEW_SUBFILE_TYPE, field_types::LONG, 1, longs(&[subfile])),
            (tags::IMAGE_WIDTH, field_types::LONG, 1, longs(&[width])),
            (tags::IMAGE_LENGTH, field_types::LONG, 1, longs(&[height])),
            (tags::BITS_PER_SAMPLE, field_types::SHORT, spp as u32, shorts(&per_band(bits))),
            (tags::COMPRESSION, field_types::SHORT, 1, shorts(&[if self.deflate { 8 } else { 1 }])),
            (tags::PHOTOMETRIC_INTERPRETATION, field_types::SHORT, 1, shorts(&[photometric])),
            (tags::SAMPLES_PER_PIXEL, field_types::SHORT, 1, shorts(&[spp])),
            (tags::PLANAR_CONFIGURATION, field_types::SHORT, 1, shorts(&[1])),
            (tags::TILE_WIDTH, field_types::LONG, 1, longs(&[self.tile])),
            (tags::TILE_LENGTH, field_types::LONG, 1, longs(&[self.tile])),
            (tags::TILE_OFFSETS, field_types::LONG, offsets.len() as u32, longs(&offsets)),
            (tags::TILE_BYTE_COUNTS, field_types::LONG, counts.len() as u32, longs(&counts)),
            (tags::SAMPLE_FORMAT, field_types::SHORT, spp as u32, shorts(&per_band(format))),
        ];

        if self.alpha_last {
            entries.push((tags::EXTRA_SAMPLES, field_types::SHORT, 1, shorts(&[2])));
        }

        if factor == 1 {
            let (west, north) = self.origin;
            let (sx, sy) = self.pixel_size;
            let geographic = self.epsg == 4326;
            let keys = [
                1, 1, 0, 3,
                1024, 0, 1, if geographic { 2 } else { 1 },
                1025, 0, 1, 1,
                if geographic { 2048 } else { 3072 }, 0, 1, self.epsg,
            ];
            let scale = doubles(&[sx, sy, 0.0]);
            let tiepoint = doubles(&[0.0, 0.0, 0.0, west, north, 0.0]);
            entries.push((tags::MODEL_PIXEL_SCALE, field_types::DOUBLE, 3, scale));
            entries.push((tags::MODEL_TIEPOINT, field_types::DOUBLE, 6, tiepoint));
            let key_count = keys.len() as u32;
            entries.push((tags::GEO_KEY_DIRECTORY, field_types::SHORT, key_count, shorts(&keys)));
            if let Some(nodata) = &self.nodata {
                let mut text = nodata.as_bytes().to_vec();
                text.push(0);
                entries.push((tags::GDAL_NODATA, field_types::ASCII, text.len() as u32, text));
            }
        }

        entries.sort_by_key(|entry| entry.0);
        entries
    }

    #[allow(clippy::type_complexity)]
    fn mask_entries(
        &self,
        factor: u32,
        width: u32,
        height: u32,
        offsets: Vec<u32>,
        counts: Vec<u32>,
    ) -> Vec<(u16, u16, u32, Vec<u8>)> {
        let subfile = if factor == 1 { 4 } else { 5 };
        let compression = if self.deflate { 8 } else { 1 };
        let tile_count = offsets.len() as u32;
        let mut entries = vec![
            (tags::NEW_SUBFILE_TYPE, field_types::LONG, 1, longs(&[subfile])),
            (tags::IMAGE_WIDTH, field_types::LONG, 1, longs(&[width])),
            (tags::IMAGE_LENGTH, field_types::LONG, 1, longs(&[height])),
            (tags::BITS_PER_SAMPLE, field_types::SHORT, 1, shorts(&[1])),
            (tags::COMPRESSION, field_types::SHORT, 1, shorts(&[compression])),
            (tags::PHOTOMETRIC_INTERPRETATION, field_types::SHORT, 1, shorts(&[4])),
            (tags::SAMPLES_PER_PIXEL, field_types::SHORT, 1, shorts(&[1])),
            (tags::TILE_WIDTH, field_types::LONG, 1, longs(&[self.tile])),
            (tags::TILE_LENGTH, field_types::LONG, 1, longs(&[self.tile])),
            (tags::TILE_OFFSETS, field_types::LONG, tile_count, longs(&offsets)),
            (tags::TILE_BYTE_COUNTS, field_types::LONG, tile_count, longs(&counts)),
        ];
        entries.sort_by_key(|entry| entry.0);
        entries
    }
}

fn shorts(values: &[u16]) -> Vec<u8> {
    values.iter().flat_map(|v| v.to_le_bytes()).collect()
}

fn longs(values: &[u32]) -> Vec<u8> {
    values.iter().flat_map(|v| v.to_le_bytes()).collect()
}

fn doubles(values: &[f64]) -> Vec<u8> {
    values.iter().flat_map(|v| v.to_le_bytes()).collect()
}

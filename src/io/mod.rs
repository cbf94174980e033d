//! I/O utilities for cogserv
//!
//! Byte-order aware decoding of values out of memory-mapped raster files.

pub mod byte_order;

pub use byte_order::{slice_at, ByteOrder};

//! Named palettes
//!
//! Continuous ramps have [`RAMP_SIZE`] entries; qualitative palettes keep
//! one entry per color. Every name is also available reversed with an `_r`
//! suffix. Names are case-sensitive.

use super::color::from_u32;
use super::colormap::{Colormap, Segments, RAMP_SIZE};

/// Palette used whenever no usable colormap was requested
pub const DEFAULT_PALETTE: &str = "jet";

enum Palette {
    /// Piecewise-linear channels
    Segmented {
        red: &'static Segments,
        green: &'static Segments,
        blue: &'static Segments,
    },
    /// Evenly spaced stops interpolated into a ramp
    Ramp(&'static [u32]),
    /// Fixed colors, no interpolation
    Listed(&'static [u32]),
}

impl Palette {
    fn build(&self, name: &str) -> Colormap {
        match self {
            Palette::Segmented { red, green, blue } => {
                Colormap::from_segments(name, red, green, blue, RAMP_SIZE)
            }
            Palette::Ramp(stops) => {
                let colors: Vec<_> = stops.iter().map(|&c| from_u32(c)).collect();
                Colormap::from_list(name, &colors, RAMP_SIZE)
            }
            Palette::Listed(colors) => {
                Colormap::listed(name, colors.iter().map(|&c| from_u32(c)).collect())
            }
        }
    }
}

/// Looks up a palette by name, honouring the `_r` suffix
pub fn named(name: &str) -> Option<Colormap> {
    if let Some(palette) = find(name) {
        return Some(palette.build(name));
    }
    let base = name.strip_suffix("_r")?;
    find(base).map(|palette| palette.build(base).reversed())
}

/// The default palette
pub fn default_colormap() -> Colormap {
    JET.build(DEFAULT_PALETTE)
}

/// Names of all built-in palettes, without reversed variants
pub fn names() -> impl Iterator<Item = &'static str> {
    PALETTES.iter().map(|(name, _)| *name)
}

fn find(name: &str) -> Option<&'static Palette> {
    PALETTES.iter().find(|(candidate, _)| *candidate == name).map(|(_, palette)| palette)
}

const JET: Palette = Palette::Segmented {
    red: &[(0.0, 0.0), (0.35, 0.0), (0.66, 1.0), (0.89, 1.0), (1.0, 0.5)],
    green: &[(0.0, 0.0), (0.125, 0.0), (0.375, 1.0), (0.64, 1.0), (0.91, 0.0), (1.0, 0.0)],
    blue: &[(0.0, 0.5), (0.11, 1.0), (0.34, 1.0), (0.65, 0.0), (1.0, 0.0)],
};

const UNIT: &Segments = &[(0.0, 0.0), (1.0, 1.0)];

static PALETTES: &[(&str, Palette)] = &[
    ("jet", JET),
    (
        "viridis",
        Palette::Ramp(&[
            0x440154, 0x482878, 0x3e4989, 0x31688e, 0x26828e, 0x1f9e89, 0x35b779, 0x6ece58,
            0xb5de2b, 0xfde725,
        ]),
    ),
    (
        "plasma",
        Palette::Ramp(&[
            0x0d0887, 0x46039f, 0x7201a8, 0x9c179e, 0xbd3786, 0xd8576b, 0xed7953, 0xfb9f3a,
            0xfdca26, 0xf0f921,
        ]),
    ),
    (
        "inferno",
        Palette::Ramp(&[
            0x000004, 0x1b0c41, 0x4a0c6b, 0x781c6d, 0xa52c60, 0xcf4446, 0xed6925, 0xfb9b06,
            0xf7d13d, 0xfcffa4,
        ]),
    ),
    (
        "magma",
        Palette::Ramp(&[
            0x000004, 0x180f3d, 0x440f76, 0x721f81, 0x9e2f7f, 0xcd4071, 0xf1605d, 0xfd9668,
            0xfeca8d, 0xfcfdbf,
        ]),
    ),
    (
        "Blues",
        Palette::Ramp(&[
            0xf7fbff, 0xdeebf7, 0xc6dbef, 0x9ecae1, 0x6baed6, 0x4292c6, 0x2171b5, 0x08519c,
            0x08306b,
        ]),
    ),
    (
        "Greens",
        Palette::Ramp(&[
            0xf7fcf5, 0xe5f5e0, 0xc7e9c0, 0xa1d99b, 0x74c476, 0x41ab5d, 0x238b45, 0x006d2c,
            0x00441b,
        ]),
    ),
    (
        "Greys",
        Palette::Ramp(&[
            0xffffff, 0xf0f0f0, 0xd9d9d9, 0xbdbdbd, 0x969696, 0x737373, 0x525252, 0x252525,
            0x000000,
        ]),
    ),
    (
        "Oranges",
        Palette::Ramp(&[
            0xfff5eb, 0xfee6ce, 0xfdd0a2, 0xfdae6b, 0xfd8d3c, 0xf16913, 0xd94801, 0xa63603,
            0x7f2704,
        ]),
    ),
    (
        "Purples",
        Palette::Ramp(&[
            0xfcfbfd, 0xefedf5, 0xdadaeb, 0xbcbddc, 0x9e9ac8, 0x807dba, 0x6a51a3, 0x54278f,
            0x3f007d,
        ]),
    ),
    (
        "Reds",
        Palette::Ramp(&[
            0xfff5f0, 0xfee0d2, 0xfcbba1, 0xfc9272, 0xfb6a4a, 0xef3b2c, 0xcb181d, 0xa50f15,
            0x67000d,
        ]),
    ),
    (
        "YlOrRd",
        Palette::Ramp(&[
            0xffffcc, 0xffeda0, 0xfed976, 0xfeb24c, 0xfd8d3c, 0xfc4e2a, 0xe31a1c, 0xbd0026,
            0x800026,
        ]),
    ),
    (
        "YlGnBu",
        Palette::Ramp(&[
            0xffffd9, 0xedf8b1, 0xc7e9b4, 0x7fcdbb, 0x41b6c4, 0x1d91c0, 0x225ea8, 0x253494,
            0x081d58,
        ]),
    ),
    (
        "RdBu",
        Palette::Ramp(&[
            0x67001f, 0xb2182b, 0xd6604d, 0xf4a582, 0xfddbc7, 0xf7f7f7, 0xd1e5f0, 0x92c5de,
            0x4393c3, 0x2166ac, 0x053061,
        ]),
    ),
    (
        "RdYlGn",
        Palette::Ramp(&[
            0xa50026, 0xd73027, 0xf46d43, 0xfdae61, 0xfee08b, 0xffffbf, 0xd9ef8b, 0xa6d96a,
            0x66bd63, 0x1a9850, 0x006837,
        ]),
    ),
    (
        "Spectral",
        Palette::Ramp(&[
            0x9e0142, 0xd53e4f, 0xf46d43, 0xfdae61, 0xfee08b, 0xffffbf, 0xe6f598, 0xabdda4,
            0x66c2a5, 0x3288bd, 0x5e4fa2,
        ]),
    ),
    ("gray", Palette::Segmented { red: UNIT, green: UNIT, blue: UNIT }),
    (
        "hot",
        Palette::Segmented {
            red: &[(0.0, 0.0416), (0.365079, 1.0), (1.0, 1.0)],
            green: &[(0.0, 0.0), (0.365079, 0.0), (0.746032, 1.0), (1.0, 1.0)],
            blue: &[(0.0, 0.0), (0.746032, 0.0), (1.0, 1.0)],
        },
    ),
    (
        "cool",
        Palette::Segmented {
            red: UNIT,
            green: &[(0.0, 1.0), (1.0, 0.0)],
            blue: &[(0.0, 1.0), (1.0, 1.0)],
        },
    ),
    (
        "Set1",
        Palette::Listed(&[
            0xe41a1c, 0x377eb8, 0x4daf4a, 0x984ea3, 0xff7f00, 0xffff33, 0xa65628, 0xf781bf,
            0x999999,
        ]),
    ),
    (
        "Set2",
        Palette::Listed(&[
            0x66c2a5, 0xfc8d62, 0x8da0cb, 0xe78ac3, 0xa6d854, 0xffd92f, 0xe5c494, 0xb3b3b3,
        ]),
    ),
    (
        "Set3",
        Palette::Listed(&[
            0x8dd3c7, 0xffffb3, 0xbebada, 0xfb8072, 0x80b1d3, 0xfdb462, 0xb3de69, 0xfccde5,
            0xd9d9d9, 0xbc80bd, 0xccebc5, 0xffed6f,
        ]),
    ),
    (
        "Paired",
        Palette::Listed(&[
            0xa6cee3, 0x1f78b4, 0xb2df8a, 0x33a02c, 0xfb9a99, 0xe31a1c, 0xfdbf6f, 0xff7f00,
            0xcab2d6, 0x6a3d9a, 0xffff99, 0xb15928,
        ]),
    ),
    (
        "Dark2",
        Palette::Listed(&[
            0x1b9e77, 0xd95f02, 0x7570b3, 0xe7298a, 0x66a61e, 0xe6ab02, 0xa6761d, 0x666666,
        ]),
    ),
    (
        "Accent",
        Palette::Listed(&[
            0x7fc97f, 0xbeaed4, 0xfdc086, 0xffff99, 0x386cb0, 0xf0027f, 0xbf5b17, 0x666666,
        ]),
    ),
    (
        "Pastel1",
        Palette::Listed(&[
            0xfbb4ae, 0xb3cde3, 0xccebc5, 0xdecbe4, 0xfed9a6, 0xffffcc, 0xe5d8bd, 0xfddaec,
            0xf2f2f2,
        ]),
    ),
    (
        "tab10",
        Palette::Listed(&[
            0x1f77b4, 0xff7f0e, 0x2ca02c, 0xd62728, 0x9467bd, 0x8c564b, 0xe377c2, 0x7f7f7f,
            0xbcbd22, 0x17becf,
        ]),
    ),
];

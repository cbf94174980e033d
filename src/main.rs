use std::path::{Path, PathBuf};
use std::process;

use clap::{Args, Parser, Subcommand};

use cogserv::colorize::palettes;
use cogserv::encode::DEFAULT_QUALITY;
use cogserv::formats::tiff::tags;
use cogserv::{
    logging, Cog, CogEngine, ColorOptions, Error, GeoInfo, ImageOptions, OutputFormat, RasterEngine,
    Result, SourceRaster, TiffReader,
};

#[derive(Parser)]
#[command(name = "cogserv")]
#[command(
    about = "Inspect Cloud-Optimized GeoTIFFs and render tiles or overviews",
    long_about = None
)]
struct Cli {
    /// Tracing filter used when RUST_LOG is unset
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print the structure and georeferencing of a file
    Info {
        path: PathBuf,
        /// Also list every tag of every IFD
        #[arg(long)]
        tags: bool,
    },
    /// Render one web mercator tile
    Tile {
        path: PathBuf,
        z: u32,
        x: u32,
        y: u32,
        #[command(flatten)]
        render: RenderArgs,
    },
    /// Render the whole raster in geographic coordinates
    Map {
        path: PathBuf,
        #[arg(long, default_value_t = 500)]
        width: u64,
        #[command(flatten)]
        render: RenderArgs,
    },
    /// List the built-in palettes
    Palettes,
}

#[derive(Args)]
struct RenderArgs {
    /// Output file; its extension (png, jpg, webp) picks the format
    #[arg(short, long)]
    output: PathBuf,

    /// Comma-separated 1-based band indexes
    #[arg(long)]
    bands: Option<String>,

    /// Palette name or comma-separated colors
    #[arg(long)]
    colormap: Option<String>,

    /// Comma-separated range values
    #[arg(long)]
    ranges: Option<String>,

    /// linear, discrete or exact
    #[arg(long)]
    interp: Option<String>,

    #[arg(long, default_value_t = DEFAULT_QUALITY)]
    quality: u8,
}

impl RenderArgs {
    fn image_options(&self) -> Result<ImageOptions> {
        let ext = self.output.extension().and_then(|ext| ext.to_str()).unwrap_or_default();
        let format: OutputFormat = ext.parse()?;
        Ok(ImageOptions {
            format,
            quality: self.quality,
            color: ColorOptions {
                bands: self.bands.clone(),
                colormap: self.colormap.clone(),
                ranges: self.ranges.clone(),
                interp: self.interp.clone(),
            },
        })
    }
}

fn main() {
    let cli = Cli::parse();
    if let Err(e) = logging::init(&cli.log_level) {
        eprintln!("Logging already initialized: {}", e);
    }

    if let Err(e) = run(cli.command) {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

fn run(command: Command) -> Result<()> {
    let engine = CogEngine::new();
    match command {
        Command::Info { path, tags } => info(&engine, &path, tags),
        Command::Tile { path, z, x, y, render } => {
            let cog = Cog::new(&engine, locator(&path)?);
            let image = cog.get_tile(z, x, y, &render.image_options()?)?;
            image.export(&render.output)?;
            println!(
                "Wrote tile {}/{}/{} to {} ({} bytes)",
                z,
                x,
                y,
                render.output.display(),
                image.len()
            );
            Ok(())
        }
        Command::Map { path, width, render } => {
            let cog = Cog::new(&engine, locator(&path)?);
            let image = cog.get_map(width, &render.image_options()?)?;
            image.export(&render.output)?;
            println!("Wrote overview to {} ({} bytes)", render.output.display(), image.len());
            Ok(())
        }
        Command::Palettes => {
            for name in palettes::names() {
                println!("{}", name);
            }
            Ok(())
        }
    }
}

fn locator(path: &Path) -> Result<&str> {
    path.to_str()
        .ok_or_else(|| {
            Error::source_unavailable(path.display().to_string(), "Path is not valid UTF-8")
        })
}

fn info(engine: &CogEngine, path: &Path, list_tags: bool) -> Result<()> {
    let reader = TiffReader::open(path)?;
    let tiff = reader.read()?;
    println!("{}", tiff);

    if list_tags {
        for ifd in &tiff.ifds {
            println!("IFD {} at offset {}", ifd.number, ifd.offset);
            for entry in &ifd.entries {
                println!(
                    "  {:>5} {:<28} {:<9} count={} value={}",
                    entry.tag,
                    tags::tag_name(entry.tag),
                    tags::field_type_name(entry.field_type),
                    entry.count,
                    entry.value
                );
            }
        }
        println!();
    }

    if let Some(ifd) = tiff.main_ifd() {
        println!(
            "Data Type: {}",
            ifd.data_type().map(|dt| dt.name()).unwrap_or("Unknown")
        );
        if let Some(geo_info) = GeoInfo::from_ifd(ifd, &reader.tag_reader())? {
            println!("{}", geo_info);
        }
    }

    let source = engine.open(locator(path)?)?;
    println!("CRS: EPSG:{}", source.crs());
    println!("Bounds: {}", source.bounds());
    println!("Bands: {}", source.band_count());
    let transparency = if source.has_internal_mask() {
        "internal mask"
    } else if source.has_alpha() {
        "alpha band"
    } else {
        "none"
    };
    println!("Transparency: {}", transparency);
    match source.nodata() {
        Some(nodata) => println!("Nodata: {}", nodata),
        None => println!("Nodata: none"),
    }
    println!("Pyramid levels: {}", source.level_count());
    Ok(())
}

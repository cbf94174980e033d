//! Server configuration
//!
//! Every setting is a command-line flag with an environment variable
//! fallback, so the service can be configured either way.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;

use crate::encode::DEFAULT_QUALITY;
use crate::error::{Error, Result};

#[derive(Debug, Clone, Parser)]
#[command(
    name = "api-server",
    version,
    about = "Serve map tiles and overviews from Cloud-Optimized GeoTIFFs"
)]
pub struct ServerConfig {
    /// Address to listen on
    #[arg(long, env = "COGSERV_BIND", default_value = "0.0.0.0:3000")]
    pub bind: SocketAddr,

    /// Directory under which <bucket>/<key> resolves
    #[arg(long, env = "COGSERV_DATA_ROOT", default_value = ".")]
    pub data_root: PathBuf,

    /// Overview width when a request names none
    #[arg(long, env = "COGSERV_OVERVIEW_WIDTH", default_value_t = 500)]
    pub overview_width: u64,

    /// Quality of jpg and webp output when a request names none
    #[arg(long, env = "COGSERV_QUALITY", default_value_t = DEFAULT_QUALITY,
          value_parser = clap::value_parser!(u8).range(1..=100))]
    pub quality: u8,

    /// Largest overview width a request may ask for
    #[arg(long, env = "COGSERV_MAX_OVERVIEW_WIDTH", default_value_t = 4096)]
    pub max_overview_width: u64,

    /// Per-request timeout in seconds
    #[arg(long, env = "COGSERV_REQUEST_TIMEOUT_SECS", default_value_t = 30)]
    pub request_timeout_secs: u64,

    /// Tracing filter used when RUST_LOG is unset
    #[arg(long, env = "COGSERV_LOG", default_value = "info")]
    pub log_level: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: SocketAddr::from(([0, 0, 0, 0], 3000)),
            data_root: PathBuf::from("."),
            overview_width: 500,
            quality: DEFAULT_QUALITY,
            max_overview_width: 4096,
            request_timeout_secs: 30,
            log_level: "info".to_string(),
        }
    }
}

impl ServerConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Maps a `(bucket, key)` pair to a path under the data root
    pub fn locator(&self, bucket: &str, key: &str) -> Result<PathBuf> {
        let bucket_ok = !bucket.is_empty()
            && bucket.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        if !bucket_ok {
            return Err(Error::OutOfBounds(format!("Invalid bucket name {:?}", bucket)));
        }

        let key_ok = !key.is_empty()
            && key.chars().all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.' | '/'))
            && !key.starts_with('/')
            && !key.split('/').any(|segment| segment == "..");
        if !key_ok {
            return Err(Error::OutOfBounds(format!("Invalid key {:?}", key)));
        }

        Ok(self.data_root.join(bucket).join(key))
    }
}

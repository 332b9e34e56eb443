//! Runtime configuration.
//!
//! A [`Config`] is plain serde data. Every field has a default, so a JSON
//! file only needs the keys it changes:
//!
//! ```json
//! { "server": { "port": 8080 }, "fonts": { "dir": "./fonts" } }
//! ```

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::layout::DEFAULT_TAGLINE;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid config: {0}")]
    Parse(#[from] serde_json::Error),
}

// ============================================================================
// Sections
// ============================================================================

/// Listening address of the HTTP server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub address: IpAddr,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            address: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            port: 3001,
        }
    }
}

impl ServerConfig {
    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.address, self.port)
    }
}

/// Where faces are looked up and which families are preferred.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FontConfig {
    /// Directory scanned recursively for font files.
    pub dir: Option<PathBuf>,
    /// Also consult the fonts installed on the system.
    pub system_fonts: bool,
    /// Family names in order of preference. The generic serif family is
    /// always tried last.
    pub families: Vec<String>,
}

impl Default for FontConfig {
    fn default() -> Self {
        Self {
            dir: None,
            system_fonts: true,
            families: [
                "Bodoni Moda",
                "Playfair Display",
                "Cormorant Garamond",
                "Spectral SC",
                "Times New Roman",
            ]
            .into_iter()
            .map(String::from)
            .collect(),
        }
    }
}

// ============================================================================
// Config
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub fonts: FontConfig,
    /// Subtitle line drawn under the domain on banners.
    pub tagline: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            fonts: FontConfig::default(),
            tagline: DEFAULT_TAGLINE.to_string(),
        }
    }
}

impl Config {
    /// Reads a JSON config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self::from_json(&json)?)
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

// ============================================================================
// Tests
// ============================================================================

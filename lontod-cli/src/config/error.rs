use std::path::PathBuf;

use thiserror::Error;

/// Invalid configuration, detected before any work starts
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config file {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config file {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("route prefix {0:?} must start with '/'")]
    Route(String),

    #[error("--watch requires at least one path to watch")]
    WatchWithoutPaths,

    #[error("cannot read snippet file {}: {source}", path.display())]
    Snippet {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("public URL {value:?} is not an absolute URL: {reason}")]
    PublicUrl { value: String, reason: String },
}

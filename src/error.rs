use std::path::PathBuf;

use thiserror::Error;

/// Every way a single extraction can end without an artifact.
#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("Please select a file and an output directory.")]
    MissingSelection,

    #[error("Failed to read {path}: {source}")]
    ReadUrlFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid URL '{url}': {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    #[error("URL has no host to fetch a favicon from: {0}")]
    MissingHost(String),

    #[error("Failed to download favicon from {url}: {source}")]
    Download {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Failed to download favicon from {url}: HTTP {status}")]
    DownloadStatus {
        url: String,
        status: reqwest::StatusCode,
    },

    #[error("Failed to write {path}: {source}")]
    WriteFavicon {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[cfg_attr(not(target_os = "windows"), allow(dead_code))]
    #[error("Failed to resolve shortcut {path}: {reason}")]
    Shortcut { path: PathBuf, reason: String },

    #[error("Cannot extract icon from URL: {0}")]
    RemoteTarget(String),

    #[error("File not found: {0}")]
    NotFound(PathBuf),

    #[cfg_attr(not(target_os = "windows"), allow(dead_code))]
    #[error("Failed to extract icon from {path} (index {index})")]
    NoIcons { path: PathBuf, index: i32 },

    #[cfg_attr(not(target_os = "windows"), allow(dead_code))]
    #[error("Failed to render icon: {0}")]
    Graphics(String),

    #[error("Failed to convert image to icon: {source}")]
    Image {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[cfg_attr(not(target_os = "windows"), allow(dead_code))]
    #[error("Failed to encode icon for {path}: {source}")]
    EncodeIcon {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("Failed to write icon {path}: {source}")]
    WriteIcon {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{0} is only available on Windows")]
    Unsupported(&'static str),
}

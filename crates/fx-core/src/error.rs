use thiserror::Error;

/// Why a decorative asset could not be shown as authored.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AssetError {
    #[error("fetch failed: {0}")]
    Fetch(String),
    #[error("http status {0}")]
    HttpStatus(u16),
    #[error("gltf parse error: {0}")]
    Parse(String),
    #[error("external buffer references are not supported: {0}")]
    ExternalBuffer(String),
    #[error("scene contains no triangle meshes")]
    EmptyScene,
    #[error("unsupported primitive mode {0}")]
    UnsupportedPrimitive(String),
    #[error("invalid geometry: {0}")]
    InvalidGeometry(String),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config json: {0}")]
    Json(#[from] serde_json::Error),
}

use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use pagedrop_publish::{AllocatorConfig, MAX_SLUG_LEN};
use serde::{Deserialize, Serialize};

use crate::error::{ServerError, ServerResult};

/// Where the server keeps documents and deployment rows.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    /// Process-local maps; everything is lost on exit.
    Memory,
    /// Blob files and a JSON row snapshot under `data_dir`.
    #[default]
    Fs,
}

impl StorageBackend {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Memory => "memory",
            Self::Fs => "fs",
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind_addr: SocketAddr,
    pub data_dir: PathBuf,
    /// Prefix of every `publicUrl`; the server answers it under `/files`.
    pub public_base_url: String,
    pub max_document_size: usize,
    pub slug_len: usize,
    pub max_slug_attempts: u32,
    pub storage: StorageBackend,
}

impl Default for ServerConfig {
    fn default() -> Self {
        let allocator = AllocatorConfig::default();
        Self {
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 8080)),
            data_dir: PathBuf::from("pagedrop-data"),
            public_base_url: "http://127.0.0.1:8080/files".into(),
            max_document_size: 10 * 1024 * 1024,
            slug_len: allocator.slug_len,
            max_slug_attempts: allocator.max_attempts,
            storage: StorageBackend::default(),
        }
    }
}

impl ServerConfig {
    /// Parse a TOML document. Missing keys keep their defaults.
    pub fn from_toml_str(s: &str) -> ServerResult<Self> {
        let config: Self = toml::from_str(s).map_err(|e| ServerError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> ServerResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .map_err(|e| ServerError::Config(format!("{}: {e}", path.display())))?;
        Self::from_toml_str(&text)
    }

    pub fn validate(&self) -> ServerResult<()> {
        if !(1..=MAX_SLUG_LEN).contains(&self.slug_len) {
            return Err(ServerError::Config(format!(
                "slug_len must be between 1 and {MAX_SLUG_LEN}, got {}",
                self.slug_len
            )));
        }
        if self.max_slug_attempts == 0 {
            return Err(ServerError::Config("max_slug_attempts must be at least 1".into()));
        }
        if self.max_document_size == 0 {
            return Err(ServerError::Config("max_document_size must be at least 1".into()));
        }
        Ok(())
    }

    pub fn allocator(&self) -> AllocatorConfig {
        AllocatorConfig {
            slug_len: self.slug_len,
            max_attempts: self.max_slug_attempts,
        }
    }

    pub fn blob_root(&self) -> PathBuf {
        self.data_dir.join("blobs")
    }

    pub fn metadata_path(&self) -> PathBuf {
        self.data_dir.join("deployments.json")
    }
}

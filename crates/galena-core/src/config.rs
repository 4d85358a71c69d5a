//! Configuration types for chunking, indexing, and capability providers.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

/// Complete service configuration.
#[derive(Default, Debug, Clone, Serialize, Deserialize)]
pub struct GalenaConfig {
    /// Chunking parameters
    pub chunking: ChunkingConfig,
    /// Vector index settings
    pub index: IndexConfig,
    /// Embedding capability settings
    pub embedding: EmbeddingConfig,
    /// Generation capability settings
    pub generation: GenerationConfig,
    /// API keys for generation providers
    pub api_keys: ApiKeys,
}

/// API keys for generation providers.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ApiKeys {
    /// `OpenRouter` API key used by the generation capability
    pub openrouter_api_key: Option<String>,
}

/// Chunking parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChunkingConfig {
    /// Maximum chunk length in characters
    pub chunk_size: usize,
    /// Overlap between consecutive chunks in characters
    pub overlap: usize,
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            chunk_size: 1000,
            overlap: 150,
        }
    }
}

/// Vector index settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexConfig {
    /// Directory holding the persisted index snapshot
    pub data_dir: PathBuf,
    /// Number of passages retrieved per query
    pub top_k: usize,
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            top_k: 4,
        }
    }
}

/// Embedding capability settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingConfig {
    /// Ollama host URL
    pub host: String,
    /// Ollama port
    pub port: u16,
    /// Embedding model name
    pub model: String,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            host: env::var("OLLAMA_HOST").unwrap_or_else(|_| "http://localhost".to_owned()),
            port: 11434,
            model: "nomic-embed-text".to_owned(),
        }
    }
}

/// Generation capability settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationConfig {
    /// Model identifier sent to the provider
    pub model: String,
    /// Sampling temperature
    pub temperature: f32,
    /// Maximum tokens per completion
    pub max_tokens: u32,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            model: "google/gemini-2.5-flash".to_owned(),
            temperature: 0.7,
            max_tokens: 4096,
        }
    }
}

/// Default snapshot directory: `GALENA_DATA_DIR`, else `~/.galena/data`.
fn default_data_dir() -> PathBuf {
    if let Ok(dir) = env::var("GALENA_DATA_DIR") {
        return PathBuf::from(dir);
    }
    dirs::home_dir().map_or_else(
        || PathBuf::from(".galena/data"),
        |home| home.join(".galena").join("data"),
    )
}

impl GalenaConfig {
    /// Get the default config directory path (`~/.galena`)
    ///
    /// # Errors
    /// Returns an error if the home directory cannot be determined
    pub fn config_dir() -> Result<PathBuf> {
        let home = dirs::home_dir()
            .ok_or_else(|| Error::Other("Could not determine home directory".to_owned()))?;
        Ok(home.join(".galena"))
    }

    /// Get the default config file path (`~/.galena/config.toml`)
    ///
    /// # Errors
    /// Returns an error if the home directory cannot be determined
    pub fn config_path() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join("config.toml"))
    }

    /// Load config from the default location (`~/.galena/config.toml`)
    /// If the config doesn't exist, creates it with default values
    ///
    /// # Errors
    /// Returns an error if the config cannot be read or created
    pub fn load_or_create() -> Result<Self> {
        let config_path = Self::config_path()?;

        if config_path.exists() {
            Self::load_from_file(&config_path)
        } else {
            let config = Self::default();
            config.save_to_file(&config_path)?;
            Ok(config)
        }
    }

    /// Load config from a specific file
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or parsed
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .map_err(|error| Error::Config(format!("Failed to read config: {error}")))?;
        let config: Self = toml::from_str(&contents)
            .map_err(|error| Error::Config(format!("Failed to parse config: {error}")))?;

        tracing::debug!(
            "Loaded config from {:?}: openrouter_api_key={}",
            path,
            if config.api_keys.openrouter_api_key.is_some() {
                "present"
            } else {
                "missing"
            }
        );

        Ok(config)
    }

    /// Save config to a specific file
    ///
    /// # Errors
    /// Returns an error if the file cannot be written
    pub fn save_to_file(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|error| {
                Error::Config(format!("Failed to create config directory: {error}"))
            })?;
        }

        let contents = toml::to_string_pretty(self)
            .map_err(|error| Error::Config(format!("Failed to serialize config: {error}")))?;

        let header = "# Galena Configuration File\n\
                      # This file is automatically generated on first run\n\
                      # Edit this file to customize your settings\n\n";

        fs::write(path, format!("{header}{contents}"))
            .map_err(|error| Error::Config(format!("Failed to write config: {error}")))?;

        Ok(())
    }

    /// Get the `OpenRouter` API key, checking config first, then the
    /// `OPENROUTER_API_KEY` environment variable
    #[must_use]
    pub fn openrouter_api_key(&self) -> Option<String> {
        self.api_keys
            .openrouter_api_key
            .clone()
            .or_else(|| env::var("OPENROUTER_API_KEY").ok())
    }
}

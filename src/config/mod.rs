// Configuration management module
// Loads and validates the TOML configuration for the assistant

pub mod settings;

pub use settings::{
    AssistantConfig, Config, ConfigError, DocumentsConfig, GroqConfig, OllamaConfig,
    RetrievalConfig,
};

/// Get the default base directory for configuration and index data
#[inline]
pub fn default_base_dir() -> Result<std::path::PathBuf, ConfigError> {
    dirs::config_dir()
        .map(|dir| dir.join("corpus-chat"))
        .ok_or(ConfigError::DirectoryError)
}

use config::{Config as ConfigLoader, ConfigError, Environment, File};
use kaleido_search::PipelineConfig;
use serde::Deserialize;
use std::path::Path;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub cors: CorsConfig,
    pub mongodb: MongoDbConfig,
    pub llm: LlmConfig,
    pub retrieval: RetrievalConfig,
    #[serde(default)]
    pub pipeline: PipelineSettings,
    pub logging: LoggingConfig,

    // Secrets (from ENV only)
    #[serde(default)]
    pub mongodb_uri: Option<String>,
    #[serde(default)]
    pub openai_api_key: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_timeout_secs() -> u64 {
    120
}

#[derive(Debug, Clone, Deserialize)]
pub struct CorsConfig {
    pub enabled: bool,
    pub origins: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MongoDbConfig {
    pub database: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LlmConfig {
    pub model: String,
    pub temperature: f32,
    pub embedding_model: String,
    /// OpenAI-compatible endpoint, defaults to the public API
    #[serde(default)]
    pub base_url: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RetrievalConfig {
    pub chroma_host: String,
    pub chroma_port: u16,
    pub collection: String,
    pub k: usize,
    pub candidate_k: usize,
    pub top_n: usize,
    /// Reranking is disabled when unset
    #[serde(default)]
    pub reranker_url: Option<String>,
}

impl RetrievalConfig {
    pub fn chroma_url(&self) -> String {
        format!("http://{}:{}", self.chroma_host, self.chroma_port)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct PipelineSettings {
    pub summarize: bool,
    pub title_length: usize,
    pub summary_length: usize,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        let defaults = PipelineConfig::default();
        Self {
            summarize: defaults.summarize,
            title_length: defaults.title_length,
            summary_length: defaults.summary_length,
        }
    }
}

impl From<&PipelineSettings> for PipelineConfig {
    fn from(settings: &PipelineSettings) -> Self {
        PipelineConfig::new()
            .with_summarize(settings.summarize)
            .with_title_length(settings.title_length)
            .with_summary_length(settings.summary_length)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
    pub format: String,
}

impl Config {
    /// Load configuration from TOML files and environment variables
    ///
    /// Hierarchy (weakest to strongest):
    /// 1. config/default.toml
    /// 2. config/{ENV}.toml (if ENV is set)
    /// 3. Environment variables, e.g. `KALEIDO_RETRIEVAL__CHROMA_HOST`
    pub fn load() -> Result<Self, ConfigError> {
        let env = std::env::var("ENV").unwrap_or_else(|_| "dev".to_string());

        let builder = ConfigLoader::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", env)).required(false))
            .add_source(
                Environment::with_prefix("KALEIDO")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            );

        let mut cfg: Config = builder.build()?.try_deserialize()?;

        // Secrets never come from TOML
        cfg.mongodb_uri = std::env::var("MONGODB_URI").ok().filter(|uri| !uri.is_empty());
        cfg.openai_api_key = std::env::var("OPENAI_API_KEY")
            .map_err(|_| ConfigError::Message("OPENAI_API_KEY environment variable is required".to_string()))?;

        Ok(cfg)
    }

    /// Load config from a specific path (useful for testing)
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let builder = ConfigLoader::builder().add_source(File::from(path.as_ref()));

        let config = builder.build()?;
        config.try_deserialize()
    }

    pub fn pipeline_config(&self) -> PipelineConfig {
        PipelineConfig::from(&self.pipeline)
    }
}

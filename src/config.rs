use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::warn;

/// The `PipelineConfig` struct holds the configuration settings for the case
/// pipeline. It includes settings for concurrent requests, timeout, user agent,
/// the search source, and the generation engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// The number of concurrent outbound requests allowed.
    pub concurrent_requests: usize,
    /// The timeout for HTTP requests, in seconds.
    pub timeout_secs: u64,
    /// The user agent string to be used in HTTP requests.
    pub user_agent: String,
    /// The base URL of the case-law search source.
    pub search_base_url: String,
    /// The maximum number of characters of case text kept per case.
    pub max_case_text_length: usize,
    /// The configuration settings for the generation engine.
    pub generation: GenerationConfig,
}

/// The `GenerationConfig` struct holds the settings for the generative text
/// model used for summarization.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationConfig {
    /// The endpoint URL for the generation engine API.
    pub endpoint: String,
    /// The model name to generate with.
    pub model: String,
    /// The temperature setting, controlling the randomness of the output.
    pub temperature: f32,
    /// The nucleus sampling threshold.
    pub top_p: f32,
    /// The maximum number of new tokens to generate.
    pub max_new_tokens: u32,
    /// The maximum number of prompt tokens fed to the model.
    pub max_input_tokens: u32,
    /// The number of worker slots for concurrent generation.
    pub workers: usize,
    /// An optional fixed sampling seed.
    pub seed: Option<u64>,
}

impl PipelineConfig {
    /// Loads the configuration from an optional `lexsum` file and
    /// `LEXSUM_`-prefixed environment variables, falling back to defaults
    /// when neither is present or the sources fail to parse.
    pub fn load() -> Self {
        let loaded = Config::builder()
            .add_source(File::with_name("lexsum").required(false))
            .add_source(
                Environment::with_prefix("LEXSUM")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .and_then(|settings| settings.try_deserialize::<Self>());

        match loaded {
            Ok(config) => config,
            Err(e) => {
                warn!("Falling back to default configuration: {}", e);
                Self::default()
            }
        }
    }

    /// Returns the request timeout as a `Duration`.
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for PipelineConfig {
    /// Provides default values for the `PipelineConfig` struct.
    ///
    /// # Returns
    ///
    /// A `PipelineConfig` instance with default settings.
    fn default() -> Self {
        Self {
            concurrent_requests: crate::MAX_CONCURRENT_REQUESTS,
            timeout_secs: crate::DEFAULT_TIMEOUT.as_secs(),
            user_agent: String::from("Mozilla/5.0"),
            search_base_url: String::from("https://indiankanoon.org"),
            max_case_text_length: crate::MAX_CASE_TEXT_LENGTH,
            generation: GenerationConfig::default(),
        }
    }
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            endpoint: String::from("http://localhost:11434/api/generate"),
            model: String::from("deepseek-r1:1.5b"),
            temperature: 0.7,
            top_p: 0.9,
            max_new_tokens: 512,
            max_input_tokens: 4096,
            workers: crate::SUMMARY_WORKERS,
            seed: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Tests that the default configuration carries the pipeline limits.
    #[test]
    fn test_default_limits() {
        let config = PipelineConfig::default();

        assert_eq!(config.concurrent_requests, 100);
        assert_eq!(config.timeout(), Duration::from_secs(10));
        assert_eq!(config.max_case_text_length, 9500);
        assert_eq!(config.generation.workers, 10);
        assert_eq!(config.generation.max_new_tokens, 512);
        assert_eq!(config.generation.max_input_tokens, 4096);
    }
}

use crate::config::GenerationConfig;
use crate::prompt::PromptBuilder;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::Semaphore;
use tracing::{debug, warn};

/// The delimiter closing the model's reasoning block. Only text after its
/// last occurrence is kept as the summary.
pub const REASONING_DELIMITER: &str = "</think>";
/// The prefix of summaries produced when generation itself failed.
pub const SUMMARIZATION_ERROR_PREFIX: &str = "Error in summarization: ";

/// One generation call: the prompt plus the decoding parameters.
#[derive(Debug, Clone)]
pub struct GenerationRequest {
    /// The full prompt, instruction template plus embedded case text.
    pub prompt: String,
    /// The maximum number of new tokens to generate.
    pub max_new_tokens: u32,
    /// The sampling temperature.
    pub temperature: f32,
    /// The nucleus sampling threshold.
    pub top_p: f32,
    /// The maximum number of prompt tokens fed to the model; longer prompts
    /// are truncated by the engine.
    pub max_input_tokens: u32,
    /// An optional fixed sampling seed.
    pub seed: Option<u64>,
}

/// The `GenerationError` enum carries the structured reason a generation
/// call failed. The summarizer, not the engine, decides how failures are
/// rendered to the caller.
#[derive(Error, Debug)]
pub enum GenerationError {
    /// The engine could not be reached.
    #[error("engine unreachable: {0}")]
    Transport(String),
    /// The engine answered with a non-success status.
    #[error("engine returned status {status}: {message}")]
    Engine { status: u16, message: String },
    /// The engine's response could not be decoded.
    #[error("malformed engine response: {0}")]
    Malformed(String),
}

/// The `TextGenerator` trait is the seam to the generative text model.
///
/// `generate` is synchronous and compute-bound; the pipeline only ever
/// invokes it from the summary worker pool, never on the I/O scheduler.
pub trait TextGenerator: Send + Sync {
    /// Runs one generation call and returns the raw decoded output.
    fn generate(&self, request: &GenerationRequest) -> Result<String, GenerationError>;
}

#[derive(Serialize)]
struct GenerateCall<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
    options: GenerateOptions,
}

#[derive(Serialize)]
struct GenerateOptions {
    temperature: f32,
    top_p: f32,
    num_predict: u32,
    num_ctx: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    seed: Option<u64>,
}

#[derive(Deserialize)]
struct GenerateReply {
    response: String,
}

/// The `OllamaGenerator` struct runs generation against a local Ollama
/// server. It uses a blocking HTTP client on purpose: calls happen on the
/// worker pool, outside the async I/O domain.
pub struct OllamaGenerator {
    /// The blocking HTTP client used for generation calls.
    http: reqwest::blocking::Client,
    /// The full URL of the generate endpoint.
    endpoint: String,
    /// The model name to generate with.
    model: String,
}

impl OllamaGenerator {
    /// Creates a new `OllamaGenerator` for the configured endpoint and model.
    ///
    /// Must be constructed outside the async runtime; the query runner's
    /// synchronous entry point is the intended call site.
    ///
    /// # Arguments
    ///
    /// * `config` - The generation engine settings.
    ///
    /// # Returns
    ///
    /// A `Result` containing the generator, or an error if the HTTP client
    /// could not be created.
    pub fn new(config: &GenerationConfig) -> crate::Result<Self> {
        let http = reqwest::blocking::Client::builder()
            .timeout(None)
            .build()
            .map_err(crate::PipelineError::RequestError)?;

        Ok(Self {
            http,
            endpoint: config.endpoint.clone(),
            model: config.model.clone(),
        })
    }
}

impl TextGenerator for OllamaGenerator {
    fn generate(&self, request: &GenerationRequest) -> Result<String, GenerationError> {
        let call = GenerateCall {
            model: &self.model,
            prompt: &request.prompt,
            stream: false,
            options: GenerateOptions {
                temperature: request.temperature,
                top_p: request.top_p,
                num_predict: request.max_new_tokens,
                num_ctx: request.max_input_tokens,
                seed: request.seed,
            },
        };

        let response = self
            .http
            .post(&self.endpoint)
            .json(&call)
            .send()
            .map_err(|e| GenerationError::Transport(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .map_err(|e| GenerationError::Transport(e.to_string()))?;

        if !status.is_success() {
            return Err(GenerationError::Engine {
                status: status.as_u16(),
                message: body,
            });
        }

        let reply: GenerateReply =
            serde_json::from_str(&body).map_err(|e| GenerationError::Malformed(e.to_string()))?;

        Ok(reply.response)
    }
}

/// Keeps only the text after the last reasoning delimiter, trimmed. Output
/// without a delimiter is kept whole, also trimmed.
fn strip_reasoning(raw: &str) -> String {
    match raw.rsplit_once(REASONING_DELIMITER) {
        Some((_, after)) => after.trim().to_string(),
        None => raw.trim().to_string(),
    }
}

/// The `Summarizer` struct produces a structured summary of case text.
///
/// Generation runs on a bounded worker pool separate from the network
/// concurrency domain: each call acquires a worker slot, hands the request to
/// a blocking task, and suspends only while awaiting that task. Summarization
/// never fails past this boundary; every error becomes a readable string.
pub struct Summarizer {
    /// The generation engine handle.
    generator: Arc<dyn TextGenerator>,
    /// The worker slots bounding concurrent generation calls.
    workers: Arc<Semaphore>,
    /// The decoding parameters applied to every call.
    settings: GenerationConfig,
}

impl Summarizer {
    /// Creates a new `Summarizer`.
    ///
    /// # Arguments
    ///
    /// * `generator` - The generation engine to delegate to.
    /// * `settings` - The decoding parameters and worker pool size.
    ///
    /// # Returns
    ///
    /// A new instance of `Summarizer`.
    pub fn new(generator: Arc<dyn TextGenerator>, settings: &GenerationConfig) -> Self {
        Self {
            generator,
            workers: Arc::new(Semaphore::new(settings.workers)),
            settings: settings.clone(),
        }
    }

    /// Summarizes the given case text.
    ///
    /// # Arguments
    ///
    /// * `text` - The case text, already truncated by extraction.
    ///
    /// # Returns
    ///
    /// The post-processed summary, or an "Error in summarization: ..." string
    /// if generation failed.
    pub async fn summarize(&self, text: &str) -> String {
        let request = GenerationRequest {
            prompt: PromptBuilder::new(text).build(),
            max_new_tokens: self.settings.max_new_tokens,
            temperature: self.settings.temperature,
            top_p: self.settings.top_p,
            max_input_tokens: self.settings.max_input_tokens,
            seed: self.settings.seed,
        };

        let permit = match self.workers.clone().acquire_owned().await {
            Ok(permit) => permit,
            Err(_) => return format!("{}worker pool closed", SUMMARIZATION_ERROR_PREFIX),
        };

        debug!("Dispatching generation of {} prompt chars", request.prompt.len());
        let generator = Arc::clone(&self.generator);
        let outcome = tokio::task::spawn_blocking(move || {
            let _permit = permit;
            generator.generate(&request)
        })
        .await;

        match outcome {
            Ok(Ok(raw)) => strip_reasoning(&raw),
            Ok(Err(e)) => {
                warn!("Generation failed: {}", e);
                format!("{}{}", SUMMARIZATION_ERROR_PREFIX, e)
            }
            Err(e) => {
                warn!("Generation task failed: {}", e);
                format!("{}{}", SUMMARIZATION_ERROR_PREFIX, e)
            }
        }
    }
}

use crate::{PipelineConfig, PipelineError, Result};
use reqwest::{Client, StatusCode};
use std::sync::Arc;
use tokio::sync::{OwnedSemaphorePermit, Semaphore};
use tracing::debug;

/// The `ConcurrencyGate` struct is a counting admission control for outbound
/// requests. A slot must be acquired before every request and is released when
/// the permit is dropped; callers suspend while the gate is saturated.
#[derive(Debug, Clone)]
pub struct ConcurrencyGate {
    permits: Arc<Semaphore>,
    capacity: usize,
}

impl ConcurrencyGate {
    /// Creates a gate admitting at most `capacity` concurrent holders.
    pub fn new(capacity: usize) -> Self {
        Self {
            permits: Arc::new(Semaphore::new(capacity)),
            capacity,
        }
    }

    /// Acquires one slot, suspending until one is free.
    ///
    /// # Returns
    ///
    /// A permit that returns the slot to the gate when dropped, or an error
    /// if the gate has been closed.
    pub async fn acquire(&self) -> Result<OwnedSemaphorePermit> {
        self.permits
            .clone()
            .acquire_owned()
            .await
            .map_err(|_| PipelineError::GateClosed)
    }

    /// The maximum number of slots this gate admits.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// The number of slots currently free.
    pub fn available(&self) -> usize {
        self.permits.available_permits()
    }
}

/// A fetched page: the response status together with its full body. A
/// non-success status is not an error at this layer; callers interpret it.
#[derive(Debug, Clone)]
pub struct FetchedPage {
    /// The HTTP status the source answered with.
    pub status: StatusCode,
    /// The response body.
    pub body: String,
}

impl FetchedPage {
    /// Returns `true` if the status is in the 2xx range.
    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }
}

/// The `RateLimitedFetcher` struct issues HTTP GET requests under the global
/// concurrency gate. It holds the shared HTTP client configured with the
/// pipeline's user agent and request timeout.
pub struct RateLimitedFetcher {
    /// The HTTP client used for making requests.
    client: Client,
    /// The admission gate bounding in-flight requests.
    gate: ConcurrencyGate,
}

impl RateLimitedFetcher {
    /// Creates a new `RateLimitedFetcher` with the given configuration.
    ///
    /// # Arguments
    ///
    /// * `config` - The pipeline configuration settings.
    ///
    /// # Returns
    ///
    /// A `Result` containing the fetcher, or an error if the client could not
    /// be created.
    pub fn new(config: &PipelineConfig) -> Result<Self> {
        let client = Client::builder()
            .user_agent(&config.user_agent)
            .timeout(config.timeout())
            .gzip(true)
            .build()
            .map_err(PipelineError::RequestError)?;

        Ok(Self {
            client,
            gate: ConcurrencyGate::new(config.concurrent_requests),
        })
    }

    /// Fetches the given URL, holding one gate slot for the full duration of
    /// the request including the body read. The slot is released on every
    /// exit path, error or not.
    ///
    /// # Arguments
    ///
    /// * `url` - The URL to fetch.
    ///
    /// # Returns
    ///
    /// A `Result` containing the `FetchedPage`, or an error if the request
    /// failed or timed out. A non-success status is returned in the page, not
    /// as an error.
    pub async fn fetch(&self, url: &str) -> Result<FetchedPage> {
        let _permit = self.gate.acquire().await?;

        debug!("Fetching: {}", url);
        let response = self.client.get(url).send().await?;
        let status = response.status();
        let body = response.text().await?;

        debug!("Fetched {} with status {}", url, status);
        Ok(FetchedPage { status, body })
    }

    /// The admission gate shared by all requests through this fetcher.
    pub fn gate(&self) -> &ConcurrencyGate {
        &self.gate
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio::time::{sleep, Duration};

    /// Tests that the gate's concurrently-held count never exceeds its
    /// capacity, under far more simultaneous acquirers than slots.
    #[tokio::test]
    async fn test_gate_never_exceeds_capacity() {
        let gate = ConcurrencyGate::new(7);
        let current = Arc::new(AtomicUsize::new(0));
        let high_water = Arc::new(AtomicUsize::new(0));

        let tasks: Vec<_> = (0..200)
            .map(|_| {
                let gate = gate.clone();
                let current = current.clone();
                let high_water = high_water.clone();
                tokio::spawn(async move {
                    let _permit = gate.acquire().await.unwrap();
                    let held = current.fetch_add(1, Ordering::SeqCst) + 1;
                    high_water.fetch_max(held, Ordering::SeqCst);
                    sleep(Duration::from_millis(2)).await;
                    current.fetch_sub(1, Ordering::SeqCst);
                })
            })
            .collect();

        for task in tasks {
            task.await.unwrap();
        }

        assert!(high_water.load(Ordering::SeqCst) <= 7);
        assert_eq!(gate.available(), 7);
    }

    /// Tests that a non-success status is returned as a page, not an error,
    /// and that the gate slot is released afterwards.
    #[tokio::test]
    async fn test_non_success_status_is_not_an_error() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/doc/1/")
            .with_status(503)
            .with_body("unavailable")
            .create_async()
            .await;

        let fetcher = RateLimitedFetcher::new(&PipelineConfig::default()).unwrap();
        let page = fetcher
            .fetch(&format!("{}/doc/1/", server.url()))
            .await
            .unwrap();

        assert!(!page.is_success());
        assert_eq!(page.status.as_u16(), 503);
        assert_eq!(page.body, "unavailable");
        assert_eq!(fetcher.gate().available(), fetcher.gate().capacity());
        mock.assert_async().await;
    }

    /// Tests that the slot is released when the request itself fails.
    #[tokio::test]
    async fn test_slot_released_on_request_error() {
        let config = PipelineConfig {
            concurrent_requests: 3,
            ..PipelineConfig::default()
        };
        let fetcher = RateLimitedFetcher::new(&config).unwrap();

        // An unroutable address: the request errors without a response.
        let result = fetcher.fetch("http://127.0.0.1:1/nothing").await;

        assert!(result.is_err());
        assert_eq!(fetcher.gate().available(), 3);
    }
}

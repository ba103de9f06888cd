use crate::pipeline::CasePipeline;
use crate::types::CaseSummary;
use crate::Result;
use tokio::runtime::{Builder, Runtime};

/// The `QueryRunner` struct bridges the asynchronous pipeline into a
/// synchronous call site. It owns the runtime and drives one pipeline run to
/// completion per call; it carries no business logic of its own.
pub struct QueryRunner {
    /// The runtime driving the pipeline.
    runtime: Runtime,
    /// The pipeline executed per query.
    pipeline: CasePipeline,
}

impl QueryRunner {
    /// Creates a new `QueryRunner` around the given pipeline.
    ///
    /// # Arguments
    ///
    /// * `pipeline` - The pipeline to drive.
    ///
    /// # Returns
    ///
    /// A `Result` containing the runner, or an error if the runtime could
    /// not be built.
    pub fn new(pipeline: CasePipeline) -> Result<Self> {
        let runtime = Builder::new_multi_thread().enable_all().build()?;

        Ok(Self { runtime, pipeline })
    }

    /// Runs one query to completion, blocking the calling thread.
    ///
    /// # Arguments
    ///
    /// * `query` - The free-text legal query.
    ///
    /// # Returns
    ///
    /// `Ok(None)` if the search yielded no results, otherwise `Ok(Some(..))`
    /// with one summary per case in search order.
    pub fn run_query(&self, query: &str) -> Result<Option<Vec<CaseSummary>>> {
        self.runtime.block_on(self.pipeline.run(query))
    }
}

use crate::{Error, ErrorContext, Result};
use once_cell::sync::OnceCell;
use tokio::runtime::{Builder, Runtime};
use tracing::debug;

/// Engine-owned runtime that runs callback requests.
///
/// Started on first use. Callbacks run on its threads, which are named
/// `unihttp-<engine>-worker`.
pub(crate) struct WorkerPool {
    engine: &'static str,
    threads: Option<usize>,
    runtime: OnceCell<Runtime>,
}

impl WorkerPool {
    pub(crate) fn new(engine: &'static str, threads: Option<usize>) -> Self {
        Self {
            engine,
            threads: threads.filter(|n| *n > 0),
            runtime: OnceCell::new(),
        }
    }

    pub(crate) fn get(&self) -> Result<&Runtime> {
        self.runtime.get_or_try_init(|| {
            let mut builder = Builder::new_multi_thread();
            builder
                .enable_all()
                .thread_name(format!("unihttp-{}-worker", self.engine));
            if let Some(n) = self.threads {
                builder.worker_threads(n);
            }
            debug!(engine = self.engine, threads = ?self.threads, "starting worker runtime");
            builder.build().map_err(|e| {
                Error::invalid_argument(
                    "worker runtime could not be started",
                    ErrorContext::new()
                        .with_field_path("worker_threads")
                        .with_details(e.to_string())
                        .with_source(self.engine),
                )
            })
        })
    }
}

impl Drop for WorkerPool {
    fn drop(&mut self) {
        // Dropping a runtime blocks, which panics inside async contexts.
        if let Some(runtime) = self.runtime.take() {
            runtime.shutdown_background();
        }
    }
}

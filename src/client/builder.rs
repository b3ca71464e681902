use super::async_client::HttpAsyncClient;
use super::core::HttpClient;
use crate::config::{BackendKind, Configuration};
use crate::transport::{AsyncBackend, ReqwestBackend, SyncBackend, UreqBackend};
use std::sync::Arc;
use tracing::debug;

/// Builder for [`HttpClient`] and [`HttpAsyncClient`].
///
/// The engine is chosen here, once, from [`Configuration::backend`] unless
/// one is injected. Native engine clients are built lazily on the first
/// request; a configuration the engine rejects fails that request with
/// [`ErrorKind::InvalidArgument`](crate::ErrorKind::InvalidArgument).
#[derive(Default)]
pub struct HttpClientBuilder {
    configuration: Configuration,
    sync_backend: Option<Arc<dyn SyncBackend>>,
    async_backend: Option<Arc<dyn AsyncBackend>>,
}

impl HttpClientBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from [`Configuration::from_env`].
    pub fn from_env() -> Self {
        Self::new().configuration(Configuration::from_env())
    }

    pub fn configuration(mut self, configuration: Configuration) -> Self {
        self.configuration = configuration;
        self
    }

    pub fn backend(mut self, backend: BackendKind) -> Self {
        self.configuration.backend = backend;
        self
    }

    /// Use `backend` for blocking calls instead of one built from the configuration.
    pub fn sync_backend(mut self, backend: Arc<dyn SyncBackend>) -> Self {
        self.sync_backend = Some(backend);
        self
    }

    /// Use `backend` for callback calls instead of one built from the configuration.
    pub fn async_backend(mut self, backend: Arc<dyn AsyncBackend>) -> Self {
        self.async_backend = Some(backend);
        self
    }

    pub fn build(self) -> HttpClient {
        let backend = match self.sync_backend {
            Some(backend) => backend,
            None => {
                let configuration = Arc::new(self.configuration);
                debug!(backend = %configuration.backend, "selecting engine");
                match configuration.backend {
                    BackendKind::Reqwest => {
                        Arc::new(ReqwestBackend::new(configuration)) as Arc<dyn SyncBackend>
                    }
                    BackendKind::Ureq => Arc::new(UreqBackend::new(configuration)),
                }
            }
        };
        HttpClient::with_backend(backend)
    }

    pub fn build_async(self) -> HttpAsyncClient {
        let backend = match self.async_backend {
            Some(backend) => backend,
            None => {
                let configuration = Arc::new(self.configuration);
                debug!(backend = %configuration.backend, "selecting engine");
                match configuration.backend {
                    BackendKind::Reqwest => {
                        Arc::new(ReqwestBackend::new(configuration)) as Arc<dyn AsyncBackend>
                    }
                    BackendKind::Ureq => Arc::new(UreqBackend::new(configuration)),
                }
            }
        };
        HttpAsyncClient::with_backend(backend)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::testing::RecordingBackend;

    #[test]
    fn engine_follows_configuration() {
        assert_eq!(HttpClientBuilder::new().build().backend_name(), "reqwest");
        assert_eq!(
            HttpClientBuilder::new().backend(BackendKind::Ureq).build().backend_name(),
            "ureq"
        );
        assert_eq!(
            HttpClientBuilder::new()
                .configuration(Configuration::new().with_backend(BackendKind::Ureq))
                .build_async()
                .backend_name(),
            "ureq"
        );
    }

    #[test]
    fn injected_engine_wins() {
        let client = HttpClientBuilder::new()
            .backend(BackendKind::Ureq)
            .sync_backend(Arc::new(RecordingBackend::ok()))
            .build();
        assert_eq!(client.backend_name(), "recording");
    }
}

use log::*;
use mpesa_tools::credentials::{AccessTokenSource, CredentialManager, CredentialReader, RefreshSettings};
use tokio::{sync::watch, task::JoinHandle};

use crate::errors::ServerError;

/// A running access token refresh worker.
pub struct TokenWorker {
    shutdown: watch::Sender<bool>,
    reader: CredentialReader,
    handle: JoinHandle<()>,
}

impl TokenWorker {
    /// Fetches the first access token and starts refreshing it in the background. A failed first fetch is logged and
    /// retried by the worker; it does not stop the server from starting.
    pub async fn start<S: AccessTokenSource>(source: S, settings: &RefreshSettings) -> Self {
        let (shutdown, signal) = watch::channel(false);
        let (reader, handle) = CredentialManager::start(source, settings, signal).await;
        match reader.current() {
            Some(token) => info!("🔑️ Initial access token fetched at {}", token.fetched_at()),
            None => warn!("🔑️ No access token is available yet. Provider calls will fail until a refresh succeeds."),
        }
        Self { shutdown, reader, handle }
    }

    /// A handle on the most recent access token, for anything that calls the provider.
    pub fn reader(&self) -> CredentialReader {
        self.reader.clone()
    }

    /// Signals the worker to stop and waits for it to finish.
    pub async fn stop(self) -> Result<(), ServerError> {
        debug!("🔑️ Stopping access token refresh worker");
        // An error here means the worker has already exited
        let _ = self.shutdown.send(true);
        self.handle.await.map_err(|e| ServerError::Unspecified(format!("Token worker did not shut down cleanly. {e}")))
    }
}

#[cfg(test)]
mod test {
    use std::sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    };

    use mpesa_tools::{credentials::AccessToken, MpesaApiError};

    use super::*;

    #[derive(Clone, Default)]
    struct CountingSource {
        calls: Arc<AtomicUsize>,
    }

    impl AccessTokenSource for CountingSource {
        async fn fetch_access_token(&self) -> Result<AccessToken, MpesaApiError> {
            let n = self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(AccessToken::new(format!("token-{n}")))
        }
    }

    struct FailingSource;

    impl AccessTokenSource for FailingSource {
        async fn fetch_access_token(&self) -> Result<AccessToken, MpesaApiError> {
            Err(MpesaApiError::QueryError { status: 500, message: "unavailable".into() })
        }
    }

    #[tokio::test]
    async fn reader_sees_the_initial_token() {
        let _ = env_logger::try_init();
        let source = CountingSource::default();
        let worker = TokenWorker::start(source.clone(), &RefreshSettings::default()).await;
        let reader = worker.reader();
        assert_eq!(reader.current().expect("token fetched").token().reveal(), "token-0");
        worker.stop().await.expect("worker stops");
        assert_eq!(source.calls.load(Ordering::SeqCst), 1);
        assert_eq!(reader.current().expect("last token is kept").token().reveal(), "token-0");
    }

    #[tokio::test]
    async fn failed_first_fetch_does_not_block_start() {
        let worker = TokenWorker::start(FailingSource, &RefreshSettings::default()).await;
        assert!(worker.reader().current().is_none());
        worker.stop().await.expect("worker stops");
    }
}

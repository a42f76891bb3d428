//! Access token lifecycle.
//!
//! A single [`CredentialManager`] task owns the [`CredentialStore`] and is the only writer of the current access
//! token. Any number of [`CredentialReader`]s take consistent snapshots of it. The manager refreshes the token on a
//! fixed interval while the provider is healthy and switches to an exponential backoff while it is not. A failed
//! refresh never clears a token that was previously fetched.
use std::{future::Future, time::Duration};

use b2c_common::Secret;
use chrono::{DateTime, Utc};
use log::*;
use tokio::{sync::watch, task::JoinHandle};

use crate::MpesaApiError;

pub const DEFAULT_REFRESH_INTERVAL: Duration = Duration::from_secs(3000);
pub const DEFAULT_BACKOFF_INITIAL: Duration = Duration::from_secs(10);
pub const DEFAULT_BACKOFF_CEILING: Duration = Duration::from_secs(600);
pub const DEFAULT_REFRESH_TIMEOUT: Duration = Duration::from_secs(10);

//--------------------------------------     AccessToken     ---------------------------------------------------------
#[derive(Debug, Clone)]
pub struct AccessToken {
    token: Secret<String>,
    fetched_at: DateTime<Utc>,
}

impl AccessToken {
    pub fn new<S: Into<String>>(token: S) -> Self {
        Self { token: Secret::new(token.into()), fetched_at: Utc::now() }
    }

    pub fn token(&self) -> &Secret<String> {
        &self.token
    }

    pub fn fetched_at(&self) -> DateTime<Utc> {
        self.fetched_at
    }
}

/// Anything that can produce a fresh access token.
pub trait AccessTokenSource: Send + Sync + 'static {
    fn fetch_access_token(&self) -> impl Future<Output = Result<AccessToken, MpesaApiError>> + Send;
}

//--------------------------------------  Credential store   ---------------------------------------------------------
/// The writing half of the shared credential state.
pub struct CredentialStore {
    sender: watch::Sender<Option<AccessToken>>,
}

/// A cheap, cloneable handle for reading the current access token.
#[derive(Clone)]
pub struct CredentialReader {
    receiver: watch::Receiver<Option<AccessToken>>,
}

impl CredentialStore {
    pub fn new() -> (Self, CredentialReader) {
        let (sender, receiver) = watch::channel(None);
        (Self { sender }, CredentialReader { receiver })
    }

    pub fn replace(&self, token: AccessToken) {
        self.sender.send_replace(Some(token));
    }
}

impl CredentialReader {
    /// A snapshot of the most recently fetched token, or `None` if no refresh has ever succeeded.
    pub fn current(&self) -> Option<AccessToken> {
        self.receiver.borrow().clone()
    }
}

//--------------------------------------       Backoff       ---------------------------------------------------------
/// Exponential backoff. Every call to [`Backoff::next_delay`] returns the current delay and then doubles it, never
/// exceeding the ceiling.
#[derive(Debug, Clone)]
pub struct Backoff {
    initial: Duration,
    ceiling: Duration,
    current: Duration,
}

impl Backoff {
    pub fn new(initial: Duration, ceiling: Duration) -> Self {
        let ceiling = ceiling.max(initial);
        Self { initial, ceiling, current: initial }
    }

    pub fn next_delay(&mut self) -> Duration {
        let delay = self.current;
        self.current = self.current.saturating_mul(2).min(self.ceiling);
        delay
    }

    pub fn reset(&mut self) {
        self.current = self.initial;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshState {
    Healthy,
    Degraded { failures: u32 },
}

/// Decides how long to wait before the next refresh attempt, given the outcome of the last one.
#[derive(Debug, Clone)]
pub struct RefreshSchedule {
    interval: Duration,
    backoff: Backoff,
    state: RefreshState,
}

impl RefreshSchedule {
    pub fn new(interval: Duration, backoff: Backoff) -> Self {
        Self { interval, backoff, state: RefreshState::Healthy }
    }

    pub fn state(&self) -> RefreshState {
        self.state
    }

    pub fn on_success(&mut self) -> Duration {
        self.backoff.reset();
        self.state = RefreshState::Healthy;
        self.interval
    }

    pub fn on_failure(&mut self) -> Duration {
        let failures = match self.state {
            RefreshState::Healthy => 1,
            RefreshState::Degraded { failures } => failures.saturating_add(1),
        };
        self.state = RefreshState::Degraded { failures };
        self.backoff.next_delay()
    }
}

#[derive(Debug, Clone)]
pub struct RefreshSettings {
    pub interval: Duration,
    pub backoff_initial: Duration,
    pub backoff_ceiling: Duration,
    pub request_timeout: Duration,
}

impl Default for RefreshSettings {
    fn default() -> Self {
        Self {
            interval: DEFAULT_REFRESH_INTERVAL,
            backoff_initial: DEFAULT_BACKOFF_INITIAL,
            backoff_ceiling: DEFAULT_BACKOFF_CEILING,
            request_timeout: DEFAULT_REFRESH_TIMEOUT,
        }
    }
}

//--------------------------------------  CredentialManager  ---------------------------------------------------------
pub struct CredentialManager<S> {
    source: S,
    store: CredentialStore,
    schedule: RefreshSchedule,
    request_timeout: Duration,
}

impl<S> CredentialManager<S>
where S: AccessTokenSource
{
    pub fn new(source: S, store: CredentialStore, settings: &RefreshSettings) -> Self {
        let backoff = Backoff::new(settings.backoff_initial, settings.backoff_ceiling);
        let schedule = RefreshSchedule::new(settings.interval, backoff);
        Self { source, store, schedule, request_timeout: settings.request_timeout }
    }

    /// Fetches the first token, then hands the manager to a background task that keeps it fresh until `shutdown`
    /// is set (or its sender is dropped). A failed first fetch is not fatal: the task simply starts in the degraded
    /// state.
    pub async fn start(
        source: S,
        settings: &RefreshSettings,
        shutdown: watch::Receiver<bool>,
    ) -> (CredentialReader, JoinHandle<()>) {
        let (store, reader) = CredentialStore::new();
        let mut manager = Self::new(source, store, settings);
        let delay = manager.refresh_once().await;
        let handle = tokio::spawn(manager.run(delay, shutdown));
        (reader, handle)
    }

    pub fn state(&self) -> RefreshState {
        self.schedule.state()
    }

    /// Makes one refresh attempt and returns the delay until the next one.
    pub async fn refresh_once(&mut self) -> Duration {
        let timeout_secs = self.request_timeout.as_secs();
        let result = match tokio::time::timeout(self.request_timeout, self.source.fetch_access_token()).await {
            Ok(result) => result,
            Err(_) => Err(MpesaApiError::Timeout(timeout_secs)),
        };
        match result {
            Ok(token) => {
                self.store.replace(token);
                let delay = self.schedule.on_success();
                info!("🔑️ Access token refreshed. Next refresh in {}s", delay.as_secs());
                delay
            },
            Err(e) => {
                let delay = self.schedule.on_failure();
                warn!("🔑️ Could not refresh access token: {e}. Retrying in {}s", delay.as_secs());
                delay
            },
        }
    }

    async fn run(mut self, mut delay: Duration, mut shutdown: watch::Receiver<bool>) {
        info!("🔑️ Access token refresh worker started");
        loop {
            if *shutdown.borrow() {
                break;
            }
            tokio::select! {
                _ = tokio::time::sleep(delay) => {
                    delay = self.refresh_once().await;
                },
                changed = shutdown.changed() => {
                    if changed.is_err() {
                        debug!("🔑️ Shutdown signal dropped");
                        break;
                    }
                },
            }
        }
        info!("🔑️ Access token refresh worker stopped");
    }
}

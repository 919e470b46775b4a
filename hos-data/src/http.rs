//! Blocking bridge over the async HTTP client shared by the providers.
//!
//! The collaborator traits in `hos-core` are synchronous so the planner can
//! be embedded anywhere. [`BlockingHttp`] owns a `reqwest` client and a
//! current-thread Tokio runtime and drives each request to completion,
//! abandoning it as soon as the caller's [`Deadline`] expires or is
//! cancelled.

use std::future::Future;
use std::time::Duration;

use hos_core::{Deadline, Interrupted};
use reqwest::Client;
use tokio::runtime::{Handle, Runtime, RuntimeFlavor};
use url::Url;

/// How often an in-flight request re-checks its deadline.
const DEADLINE_POLL: Duration = Duration::from_millis(50);

/// Error type for provider construction failures.
#[derive(Debug)]
pub enum ProviderBuildError {
    /// The configured base URL cannot be used.
    BaseUrl {
        /// URL as configured.
        url: String,
        /// Why it was rejected.
        reason: String,
    },
    /// Failed to build the HTTP client.
    HttpClient(reqwest::Error),
    /// Failed to build the Tokio runtime.
    Runtime(std::io::Error),
}

impl std::fmt::Display for ProviderBuildError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::BaseUrl { url, reason } => write!(f, "invalid base URL {url:?}: {reason}"),
            Self::HttpClient(err) => write!(f, "failed to build HTTP client: {err}"),
            Self::Runtime(err) => write!(f, "failed to build Tokio runtime: {err}"),
        }
    }
}

impl std::error::Error for ProviderBuildError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::BaseUrl { .. } => None,
            Self::HttpClient(err) => Some(err),
            Self::Runtime(err) => Some(err),
        }
    }
}

/// Parse a service base URL, rejecting forms that cannot carry a path.
pub(crate) fn parse_base_url(raw: &str) -> Result<Url, ProviderBuildError> {
    let url = Url::parse(raw).map_err(|err| ProviderBuildError::BaseUrl {
        url: raw.to_owned(),
        reason: err.to_string(),
    })?;
    if url.cannot_be_a_base() {
        return Err(ProviderBuildError::BaseUrl {
            url: raw.to_owned(),
            reason: "URL cannot carry a path".to_owned(),
        });
    }
    Ok(url)
}

/// Coarse classification of a failed `reqwest` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum RequestFailure {
    Timeout,
    Status(u16),
    Network,
}

impl RequestFailure {
    pub(crate) fn of(error: &reqwest::Error) -> Self {
        if error.is_timeout() {
            return Self::Timeout;
        }
        error
            .status()
            .map_or(Self::Network, |status| Self::Status(status.as_u16()))
    }
}

/// HTTP client plus the runtime that drives it.
///
/// # Runtime behaviour
///
/// Outside any Tokio runtime the stored current-thread runtime is used.
/// Inside a multi-threaded runtime the ambient handle is used with
/// [`tokio::task::block_in_place`] to avoid nested runtime panics. Inside a
/// `current_thread` runtime the stored runtime is used, which may deadlock
/// if the caller's runtime is driving I/O this request depends on.
pub(crate) struct BlockingHttp {
    client: Client,
    runtime: Runtime,
}

impl std::fmt::Debug for BlockingHttp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BlockingHttp")
            .field("client", &self.client)
            .field("runtime", &"<tokio::runtime::Runtime>")
            .finish()
    }
}

impl BlockingHttp {
    pub(crate) fn new(user_agent: &str, timeout: Duration) -> Result<Self, ProviderBuildError> {
        let client = Client::builder()
            .user_agent(user_agent)
            .connect_timeout(timeout)
            .timeout(timeout)
            .build()
            .map_err(ProviderBuildError::HttpClient)?;
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(ProviderBuildError::Runtime)?;
        Ok(Self { client, runtime })
    }

    pub(crate) const fn client(&self) -> &Client {
        &self.client
    }

    /// Block on `request`, abandoning it once `deadline` is interrupted.
    pub(crate) fn run<F: Future>(
        &self,
        deadline: &Deadline,
        request: F,
    ) -> Result<F::Output, Interrupted> {
        let guarded = async {
            tokio::select! {
                output = request => Ok(output),
                reason = interrupted(deadline) => Err(reason),
            }
        };
        match Handle::try_current() {
            Ok(handle) if handle.runtime_flavor() == RuntimeFlavor::MultiThread => {
                tokio::task::block_in_place(|| handle.block_on(guarded))
            }
            _ => self.runtime.block_on(guarded),
        }
    }
}

async fn interrupted(deadline: &Deadline) -> Interrupted {
    loop {
        if let Err(reason) = deadline.check() {
            return reason;
        }
        tokio::time::sleep(DEADLINE_POLL).await;
    }
}

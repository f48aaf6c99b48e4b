//! HTTP client for tap-on notifications.
//!
//! Each tap on produces exactly one POST to the configured endpoint. The
//! outcome is classified and logged here; nothing is returned to the caller
//! as an error.
//!
//! # Architecture
//!
//! ```text
//! TapSessionMachine
//!     │
//!     └─> NotificationClient ───(HTTP POST)───> Endpoint
//!             │
//!             └─> DispatchOutcome::{Delivered, Rejected, Unreachable}
//! ```
//!
//! # Design Principles
//!
//! - **No automatic retry**: one attempt per tap on
//! - **Bounded**: every request is limited by the configured timeout
//! - **Terminal errors**: failures end here as log events, never as `Err`
//!
//! # Example Usage
//!
//! ```no_run
//! use lensreader_core::TagId;
//! use lensreader_network::{NotificationClient, NotificationConfig, ReaderIdentity};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = NotificationConfig::new("http://xos.local/api/taps/")
//!     .auth_token("secret")
//!     .label(Some("gallery-1".to_string()));
//!
//! let client = NotificationClient::new(config, ReaderIdentity::default())?;
//! let outcome = client.notify_tap_on(&TagId::new("04a52cf22a5e80")?).await;
//! println!("{outcome}");
//! # Ok(())
//! # }
//! ```

use crate::payload::{ReaderIdentity, TapPayload};
use chrono::Local;
use lensreader_core::TagId;
use lensreader_core::constants::{AUTH_SCHEME, DEFAULT_ENDPOINT_URL, DEFAULT_REQUEST_TIMEOUT_MS};
use reqwest::header::AUTHORIZATION;
use reqwest::{StatusCode, Url};
use std::fmt;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, error, info, warn};

/// Configuration for the notification client.
///
/// # Example
///
/// ```
/// use lensreader_network::NotificationConfig;
/// use std::time::Duration;
///
/// let config = NotificationConfig::default()
///     .timeout(Duration::from_secs(3));
/// assert_eq!(config.endpoint_url, "http://localhost:8888");
/// ```
#[derive(Debug, Clone)]
pub struct NotificationConfig {
    /// Endpoint receiving tap notifications
    pub endpoint_url: String,

    /// Static token sent in the `Authorization` header
    pub auth_token: String,

    /// Label included in every notification
    pub label: Option<String>,

    /// Bound on a single request, connect included
    pub timeout: Duration,
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self {
            endpoint_url: DEFAULT_ENDPOINT_URL.to_string(),
            auth_token: String::new(),
            label: None,
            timeout: Duration::from_millis(DEFAULT_REQUEST_TIMEOUT_MS),
        }
    }
}

impl NotificationConfig {
    /// Create a configuration for the given endpoint
    pub fn new(endpoint_url: impl Into<String>) -> Self {
        Self {
            endpoint_url: endpoint_url.into(),
            ..Default::default()
        }
    }

    /// Set the authorization token
    pub fn auth_token(mut self, token: impl Into<String>) -> Self {
        self.auth_token = token.into();
        self
    }

    /// Set the reader label
    pub fn label(mut self, label: Option<String>) -> Self {
        self.label = label;
        self
    }

    /// Set the request timeout
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// Errors that can occur while constructing a notification client
#[derive(Debug, Error)]
pub enum NotifyError {
    /// Endpoint URL could not be parsed
    #[error("Invalid endpoint URL {url}: {message}")]
    InvalidUrl { url: String, message: String },

    /// Configuration value is unusable
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// HTTP client could not be built
    #[error("HTTP client error: {0}")]
    Client(#[from] reqwest::Error),
}

/// Result of a single notification attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// The endpoint acknowledged creation (HTTP 201).
    Delivered,

    /// The endpoint answered with any other status.
    Rejected {
        /// HTTP status code
        status: u16,
        /// Response body
        message: String,
    },

    /// The request never got an answer (connect, DNS, timeout).
    Unreachable(String),
}

impl DispatchOutcome {
    /// Whether the notification was accepted.
    pub fn is_delivered(&self) -> bool {
        matches!(self, Self::Delivered)
    }
}

impl fmt::Display for DispatchOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Delivered => write!(f, "delivered"),
            Self::Rejected { status, message } => write!(f, "rejected ({status}): {message}"),
            Self::Unreachable(error) => write!(f, "unreachable: {error}"),
        }
    }
}

/// HTTP client for tap-on notifications.
#[derive(Debug, Clone)]
pub struct NotificationClient {
    http: reqwest::Client,
    endpoint: Url,
    auth_header: String,
    label: Option<String>,
    identity: ReaderIdentity,
}

impl NotificationClient {
    /// Create a client for the configured endpoint.
    ///
    /// # Errors
    ///
    /// Returns an error if the endpoint URL is invalid, the timeout is zero,
    /// or the HTTP client cannot be initialized.
    pub fn new(config: NotificationConfig, identity: ReaderIdentity) -> Result<Self, NotifyError> {
        let endpoint = Url::parse(&config.endpoint_url).map_err(|e| NotifyError::InvalidUrl {
            url: config.endpoint_url.clone(),
            message: e.to_string(),
        })?;

        if config.timeout.is_zero() {
            return Err(NotifyError::Configuration(
                "request timeout must be non-zero".to_string(),
            ));
        }

        if config.auth_token.is_empty() {
            warn!("No auth token configured, notifications will likely be rejected");
        }

        let http = reqwest::Client::builder().timeout(config.timeout).build()?;

        Ok(Self {
            http,
            endpoint,
            auth_header: format!("{AUTH_SCHEME} {}", config.auth_token),
            label: config.label,
            identity,
        })
    }

    /// Endpoint receiving notifications.
    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// Identity reported with each notification.
    pub fn identity(&self) -> &ReaderIdentity {
        &self.identity
    }

    /// Build the notification body for `id`, stamped with the current local
    /// time.
    pub fn payload(&self, id: &TagId) -> TapPayload {
        TapPayload::new(id, Local::now(), self.label.as_deref(), &self.identity)
    }

    /// Send one tap-on notification and classify the outcome.
    ///
    /// Rejections and transport failures are logged and reported here; the
    /// returned outcome is informational.
    pub async fn notify_tap_on(&self, id: &TagId) -> DispatchOutcome {
        let payload = self.payload(id);
        debug!(tag = %id, endpoint = %self.endpoint, "Posting tap");

        let response = self
            .http
            .post(self.endpoint.clone())
            .header(AUTHORIZATION, &self.auth_header)
            .json(&payload)
            .send()
            .await;

        let response = match response {
            Ok(response) => response,
            Err(e) => {
                error!(
                    report = "exception",
                    tag = %id,
                    endpoint = %self.endpoint,
                    error = %e,
                    "Failed to post tap message"
                );
                return DispatchOutcome::Unreachable(e.to_string());
            }
        };

        let status = response.status();
        let body = match response.text().await {
            Ok(body) => body,
            Err(e) => {
                debug!(error = %e, "Failed to read notification response body");
                String::new()
            }
        };

        if status == StatusCode::CREATED {
            info!(tag = %id, response = %body, "Tap delivered");
            DispatchOutcome::Delivered
        } else {
            warn!(tag = %id, status = status.as_u16(), response = %body, "Tap rejected");
            error!(report = "message", status = status.as_u16(), "{body}");
            DispatchOutcome::Rejected {
                status: status.as_u16(),
                message: body,
            }
        }
    }
}

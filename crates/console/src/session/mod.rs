//! Session lifecycle and the privileged transport path.
//!
//! The session manager owns the one live session per process: the bearer
//! credential and the authenticated principal, set and cleared together as a
//! single transaction and mirrored to a durable store. Every outbound
//! request the console makes - including the manager's own auth exchanges -
//! passes through [`SessionManager::decorate`], which is the single
//! enforcement point for "privileged calls always carry current
//! credentials".
//!
//! Two states only: `Anonymous` and `Authenticated`. Login or registration
//! acceptance moves forward; logout or a credential rejection on any
//! privileged call moves back. There is no refresh state - the backend hands
//! out one long-lived token.

pub mod store;

use std::sync::Arc;

use reqwest::{RequestBuilder, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tracing::{info, instrument, warn};
use url::Url;

use terra_core::AdminRole;

use crate::config::ConsoleConfig;
use crate::error::ApiError;

use self::store::{PersistedSession, SessionStore};

/// Timeout applied to every backend call.
const REQUEST_TIMEOUT: std::time::Duration = std::time::Duration::from_secs(30);

/// Minimum password length accepted at registration.
const MIN_PASSWORD_LENGTH: usize = 6;

/// The authenticated identity record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
    /// Login name of the admin account.
    pub username: String,
    /// Permission level.
    pub role: AdminRole,
}

/// A live session: credential and principal as one unit.
///
/// Both fields live in one struct inside one `Option` slot, so
/// "authenticated without a credential" (or the reverse) cannot be
/// represented, let alone observed mid-transition.
#[derive(Clone)]
pub struct Session {
    credential: SecretString,
    principal: Principal,
}

impl Session {
    /// The authenticated identity.
    #[must_use]
    pub const fn principal(&self) -> &Principal {
        &self.principal
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("credential", &"[REDACTED]")
            .field("principal", &self.principal)
            .finish()
    }
}

/// Outcome of a login or registration exchange.
///
/// A rejected credential is an expected, reportable outcome - not an error.
/// Only transport-level failure surfaces as [`ApiError`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthOutcome {
    /// The backend accepted the exchange; the session is installed.
    Granted,
    /// The backend rejected the exchange.
    Rejected {
        /// Backend-supplied reason, or a generic fallback.
        message: String,
    },
}

impl AuthOutcome {
    /// Whether the exchange produced a session.
    #[must_use]
    pub const fn is_granted(&self) -> bool {
        matches!(self, Self::Granted)
    }
}

/// Request body for `POST /auth/login`.
#[derive(Serialize)]
struct LoginRequest<'a> {
    username: &'a str,
    password: &'a str,
}

/// Request body for `POST /auth/register`.
#[derive(Serialize)]
struct RegisterRequest<'a> {
    username: &'a str,
    email: &'a str,
    password: &'a str,
}

/// Response envelope of both auth endpoints.
#[derive(Default, Deserialize)]
struct AuthResponse {
    #[serde(default)]
    success: bool,
    #[serde(default)]
    token: Option<String>,
    #[serde(default)]
    admin: Option<Principal>,
    #[serde(default)]
    message: Option<String>,
}

/// Error payload the backend attaches to rejected requests.
#[derive(Default, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: Option<String>,
}

/// Session manager: one live session per process, durable across restarts.
#[derive(Clone)]
pub struct SessionManager {
    inner: Arc<SessionManagerInner>,
}

struct SessionManagerInner {
    client: reqwest::Client,
    base: Url,
    store: SessionStore,
    session: RwLock<Option<Session>>,
}

impl SessionManager {
    /// Open the session manager, restoring any persisted session.
    ///
    /// The durable store is read exactly once, here. A missing or corrupt
    /// record starts the console anonymous.
    ///
    /// # Panics
    ///
    /// Panics if the HTTP client cannot be created. This should never happen
    /// under normal circumstances as we use standard TLS configuration.
    pub async fn open(config: &ConsoleConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .expect("Failed to create HTTP client");

        let store = SessionStore::new(config.session_file());
        let session = store.load().await.map(|record| Session {
            credential: SecretString::from(record.credential),
            principal: record.principal,
        });

        Self {
            inner: Arc::new(SessionManagerInner {
                client,
                base: config.api_url.clone(),
                store,
                session: RwLock::new(session),
            }),
        }
    }

    // =========================================================================
    // Authentication
    // =========================================================================

    /// Exchange username and password for a session.
    ///
    /// Backend acceptance installs credential and principal atomically and
    /// persists them. Rejection is reported as [`AuthOutcome::Rejected`]
    /// with the backend's message, never as an error.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Transport`] when the backend cannot be reached
    /// and [`ApiError::Response`] when an acceptance body cannot be decoded.
    #[instrument(skip(self, password), fields(username = %username))]
    pub async fn login(&self, username: &str, password: &str) -> Result<AuthOutcome, ApiError> {
        let request = self
            .decorate(self.inner.client.post(self.endpoint("auth/login")))
            .await
            .json(&LoginRequest { username, password });

        self.exchange(request).await
    }

    /// Register the first administrator account.
    ///
    /// Same contract as [`login`](Self::login). The backend enforces that
    /// registration is only open while no administrator exists; this
    /// component does not.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Validation`] for a password shorter than 6
    /// characters (checked locally, no network call), otherwise as
    /// [`login`](Self::login).
    #[instrument(skip(self, password), fields(username = %username))]
    pub async fn register(
        &self,
        username: &str,
        email: &str,
        password: &str,
    ) -> Result<AuthOutcome, ApiError> {
        if password.len() < MIN_PASSWORD_LENGTH {
            return Err(ApiError::Validation(format!(
                "password must be at least {MIN_PASSWORD_LENGTH} characters"
            )));
        }

        let request = self
            .decorate(self.inner.client.post(self.endpoint("auth/register")))
            .await
            .json(&RegisterRequest {
                username,
                email,
                password,
            });

        self.exchange(request).await
    }

    /// Run an auth exchange and install the session on acceptance.
    async fn exchange(&self, request: RequestBuilder) -> Result<AuthOutcome, ApiError> {
        let response = request.send().await.map_err(ApiError::from)?;
        let status = response.status();

        if status.is_success() {
            let body: AuthResponse = response.json().await.map_err(ApiError::from)?;
            if body.success
                && let (Some(token), Some(admin)) = (body.token, body.admin)
            {
                self.install(token, admin).await;
                info!("Session established");
                return Ok(AuthOutcome::Granted);
            }

            return Ok(AuthOutcome::Rejected {
                message: body
                    .message
                    .unwrap_or_else(|| "Invalid credentials".to_owned()),
            });
        }

        // Rejected exchanges come back as 4xx carrying the same envelope.
        let body: AuthResponse = response.json().await.unwrap_or_default();
        Ok(AuthOutcome::Rejected {
            message: body
                .message
                .unwrap_or_else(|| format!("Authentication rejected (HTTP {status})")),
        })
    }

    /// Install a new session and persist it, as one transaction.
    async fn install(&self, token: String, principal: Principal) {
        let session = Session {
            credential: SecretString::from(token.clone()),
            principal: principal.clone(),
        };
        *self.inner.session.write().await = Some(session);
        self.inner
            .store
            .save(&PersistedSession {
                credential: token,
                principal,
            })
            .await;
    }

    /// Drop the live session and its durable record.
    ///
    /// No network call is made; this cannot fail.
    #[instrument(skip(self))]
    pub async fn logout(&self) {
        self.clear().await;
        info!("Signed out");
    }

    /// The clearing transaction shared by logout and forced sign-out.
    async fn clear(&self) {
        *self.inner.session.write().await = None;
        self.inner.store.clear().await;
    }

    // =========================================================================
    // Session state
    // =========================================================================

    /// Whether a live session exists.
    pub async fn is_authenticated(&self) -> bool {
        self.inner.session.read().await.is_some()
    }

    /// The authenticated principal, if any.
    pub async fn principal(&self) -> Option<Principal> {
        self.inner
            .session
            .read()
            .await
            .as_ref()
            .map(|session| session.principal.clone())
    }

    // =========================================================================
    // Transport
    // =========================================================================

    /// Attach the current credential to an outbound request.
    ///
    /// Identity when anonymous. Every request the console issues passes
    /// through here; there is no other path to the backend and no opt-out.
    pub async fn decorate(&self, request: RequestBuilder) -> RequestBuilder {
        match self.inner.session.read().await.as_ref() {
            Some(session) => request.bearer_auth(session.credential.expose_secret()),
            None => request,
        }
    }

    /// Issue a privileged request and map the response classes.
    ///
    /// A 401 answer means the credential is dead: the session is cleared
    /// through the same transaction as [`logout`](Self::logout) before the
    /// error surfaces, so the credential is never retried.
    ///
    /// # Errors
    ///
    /// [`ApiError::Transport`] when the backend is unreachable,
    /// [`ApiError::Unauthorized`] on a rejected credential,
    /// [`ApiError::Rejected`] for any other non-success answer.
    pub(crate) async fn send(&self, request: RequestBuilder) -> Result<reqwest::Response, ApiError> {
        let response = self
            .decorate(request)
            .await
            .send()
            .await
            .map_err(ApiError::from)?;
        let status = response.status();

        if status == StatusCode::UNAUTHORIZED {
            warn!("Credential rejected by the backend, clearing session");
            self.clear().await;
            return Err(ApiError::Unauthorized);
        }

        if !status.is_success() {
            let body: ErrorBody = response.json().await.unwrap_or_default();
            return Err(ApiError::Rejected(
                body.message.unwrap_or_else(|| format!("HTTP {status}")),
            ));
        }

        Ok(response)
    }

    /// HTTP client shared by all console components.
    pub(crate) fn http(&self) -> &reqwest::Client {
        &self.inner.client
    }

    /// Absolute URL for a backend path.
    pub(crate) fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.inner.base.as_str().trim_end_matches('/'), path)
    }
}

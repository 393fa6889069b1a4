//! Session controller: the authentication state machine and friends retrieval.
//!
//! The controller is the single writer of three observable values (session
//! state, friends collection, loading flag), each published through a
//! `tokio::sync::watch` channel. Presentation layers subscribe via the
//! receivers: `borrow()` reads the latest value synchronously, `changed()`
//! awaits the next transition.

use tokio::sync::watch;
use tracing::{debug, warn};

use crate::api::{ApiErrorKind, ApiResult, CurrentUser, Friend, VrchatClient};

/// Friends requested per fetch, offline entries included.
const FRIENDS_PAGE_LIMIT: u32 = 100;

/// Authentication session state.
///
/// Exactly one value is active at a time, and [`SessionController`]
/// operations are the only way to change it.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionState {
    /// No login attempt yet (or back here via `reset`)
    Idle,
    /// A login or verification call is in flight
    Authenticating,
    /// Login wants the code sent to the account's email
    RequiresEmailVerification,
    /// Login wants a code from the authenticator app
    RequiresTwoFactorVerification,
    /// Identity confirmed
    Authenticated(CurrentUser),
    /// Terminal failure for this attempt; the message is displayable
    Failed(String),
}

/// Drives the login flow and owns the observable session values.
pub struct SessionController {
    client: VrchatClient,
    state: watch::Sender<SessionState>,
    friends: watch::Sender<Vec<Friend>>,
    friends_loading: watch::Sender<bool>,
}

impl SessionController {
    pub fn new(client: VrchatClient) -> Self {
        Self {
            client,
            state: watch::Sender::new(SessionState::Idle),
            friends: watch::Sender::new(Vec::new()),
            friends_loading: watch::Sender::new(false),
        }
    }

    /// Subscribes to session state changes.
    pub fn state(&self) -> watch::Receiver<SessionState> {
        self.state.subscribe()
    }

    /// Subscribes to the friends collection.
    pub fn friends(&self) -> watch::Receiver<Vec<Friend>> {
        self.friends.subscribe()
    }

    /// Subscribes to the friends-fetch loading flag.
    pub fn friends_loading(&self) -> watch::Receiver<bool> {
        self.friends_loading.subscribe()
    }

    /// The underlying API client, for asset fetches (avatar images) that
    /// must share this session's cookies.
    pub fn client(&self) -> &VrchatClient {
        &self.client
    }

    /// Attempts a credential login.
    ///
    /// One round trip; on success the friends list is fetched before this
    /// returns. The credentials are borrowed for the request and not kept.
    /// Overlapping calls are not guarded: the later write wins.
    pub async fn submit(&self, username: &str, password: &str) {
        self.state.send_replace(SessionState::Authenticating);
        match self.client.login(username, password).await {
            Ok(user) => self.complete_login(user).await,
            Err(err) => {
                let next = match err.kind {
                    ApiErrorKind::EmailOtpRequired => SessionState::RequiresEmailVerification,
                    ApiErrorKind::TotpRequired => SessionState::RequiresTwoFactorVerification,
                    _ => SessionState::Failed(err.message),
                };
                self.state.send_replace(next);
            }
        }
    }

    /// Submits the code sent to the account's email.
    ///
    /// Verify, then re-fetch the current user (two round trips). Unlike
    /// `submit`, every failure here is terminal.
    pub async fn submit_otp(&self, code: &str) {
        self.state.send_replace(SessionState::Authenticating);
        let verified = self.client.verify_email_otp(code).await;
        self.complete_verification(verified).await;
    }

    /// Submits a code from the authenticator app.
    pub async fn submit_totp(&self, code: &str) {
        self.state.send_replace(SessionState::Authenticating);
        let verified = self.client.verify_totp(code).await;
        self.complete_verification(verified).await;
    }

    async fn complete_verification(&self, verified: ApiResult<()>) {
        let user = match verified {
            Ok(()) => self.client.current_user().await,
            Err(err) => Err(err),
        };
        match user {
            Ok(user) => self.complete_login(user).await,
            Err(err) => {
                self.state.send_replace(SessionState::Failed(err.message));
            }
        }
    }

    async fn complete_login(&self, user: CurrentUser) {
        debug!(user_id = %user.id, "authenticated");
        self.state.send_replace(SessionState::Authenticated(user));
        self.load_friends().await;
    }

    /// Refreshes the friends collection (one fetch, offline included).
    ///
    /// A failed fetch degrades to an empty list; no error reaches the
    /// presentation layer. The loading flag clears either way.
    pub async fn load_friends(&self) {
        self.friends_loading.send_replace(true);
        match self.client.list_friends(0, FRIENDS_PAGE_LIMIT, true).await {
            Ok(friends) => {
                debug!(count = friends.len(), "friends loaded");
                self.friends.send_replace(friends);
            }
            Err(err) => {
                warn!(error = %err, "friends fetch failed");
                self.friends.send_replace(Vec::new());
            }
        }
        self.friends_loading.send_replace(false);
    }

    /// Returns to [`SessionState::Idle`] and clears the friends list.
    ///
    /// Used for back-navigation out of the verification prompts; valid
    /// from any state.
    pub fn reset(&self) {
        self.state.send_replace(SessionState::Idle);
        self.friends.send_replace(Vec::new());
    }
}

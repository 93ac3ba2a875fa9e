//! Session lifecycle state machine.
//!
//! One `SessionManager` owns the process's single live session: the access
//! token, the decrypted vault key, and the timers that supervise them. The
//! transition logic is a pure function from `(phase, event)` to
//! `(phase, effects)`; the manager executes the effects (timer start/stop,
//! secret wiping, notifications) around it.
//!
//! Teardown — logout, token expiry, or an unauthorized response from the
//! API — always runs the same sequence: cancel timers, drop the vault key
//! (which zeroizes its bytes), clear the token and identity. A stale timer
//! can never observe secret state because cancelling the timers and wiping
//! the secrets happen under the same lock.

use crate::auth::LoginSuccess;
use crate::config::ClientConfig;
use crate::token;
use crate::types::UserInfo;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{watch, RwLock};
use tokio::task::JoinHandle;
use tracing::debug;
use vigil_crypto::VaultKey;

/// Observable session phase.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionPhase {
    Unauthenticated,
    Authenticated,
    /// Close enough to expiry that the user should re-enter the password.
    ReauthPending,
    /// Transient: teardown runs on entry and the phase settles at
    /// `Unauthenticated`. Observable only through notices.
    Expired,
}

/// Inputs to the transition function.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum SessionEvent {
    LoginSucceeded,
    ReauthDeadline,
    ReauthCompleted,
    ExpiryDeadline,
    Logout,
    Unauthorized,
}

/// Side effects the manager must perform for a transition.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Effect {
    CancelTimers,
    ZeroizeSecrets,
    StartTimers,
    NotifyReauth,
    NotifyExpired,
}

use Effect::*;

/// Pure transition core. No I/O, no clocks — deadline events arrive from
/// the timers the effects requested.
fn transition(phase: SessionPhase, event: SessionEvent) -> (SessionPhase, &'static [Effect]) {
    use SessionEvent::*;
    use SessionPhase::*;

    match (phase, event) {
        // A new login replaces whatever was there; the prior vault key is
        // wiped, not merely dropped from view.
        (_, LoginSucceeded) => (Authenticated, &[CancelTimers, ZeroizeSecrets, StartTimers]),

        (Authenticated, ReauthDeadline) => (ReauthPending, &[NotifyReauth]),
        // One prompt per expiry cycle.
        (ReauthPending, ReauthDeadline) => (ReauthPending, &[]),

        (Authenticated | ReauthPending, ReauthCompleted) => {
            (Authenticated, &[CancelTimers, ZeroizeSecrets, StartTimers])
        }

        (Authenticated | ReauthPending, ExpiryDeadline) => {
            (Expired, &[CancelTimers, ZeroizeSecrets, NotifyExpired])
        }

        (_, Logout) | (_, Unauthorized) => (Unauthenticated, &[CancelTimers, ZeroizeSecrets]),

        // Expired settles immediately; nothing else to do.
        (Expired, _) => (Unauthenticated, &[]),

        // Stale deadline or reauth for a session that no longer exists.
        (Unauthenticated, ReauthDeadline | ReauthCompleted | ExpiryDeadline) => {
            (Unauthenticated, &[])
        }
    }
}

/// Snapshot published to subscribers (UI) on every state change and on
/// each countdown tick.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SessionNotice {
    pub phase: SessionPhase,
    /// Milliseconds until token expiry, when known. Display only.
    pub time_left_ms: Option<i64>,
    /// True exactly once per expiry cycle, on the notice that asks for
    /// the password again.
    pub reauth_required: bool,
    /// True on the notice generated by expiry teardown.
    pub expired: bool,
}

impl SessionNotice {
    fn idle() -> Self {
        Self {
            phase: SessionPhase::Unauthenticated,
            time_left_ms: None,
            reauth_required: false,
            expired: false,
        }
    }
}

struct SessionInner {
    phase: SessionPhase,
    access_token: Option<String>,
    expires_at: Option<DateTime<Utc>>,
    vault_key: Option<VaultKey>,
    user: Option<UserInfo>,
    reauth_prompted: bool,
    timers: Vec<JoinHandle<()>>,
}

/// Single owner of the client's session state. Cheap to clone; clones
/// share the same session.
#[derive(Clone)]
pub struct SessionManager {
    inner: Arc<RwLock<SessionInner>>,
    config: ClientConfig,
    notify: watch::Sender<SessionNotice>,
}

impl SessionManager {
    pub fn new(config: ClientConfig) -> Self {
        let (notify, _) = watch::channel(SessionNotice::idle());
        Self {
            inner: Arc::new(RwLock::new(SessionInner {
                phase: SessionPhase::Unauthenticated,
                access_token: None,
                expires_at: None,
                vault_key: None,
                user: None,
                reauth_prompted: false,
                timers: Vec::new(),
            })),
            config,
            notify,
        }
    }

    /// Installs a fresh session after a successful login. Any prior
    /// session is torn down first (timers cancelled, vault key wiped).
    pub async fn establish(&self, login: LoginSuccess) {
        let mut inner = self.inner.write().await;
        self.apply_locked(&mut inner, SessionEvent::LoginSucceeded, Some(login));
    }

    /// Refreshes the session after the user re-entered the password. The
    /// prompt flag resets and the timers restart against the new token.
    pub async fn complete_reauth(&self, login: LoginSuccess) {
        let mut inner = self.inner.write().await;
        self.apply_locked(&mut inner, SessionEvent::ReauthCompleted, Some(login));
    }

    /// Explicit logout: same teardown as expiry.
    pub async fn logout(&self) {
        let mut inner = self.inner.write().await;
        self.apply_locked(&mut inner, SessionEvent::Logout, None);
    }

    /// Teardown on an unauthorized response observed at the API boundary.
    pub async fn handle_unauthorized(&self) {
        let mut inner = self.inner.write().await;
        self.apply_locked(&mut inner, SessionEvent::Unauthorized, None);
    }

    /// Returns a hook suitable for [`crate::api::HttpAuthApi::on_unauthorized`].
    pub fn unauthorized_hook(&self) -> impl Fn() + Send + Sync + 'static {
        let mgr = self.clone();
        move || {
            let mgr = mgr.clone();
            tokio::spawn(async move { mgr.handle_unauthorized().await });
        }
    }

    pub async fn phase(&self) -> SessionPhase {
        self.inner.read().await.phase
    }

    /// The bearer token for the network layer, when a session is live.
    pub async fn access_token(&self) -> Option<String> {
        self.inner.read().await.access_token.clone()
    }

    pub async fn user(&self) -> Option<UserInfo> {
        self.inner.read().await.user.clone()
    }

    /// Milliseconds until token expiry. UI countdown only; teardown runs
    /// off its own deadline timer.
    pub async fn time_left_ms(&self) -> Option<i64> {
        let inner = self.inner.read().await;
        inner
            .expires_at
            .map(|at| (at - Utc::now()).num_milliseconds().max(0))
    }

    /// Borrows the vault key for the duration of one cipher call. The key
    /// never leaves the session's ownership.
    pub async fn with_vault_key<R>(&self, f: impl FnOnce(&VaultKey) -> R) -> Option<R> {
        let inner = self.inner.read().await;
        inner.vault_key.as_ref().map(f)
    }

    /// Subscribes to session notices (phase changes, countdown ticks).
    pub fn subscribe(&self) -> watch::Receiver<SessionNotice> {
        self.notify.subscribe()
    }

    async fn apply(&self, event: SessionEvent) {
        let mut inner = self.inner.write().await;
        self.apply_locked(&mut inner, event, None);
    }

    /// Runs one transition and its effects under the write lock. Fully
    /// synchronous once the lock is held, so a timer task aborting itself
    /// via `CancelTimers` still completes the teardown it started.
    fn apply_locked(
        &self,
        inner: &mut SessionInner,
        event: SessionEvent,
        mut fresh: Option<LoginSuccess>,
    ) {
        let (next, effects) = transition(inner.phase, event);
        debug!(?event, from = ?inner.phase, to = ?next, "session transition");
        inner.phase = next;

        let mut reauth_notice = false;
        let mut expired_notice = false;

        for effect in effects {
            match effect {
                CancelTimers => {
                    for timer in inner.timers.drain(..) {
                        timer.abort();
                    }
                }
                ZeroizeSecrets => {
                    // VaultKey is ZeroizeOnDrop: replacing the Option
                    // wipes the key bytes before the memory is released.
                    inner.vault_key = None;
                    inner.access_token = None;
                    inner.expires_at = None;
                    inner.user = None;
                }
                StartTimers => {
                    if let Some(login) = fresh.take() {
                        inner.expires_at = token::decode_expiry(&login.access_token);
                        inner.access_token = Some(login.access_token);
                        inner.vault_key = Some(login.vault_key);
                        inner.user = Some(login.user);
                        inner.reauth_prompted = false;
                    }
                    match inner.expires_at {
                        Some(expires_at) => self.spawn_timers(inner, expires_at),
                        None => debug!(
                            "token has no decodable expiry; session will not auto-expire client-side"
                        ),
                    }
                }
                NotifyReauth => {
                    if !inner.reauth_prompted {
                        inner.reauth_prompted = true;
                        reauth_notice = true;
                    }
                }
                NotifyExpired => expired_notice = true,
            }
        }

        // Expired is transient: no secret state remains, settle.
        if inner.phase == SessionPhase::Expired {
            inner.phase = SessionPhase::Unauthenticated;
        }

        self.publish(inner, reauth_notice, expired_notice);
    }

    fn spawn_timers(&self, inner: &mut SessionInner, expires_at: DateTime<Utc>) {
        let total_ms = (expires_at - Utc::now()).num_milliseconds();
        let expiry_ms = (total_ms - self.config.expiry_buffer_secs * 1000).max(0) as u64;
        let reauth_ms = (total_ms - self.config.reauth_threshold_secs * 1000).max(0) as u64;

        // Single deadline-based teardown timer.
        let mgr = self.clone();
        inner.timers.push(tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(expiry_ms)).await;
            mgr.apply(SessionEvent::ExpiryDeadline).await;
        }));

        // One-shot reauth prompt timer.
        let mgr = self.clone();
        inner.timers.push(tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(reauth_ms)).await;
            mgr.apply(SessionEvent::ReauthDeadline).await;
        }));

        // Countdown refresh for UI display. No security function.
        let mgr = self.clone();
        let period = Duration::from_secs(self.config.countdown_refresh_secs);
        inner.timers.push(tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            ticker.tick().await;
            loop {
                ticker.tick().await;
                mgr.publish_tick().await;
            }
        }));
    }

    async fn publish_tick(&self) {
        let inner = self.inner.read().await;
        if matches!(
            inner.phase,
            SessionPhase::Authenticated | SessionPhase::ReauthPending
        ) {
            self.publish(&inner, false, false);
        }
    }

    fn publish(&self, inner: &SessionInner, reauth_required: bool, expired: bool) {
        let time_left_ms = inner
            .expires_at
            .map(|at| (at - Utc::now()).num_milliseconds().max(0));
        self.notify.send_replace(SessionNotice {
            phase: inner.phase,
            time_left_ms,
            reauth_required,
            expired,
        });
    }
}

//! The console manager
//!
//! [`ConsoleManager`] is the coordination point UI layers talk to. It owns
//! the call-session view model, the session credentials, the adapter seam
//! and the backend client, and runs the event pump that reconciles
//! adapter-pushed events into renderable state.
//!
//! # Reconciliation model
//!
//! User intents (hang up, answer, refuse, logout) are forwarded to the
//! adapter and never mutate local state; the displayed state updates only
//! when the adapter pushes the resulting event back. Backend responses are
//! an error-surfacing side channel only - they never drive call state.
//! Adapter events may therefore arrive before, after, or interleaved with
//! backend responses, and the pump applies them regardless.
//!
//! # Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use leadcall_console_core::{
//!     adapter_event_channel, CallAdapter, ConsoleConfig, ConsoleManager,
//! };
//!
//! # async fn example(adapter: Arc<dyn CallAdapter>) -> Result<(), Box<dyn std::error::Error>> {
//! let (event_tx, event_rx) = adapter_event_channel();
//! // ... construct the SDK adapter with `event_tx` ...
//!
//! let config = ConsoleConfig::new("http://127.0.0.1:3000");
//! let manager = ConsoleManager::new(config, adapter)?;
//! manager.start(event_rx).await?;
//!
//! manager.fetch_token_and_login().await?;
//! # Ok(())
//! # }
//! ```

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio::sync::{broadcast, RwLock};

use leadcall_backend_api::{BackendClient, TokenRequest};

use crate::adapter::{AdapterErrorKind, AdapterEvent, AdapterEventReceiver, CallAdapter};
use crate::call::CallUser;
use crate::client::config::ConsoleConfig;
use crate::error::{ConsoleError, ConsoleResult, NOT_READY_MESSAGE};
use crate::events::{ConsoleEvent, ConsoleEventHandler, EventSubscription, HandlerSlot, Notice};
use crate::leads::Lead;
use crate::session::{CallSessionState, CallinView, CalloutView};

/// Credentials driving token acquisition and call creation
///
/// The most recently set token - freshly issued or manually supplied -
/// is authoritative for login. The transient duplicate-request guard is
/// tracked separately on the manager ([`ConsoleManager::is_fetching`]).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionCredentials {
    /// Call-capability token; empty until issued or supplied
    pub token: String,
    /// Advertiser account id
    pub account_id: u64,
    /// Agent user id
    pub user_id: u64,
}

/// High-level manager for the CRM agent console
pub struct ConsoleManager {
    adapter: Arc<dyn CallAdapter>,
    backend: BackendClient,
    session: RwLock<CallSessionState>,
    credentials: RwLock<SessionCredentials>,
    /// Guard against concurrent duplicate token requests
    fetching: AtomicBool,
    /// The pair last used for a token request; reused for silent
    /// re-acquisition after a login-expired event
    last_token_params: RwLock<TokenRequest>,
    handler: HandlerSlot,
    event_tx: broadcast::Sender<ConsoleEvent>,
    started: AtomicBool,
}

impl std::fmt::Debug for ConsoleManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConsoleManager")
            .field("fetching", &self.fetching.load(Ordering::SeqCst))
            .field("started", &self.started.load(Ordering::SeqCst))
            .finish()
    }
}

impl ConsoleManager {
    /// Create a manager over an already constructed adapter.
    ///
    /// The adapter is injected rather than constructed here; claim the
    /// [`AdapterLifecycle`](crate::adapter::AdapterLifecycle) before
    /// constructing it to keep the one-line-per-process guarantee.
    pub fn new(config: ConsoleConfig, adapter: Arc<dyn CallAdapter>) -> ConsoleResult<Arc<Self>> {
        let backend =
            BackendClient::with_user_agent(&config.backend_base_url, &config.user_agent)?;
        let (event_tx, _) = broadcast::channel(64);
        let initial_params = TokenRequest {
            account_id: config.account_id,
            user_id: config.user_id,
        };

        Ok(Arc::new(Self {
            adapter,
            backend,
            session: RwLock::new(CallSessionState::default()),
            credentials: RwLock::new(SessionCredentials {
                token: String::new(),
                account_id: config.account_id,
                user_id: config.user_id,
            }),
            fetching: AtomicBool::new(false),
            last_token_params: RwLock::new(initial_params),
            handler: HandlerSlot::default(),
            event_tx,
            started: AtomicBool::new(false),
        }))
    }

    /// Run adapter one-time setup and spawn the event pump.
    ///
    /// `events` is the receiver half of the channel the adapter pushes
    /// into. Starting an already started manager fails.
    pub async fn start(self: &Arc<Self>, mut events: AdapterEventReceiver) -> ConsoleResult<()> {
        if self
            .started
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            return Err(ConsoleError::AlreadyInitialized {
                what: "console manager".to_string(),
            });
        }

        self.adapter.init().await?;

        let manager = Arc::clone(self);
        tokio::spawn(async move {
            while let Some(event) = events.recv().await {
                manager.handle_adapter_event(event).await;
            }
            tracing::debug!("adapter event channel closed");
        });

        tracing::info!("console manager started");
        Ok(())
    }

    // ===== EVENT PUMP =====

    async fn handle_adapter_event(&self, event: AdapterEvent) {
        tracing::debug!(?event, "adapter event");
        match &event {
            AdapterEvent::Error { kind: AdapterErrorKind::LoginExpired, .. } => {
                // Not user-facing; recover by re-running the token
                // sequence with the last-used pair.
                tracing::info!("login expired; re-acquiring token");
                let params = self.last_token_params.read().await.clone();
                if let Err(e) = self.token_sequence(params).await {
                    tracing::warn!(error = %e, "automatic token re-acquisition failed");
                }
            }
            AdapterEvent::Error { kind, message } => {
                let err = ConsoleError::adapter_failed(kind.as_str(), message.clone());
                self.notify(Notice::error(err.user_message())).await;
            }
            AdapterEvent::CallFinished => {
                tracing::info!("call successfully finished");
            }
            _ => {
                let state = {
                    let mut session = self.session.write().await;
                    session.apply(&event);
                    session.clone()
                };
                self.emit(ConsoleEvent::SessionChanged(state.clone())).await;
                if let Some(handler) = self.handler.read().await.as_ref() {
                    handler.on_session_changed(state).await;
                }
            }
        }
    }

    // ===== TOKEN ACQUISITION =====

    /// Fetch a token for the current credentials and log the adapter in.
    ///
    /// While a request is in flight the `fetching` guard rejects a second
    /// one (`FetchInFlight`); UI layers render the guard as a disabled
    /// login button via [`is_fetching`](Self::is_fetching). On backend
    /// rejection or transport failure the backend's message is surfaced
    /// as a notice and the stored token is left unchanged.
    pub async fn fetch_token_and_login(&self) -> ConsoleResult<()> {
        let params = {
            let credentials = self.credentials.read().await;
            TokenRequest {
                account_id: credentials.account_id,
                user_id: credentials.user_id,
            }
        };
        self.token_sequence(params).await
    }

    /// The one token sequence, shared by the user-initiated path and the
    /// silent login-expired recovery path.
    async fn token_sequence(&self, params: TokenRequest) -> ConsoleResult<()> {
        if self
            .fetching
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            return Err(ConsoleError::FetchInFlight);
        }

        *self.last_token_params.write().await = params.clone();

        match self.backend.fetch_token(&params).await {
            Ok(data) => {
                self.credentials.write().await.token = data.token.clone();
                self.fetching.store(false, Ordering::SeqCst);
                if let Err(e) = self.adapter.login(&data.token).await {
                    self.notify(Notice::error(e.user_message())).await;
                    return Err(e);
                }
                Ok(())
            }
            Err(e) => {
                self.fetching.store(false, Ordering::SeqCst);
                let err: ConsoleError = e.into();
                self.notify(Notice::error(err.user_message())).await;
                Err(err)
            }
        }
    }

    /// Log in with a manually supplied token.
    ///
    /// The token becomes the stored, authoritative one.
    pub async fn login_with_token(&self, token: &str) -> ConsoleResult<()> {
        self.credentials.write().await.token = token.to_string();
        self.adapter.login(token).await
    }

    /// Replace the (account_id, user_id) pair used for future token requests
    pub async fn set_credentials(&self, account_id: u64, user_id: u64) {
        let mut credentials = self.credentials.write().await;
        credentials.account_id = account_id;
        credentials.user_id = user_id;
    }

    // ===== CALL TRIGGER =====

    /// Trigger an outbound call for a lead row.
    ///
    /// Runs the adapter's synchronous readiness predicate first; when not
    /// ready, surfaces the readiness message and sends nothing to the
    /// backend. The readiness check and the backend request are not
    /// atomic - acceptable for a single-operator console.
    ///
    /// A backend rejection surfaces the backend's message; call state is
    /// untouched either way, since only adapter events drive it.
    pub async fn call_lead(&self, lead: &Lead) -> ConsoleResult<()> {
        if !self.adapter.check_ready_call(&lead.ready_check()) {
            self.notify(Notice::error(NOT_READY_MESSAGE)).await;
            return Err(ConsoleError::NotReady);
        }

        let user_id = self.credentials.read().await.user_id;
        let params = lead.call_params(user_id);
        match self.backend.create_call(&params).await {
            Ok(data) => {
                tracing::info!(contact_id = %data.contact_id, callee = %params.callee_number, "call creation requested");
                Ok(())
            }
            Err(e) => {
                let err: ConsoleError = e.into();
                self.notify(Notice::error(err.user_message())).await;
                Err(err)
            }
        }
    }

    // ===== USER INTENTS (forwarded, never mutating local state) =====

    /// Hang up the given call party
    pub async fn hang_up(&self, user: &CallUser) -> ConsoleResult<()> {
        self.adapter.hang_up(user).await
    }

    /// Answer the pending inbound call
    pub async fn answer(&self, user: &CallUser) -> ConsoleResult<()> {
        self.adapter.answer(user).await
    }

    /// Refuse the pending inbound call
    pub async fn refuse(&self, user: &CallUser) -> ConsoleResult<()> {
        self.adapter.refuse(user).await
    }

    /// Forward a call quality check to the SDK
    pub async fn check_quality(&self) -> ConsoleResult<()> {
        self.adapter.check_quality().await
    }

    /// Log the SDK session out.
    ///
    /// `logged_in` flips only on the adapter's subsequent login-state event.
    pub async fn logout(&self) -> ConsoleResult<()> {
        self.adapter.logout().await
    }

    // ===== ACCESSORS =====

    /// Snapshot of the current call-session state
    pub async fn session_state(&self) -> CallSessionState {
        self.session.read().await.clone()
    }

    /// Render descriptor for the outbound call panel
    pub async fn render_callout(&self) -> CalloutView {
        self.session.read().await.render_callout()
    }

    /// Render descriptor for the inbound call panel
    pub async fn render_callin(&self) -> Option<CallinView> {
        self.session.read().await.render_callin()
    }

    /// The callee of the active outbound call, as needed by the intent
    /// methods. Fails with `MissingCallUser` when the SDK attached no user
    /// context to the active call.
    pub async fn callout_user(&self) -> ConsoleResult<CallUser> {
        self.session
            .read()
            .await
            .callout_user
            .clone()
            .ok_or(ConsoleError::MissingCallUser)
    }

    /// Snapshot of the current credentials
    pub async fn credentials(&self) -> SessionCredentials {
        self.credentials.read().await.clone()
    }

    /// Whether a token request is in flight (login button disabled)
    pub fn is_fetching(&self) -> bool {
        self.fetching.load(Ordering::SeqCst)
    }

    // ===== EVENT WIRING =====

    /// Register the application-level event handler
    pub async fn set_event_handler(&self, handler: Arc<dyn ConsoleEventHandler>) {
        *self.handler.write().await = Some(handler);
    }

    /// Subscribe to the broadcast event stream
    pub fn subscribe(&self) -> EventSubscription {
        EventSubscription::new(self.event_tx.subscribe())
    }

    async fn notify(&self, notice: Notice) {
        tracing::debug!(message = %notice.message, "notice");
        if let Some(handler) = self.handler.read().await.as_ref() {
            handler.on_notice(notice.clone()).await;
        }
        self.emit(ConsoleEvent::Notice(notice)).await;
    }

    async fn emit(&self, event: ConsoleEvent) {
        // No subscribers is fine; the handler path already ran.
        let _ = self.event_tx.send(event);
    }
}

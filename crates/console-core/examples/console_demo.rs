//! Minimal console wiring demo.
//!
//! Drives the manager with a scripted stand-in adapter instead of the real
//! calling SDK, so the whole flow (token, readiness gate, event-driven
//! state) can be watched without a backend. Run with:
//!
//! ```bash
//! RUST_LOG=info cargo run --example console_demo
//! ```

use std::sync::Arc;

use async_trait::async_trait;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use leadcall_console_core::{
    adapter_event_channel, AdapterEvent, AdapterEventSender, AdapterLifecycle, CallAdapter,
    CallUser, CalloutState, ConsoleConfig, ConsoleEvent, ConsoleManager, ConsoleResult,
    LeadTable, ReadyCallCheck,
};

/// Scripted adapter: immediately "ready", echoes each intent back as the
/// matching state event, the way the real SDK would after signaling.
struct ScriptedAdapter {
    events: AdapterEventSender,
}

#[async_trait]
impl CallAdapter for ScriptedAdapter {
    async fn init(&self) -> ConsoleResult<()> {
        Ok(())
    }

    async fn login(&self, _token: &str) -> ConsoleResult<()> {
        let _ = self.events.send(AdapterEvent::LoginStateChanged { logged_in: true });
        Ok(())
    }

    async fn logout(&self) -> ConsoleResult<()> {
        let _ = self.events.send(AdapterEvent::LoginStateChanged { logged_in: false });
        Ok(())
    }

    fn check_ready_call(&self, _check: &ReadyCallCheck) -> bool {
        true
    }

    async fn hang_up(&self, user: &CallUser) -> ConsoleResult<()> {
        let _ = self.events.send(AdapterEvent::CalloutStateChanged {
            state: CalloutState::HangupLocal,
            user: Some(user.clone()),
        });
        let _ = self.events.send(AdapterEvent::CallFinished);
        Ok(())
    }

    async fn answer(&self, _user: &CallUser) -> ConsoleResult<()> {
        Ok(())
    }

    async fn refuse(&self, _user: &CallUser) -> ConsoleResult<()> {
        Ok(())
    }

    async fn check_quality(&self) -> ConsoleResult<()> {
        Ok(())
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let _claim = AdapterLifecycle::claim()?;
    let (event_tx, event_rx) = adapter_event_channel();
    let adapter = Arc::new(ScriptedAdapter { events: event_tx.clone() });

    let config = ConsoleConfig::new("http://127.0.0.1:3000");
    let manager = ConsoleManager::new(config, adapter)?;
    manager.start(event_rx).await?;

    let mut subscription = manager.subscribe();
    tokio::spawn(async move {
        while let Ok(event) = subscription.receiver.recv().await {
            match event {
                ConsoleEvent::SessionChanged(state) => {
                    tracing::info!(
                        logged_in = state.logged_in,
                        callout = %state.callout_state,
                        "session changed"
                    );
                }
                ConsoleEvent::Notice(notice) => {
                    tracing::warn!(message = %notice.message, "notice");
                }
            }
        }
    });

    // Skip the backend and log in with a canned token.
    manager.login_with_token("demo-token").await?;

    // Script an outbound call against the first seeded lead.
    let table = LeadTable::new();
    let lead = table.get("0").ok_or("seed row missing")?;
    let callee = CallUser::new(&lead.callee_name, &lead.callee_number);

    event_tx.send(AdapterEvent::CalloutStateChanged {
        state: CalloutState::Calling,
        user: Some(callee.clone()),
    })?;
    event_tx.send(AdapterEvent::CalloutStateChanged {
        state: CalloutState::Talking,
        user: Some(callee.clone()),
    })?;

    tokio::time::sleep(std::time::Duration::from_millis(100)).await;
    tracing::info!(view = ?manager.render_callout().await, "callout panel");

    manager.hang_up(&callee).await?;
    tokio::time::sleep(std::time::Duration::from_millis(100)).await;
    tracing::info!(view = ?manager.render_callout().await, "callout panel after hang up");

    manager.logout().await?;
    tokio::time::sleep(std::time::Duration::from_millis(100)).await;
    Ok(())
}

//! Headless realtime client: connects to the push server and logs what
//! arrives until interrupted.

use std::sync::Arc;

use internship_realtime::adapters::{
    LogDesktopNotifier, LogToaster, NotificationsClientConfig, ReqwestNotificationsApi,
    StaticTokenProvider, TerminalBellPlayer, TungsteniteTransport,
};
use internship_realtime::application::{RealtimeClient, RealtimeDeps, RealtimeOptions};
use internship_realtime::config::AppConfig;
use internship_realtime::domain::alerts::DesktopPermission;
use internship_realtime::ports::NotificationsApi;
use internship_realtime::telemetry;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let config = AppConfig::load()?;
    telemetry::init_tracing(&config.telemetry)?;
    config.validate()?;

    let notifications_api: Option<Arc<dyn NotificationsApi>> = match &config.api.base_url {
        Some(base_url) => Some(Arc::new(ReqwestNotificationsApi::new(
            NotificationsClientConfig::new(base_url.clone()).with_timeout(config.api.request_timeout()),
        )?)),
        None => None,
    };

    let desktop_answer = if config.notifications.enable_desktop {
        DesktopPermission::Granted
    } else {
        DesktopPermission::Denied
    };

    let client = RealtimeClient::init(
        RealtimeOptions::from_config(&config),
        RealtimeDeps {
            transport: Arc::new(TungsteniteTransport::new()),
            token_provider: Arc::new(StaticTokenProvider::new(config.auth.token.clone())),
            toaster: Arc::new(LogToaster),
            sound: Arc::new(TerminalBellPlayer::stderr()),
            desktop: Arc::new(LogDesktopNotifier::new(desktop_answer)),
            notifications_api,
        },
    );

    client.router().on_fn("pong", "PongLogger", |event| {
        tracing::debug!(?event, "Pong");
        Ok(())
    });

    if config.notifications.enable_desktop {
        client.request_desktop_permission().await;
    }

    tracing::info!(url = %config.connection.url, "Starting realtime client");
    client.connect().await?;
    client.ping();

    let mut unread = client.watch_unread();
    let mut connection = client.watch_connection();
    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            changed = unread.changed() => {
                if changed.is_err() {
                    break;
                }
                tracing::info!(unread = *unread.borrow(), "Unread count changed");
            }
            changed = connection.changed() => {
                if changed.is_err() {
                    break;
                }
                let state = connection.borrow().clone();
                tracing::info!(status = ?state.status, attempts = state.reconnect_attempts, "Connection state changed");
                if state.requires_acknowledgement() {
                    tracing::error!("Live updates stopped; restart to reconnect");
                }
            }
        }
    }

    tracing::info!("Shutting down");
    client.teardown();
    Ok(())
}

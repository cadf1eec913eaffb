use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

use crate::models::{Assignment, DeliveryStaff, GeoPoint};

pub const DEFAULT_PING_INTERVAL: Duration = Duration::from_secs(30);
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackerState {
    LoggedOut,
    LoggingIn,
    Tracking,
    StoppingTrack,
}

/// What a successful staff login hands back; also what gets stored on disk.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StaffSession {
    pub token: String,
    pub staff: DeliveryStaff,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PingOutcome {
    Recorded,
    Unauthorized,
}

#[derive(Serialize)]
struct LoginRequest<'a> {
    phone: &'a str,
    password: &'a str,
}

/// Talks to the delivery endpoints with the staff token, never the vendor's.
pub struct DeliveryClient {
    base_url: String,
    client: reqwest::Client,
}

impl DeliveryClient {
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        Self::with_timeout(base_url, DEFAULT_REQUEST_TIMEOUT)
    }

    /// Every request is abandoned after `timeout`.
    pub fn with_timeout(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client,
        })
    }

    pub async fn login(&self, phone: &str, password: &str) -> Result<StaffSession> {
        let url = format!("{}/delivery/login", self.base_url);
        let response = self
            .client
            .post(&url)
            .json(&LoginRequest { phone, password })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await?;
            anyhow::bail!("Delivery login failed ({}): {}", status, error_text);
        }

        let session: StaffSession = response.json().await?;
        log::info!("🛵 Logged in as {} ({})", session.staff.name, session.staff.id);
        Ok(session)
    }

    pub async fn assignments(&self, token: &str) -> Result<Vec<Assignment>> {
        let url = format!("{}/delivery/assignments", self.base_url);
        let response = self
            .client
            .get(&url)
            .header("Authorization", format!("Bearer {}", token))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await?;
            anyhow::bail!("Delivery API error ({}): {}", status, error_text);
        }

        Ok(response.json().await?)
    }

    /// A 401 is reported as an outcome rather than an error so the ping loop can end the session.
    pub async fn post_location(&self, token: &str, point: GeoPoint) -> Result<PingOutcome> {
        let url = format!("{}/delivery/location", self.base_url);
        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", token))
            .json(&point)
            .send()
            .await?;

        let status = response.status();
        if status == reqwest::StatusCode::UNAUTHORIZED {
            return Ok(PingOutcome::Unauthorized);
        }
        if !status.is_success() {
            let error_text = response.text().await?;
            anyhow::bail!("Location ping failed ({}): {}", status, error_text);
        }

        Ok(PingOutcome::Recorded)
    }
}

#[async_trait]
pub trait LocationSource: Send + Sync {
    /// `None` when no fix is available; that tick is skipped.
    async fn current(&self) -> Option<GeoPoint>;
}

pub struct FixedLocation(pub GeoPoint);

#[async_trait]
impl LocationSource for FixedLocation {
    async fn current(&self) -> Option<GeoPoint> {
        Some(self.0)
    }
}

/// Keeps the staff session in a JSON file between runs.
#[derive(Debug, Clone)]
pub struct SessionStore {
    path: PathBuf,
}

impl SessionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub async fn save(&self, session: &StaffSession) -> Result<()> {
        let json = serde_json::to_string_pretty(session)?;
        tokio::fs::write(&self.path, json)
            .await
            .with_context(|| format!("Failed to write session file {}", self.path.display()))
    }

    pub async fn load(&self) -> Result<Option<StaffSession>> {
        match tokio::fs::read_to_string(&self.path).await {
            Ok(raw) => {
                let session = serde_json::from_str(&raw)
                    .with_context(|| format!("Corrupt session file {}", self.path.display()))?;
                Ok(Some(session))
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    pub async fn clear(&self) -> Result<()> {
        match tokio::fs::remove_file(&self.path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

struct ActiveTrack {
    session: StaffSession,
    cancel: CancellationToken,
    handle: JoinHandle<()>,
}

/// One delivery person's session. Owns the only ping loop handle, so there is never
/// more than one loop per session.
pub struct DeliverySession {
    client: Arc<DeliveryClient>,
    location: Arc<dyn LocationSource>,
    store: Option<SessionStore>,
    interval: Duration,
    state: Arc<watch::Sender<TrackerState>>,
    active: Option<ActiveTrack>,
}

impl DeliverySession {
    pub fn new(client: Arc<DeliveryClient>, location: Arc<dyn LocationSource>) -> Self {
        let (state, _) = watch::channel(TrackerState::LoggedOut);
        Self {
            client,
            location,
            store: None,
            interval: DEFAULT_PING_INTERVAL,
            state: Arc::new(state),
            active: None,
        }
    }

    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    pub fn with_store(mut self, store: SessionStore) -> Self {
        self.store = Some(store);
        self
    }

    pub fn state(&self) -> TrackerState {
        *self.state.borrow()
    }

    pub fn subscribe(&self) -> watch::Receiver<TrackerState> {
        self.state.subscribe()
    }

    /// The signed-in staff member, only while tracking.
    pub fn staff(&self) -> Option<&DeliveryStaff> {
        match (&self.active, self.state()) {
            (Some(active), TrackerState::Tracking) => Some(&active.session.staff),
            _ => None,
        }
    }

    pub async fn login(&mut self, phone: &str, password: &str) -> Result<()> {
        self.ensure_logged_out().await?;
        self.state.send_replace(TrackerState::LoggingIn);

        let session = match self.client.login(phone, password).await {
            Ok(session) => session,
            Err(e) => {
                self.state.send_replace(TrackerState::LoggedOut);
                return Err(e);
            }
        };

        if let Some(store) = &self.store {
            if let Err(e) = store.save(&session).await {
                log::warn!("⚠️ Could not persist delivery session: {}", e);
            }
        }

        self.start_tracking(session);
        Ok(())
    }

    /// Restores a stored session and starts tracking. Returns false when there is nothing to restore.
    pub async fn resume(&mut self) -> Result<bool> {
        let Some(store) = self.store.clone() else {
            return Ok(false);
        };
        let Some(session) = store.load().await? else {
            return Ok(false);
        };

        self.ensure_logged_out().await?;
        log::info!("🔁 Resuming delivery session for {}", session.staff.name);
        self.start_tracking(session);
        Ok(true)
    }

    /// Picks up a stored session if there is a usable one, otherwise logs in.
    pub async fn resume_or_login(&mut self, phone: &str, password: &str) -> Result<()> {
        match self.resume().await {
            Ok(true) => return Ok(()),
            Ok(false) => {}
            Err(e) => log::warn!("⚠️ Stored delivery session unusable: {}", e),
        }
        self.login(phone, password).await
    }

    pub async fn assignments(&self) -> Result<Vec<Assignment>> {
        match (&self.active, self.state()) {
            (Some(active), TrackerState::Tracking) => self.client.assignments(&active.session.token).await,
            _ => anyhow::bail!("Not logged in"),
        }
    }

    pub async fn logout(&mut self) -> Result<()> {
        if let Some(active) = self.active.take() {
            self.state.send_replace(TrackerState::StoppingTrack);
            active.cancel.cancel();
            if let Err(e) = active.handle.await {
                log::error!("❌ Ping loop ended abnormally: {}", e);
            }
            log::info!("👋 {} logged out", active.session.staff.name);
        }

        self.state.send_replace(TrackerState::LoggedOut);

        if let Some(store) = &self.store {
            store.clear().await?;
        }
        Ok(())
    }

    async fn ensure_logged_out(&mut self) -> Result<()> {
        if self.state() != TrackerState::LoggedOut {
            anyhow::bail!("Already logged in; log out first");
        }
        // The loop may have ended the session on its own; reap what it left behind.
        if let Some(stale) = self.active.take() {
            stale.cancel.cancel();
            let _ = stale.handle.await;
        }
        Ok(())
    }

    fn start_tracking(&mut self, session: StaffSession) {
        let cancel = CancellationToken::new();
        self.state.send_replace(TrackerState::Tracking);

        let handle = tokio::spawn(ping_loop(
            self.client.clone(),
            session.token.clone(),
            self.location.clone(),
            self.interval,
            cancel.clone(),
            self.state.clone(),
            self.store.clone(),
        ));

        log::info!("📍 Location tracking started (every {:?})", self.interval);
        self.active = Some(ActiveTrack {
            session,
            cancel,
            handle,
        });
    }
}

impl Drop for DeliverySession {
    fn drop(&mut self) {
        if let Some(active) = &self.active {
            active.cancel.cancel();
        }
    }
}

async fn ping_loop(
    client: Arc<DeliveryClient>,
    token: String,
    location: Arc<dyn LocationSource>,
    period: Duration,
    cancel: CancellationToken,
    state: Arc<watch::Sender<TrackerState>>,
    store: Option<SessionStore>,
) {
    // First tick completes immediately
    let mut ticker = tokio::time::interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => break,
            _ = ticker.tick() => {}
        }

        let Some(point) = location.current().await else {
            log::debug!("📍 No location fix, skipping ping");
            continue;
        };

        // Logout must not wait on a slow ping
        let outcome = tokio::select! {
            biased;
            _ = cancel.cancelled() => break,
            outcome = client.post_location(&token, point) => outcome,
        };

        match outcome {
            Ok(PingOutcome::Recorded) => {
                log::debug!("📍 Location sent: {}, {}", point.lat, point.lng);
            }
            Ok(PingOutcome::Unauthorized) => {
                log::warn!("⚠️ Location ping unauthorized, ending delivery session");
                if let Some(store) = &store {
                    if let Err(e) = store.clear().await {
                        log::warn!("⚠️ Could not remove session file: {}", e);
                    }
                }
                state.send_replace(TrackerState::LoggedOut);
                break;
            }
            Err(e) => {
                log::warn!("⚠️ Location ping failed: {}", e);
            }
        }
    }

    log::debug!("🛑 Ping loop stopped");
}

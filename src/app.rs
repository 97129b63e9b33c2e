use crate::actions::{
    self, ActionError, CreateInvitationInput, InvitationOutcome, SendInvitationEmailInput,
};
use crate::common::api_client::WizarrClient;
use crate::common::settings::AppSettings;
use crate::coordinator::{Coordinator, RefreshError};
use crate::events::{EventBus, IntegrationEvent};
use crate::sensors::SensorPanel;
use std::sync::Arc;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::info;

#[derive(Debug, thiserror::Error)]
pub enum StartError {
    #[error("initial refresh failed: {0}")]
    Refresh(#[from] RefreshError),
}

/// A running bridge instance. The snapshot, sensor panel, event bus and
/// polling task all live here, so two instances never share state.
pub struct Handle {
    name: String,
    client: WizarrClient,
    coordinator: Arc<Coordinator>,
    panel: Arc<SensorPanel>,
    events: EventBus,
    cancel: CancellationToken,
    poll_task: JoinHandle<()>,
}

/// Boot the bridge: build the client, wire the sensor panel, run the first
/// refresh, then spawn the polling task.
///
/// # Errors
/// If the first refresh fails (bad base URL, rejected API key, unreachable
/// server); a bridge that can't see Wizarr once shouldn't start.
pub async fn start(settings: &AppSettings) -> Result<Handle, StartError> {
    let client = WizarrClient::new(&settings.base_url, &settings.api_key);
    let coordinator = Arc::new(Coordinator::new(client.clone(), settings.update_interval()));

    let panel = Arc::new(SensorPanel::new());
    {
        let panel = panel.clone();
        coordinator.subscribe(move |update| panel.observe(update));
    }

    coordinator.refresh().await?;

    let cancel = CancellationToken::new();
    let poll_task = tokio::spawn(coordinator.clone().run(cancel.clone()));
    info!(
        name = %settings.name,
        interval_secs = coordinator.interval().as_secs(),
        "wizarr bridge started"
    );

    Ok(Handle {
        name: settings.name.clone(),
        client,
        coordinator,
        panel,
        events: EventBus::default(),
        cancel,
        poll_task,
    })
}

impl Handle {
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn coordinator(&self) -> &Coordinator {
        &self.coordinator
    }

    #[must_use]
    pub fn sensors(&self) -> &SensorPanel {
        &self.panel
    }

    /// A fresh receiver for completion events.
    #[must_use]
    pub fn subscribe_events(&self) -> broadcast::Receiver<IntegrationEvent> {
        self.events.subscribe()
    }

    /// Trigger a refresh outside the timer; coalesces with any in-flight one.
    ///
    /// # Errors
    /// See [`Coordinator::refresh`].
    pub async fn refresh(&self) -> Result<(), RefreshError> {
        self.coordinator.refresh().await
    }

    /// The `create_invitation` action.
    ///
    /// # Errors
    /// See [`actions::create_invitation`].
    pub async fn create_invitation(
        &self,
        input: &CreateInvitationInput,
    ) -> Result<InvitationOutcome, ActionError> {
        actions::create_invitation(&self.client, &self.events, input).await
    }

    /// The `send_invitation_email` action.
    ///
    /// # Errors
    /// See [`actions::send_invitation_email`].
    pub async fn send_invitation_email(
        &self,
        input: &SendInvitationEmailInput,
    ) -> Result<InvitationOutcome, ActionError> {
        let snapshot = self.coordinator.snapshot();
        actions::send_invitation_email(&self.client, snapshot.as_deref(), &self.events, input).await
    }

    /// Stop polling and wait for the task to wind down.
    pub async fn stop(self) {
        self.cancel.cancel();
        let _ = self.poll_task.await;
        info!(name = %self.name, "wizarr bridge stopped");
    }
}

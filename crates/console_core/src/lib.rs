use std::sync::Arc;

use async_trait::async_trait;
use shared::{
    error::CommandError,
    protocol::{Action, Command, RawResponse},
};
use tokio::sync::broadcast;
use tracing::{debug, warn};

pub mod calibration;
pub mod camera;
pub mod codec;
pub mod dispatcher;
pub mod threshold;
pub mod transport;

pub use calibration::{
    CalibrationController, CalibrationPanel, CalibrationRanges, ChannelRange,
    SharedCalibrationPanel,
};
pub use camera::{CameraModeReport, CameraModeSelector};
pub use dispatcher::{Dispatch, MapState, SequencedDispatcher, SkipReason};
pub use threshold::LearningThresholdToggle;
pub use transport::HttpCommandChannel;

const CONSOLE_EVENT_CAPACITY: usize = 256;

/// One request, one response. Implementations never retry.
#[async_trait]
pub trait CommandChannel: Send + Sync {
    async fn send(&self, command: Command) -> Result<RawResponse, CommandError>;
}

#[derive(Debug, Clone, PartialEq)]
pub enum ConsoleEvent {
    Response { action: Action, text: String },
    CameraModeChanged { code: i64, label: String },
    CalibrationUpdated(CalibrationRanges),
    Error(String),
}

/// Wraps a channel so every exchange reaches the status display: the raw
/// response text on success, the failure otherwise.
pub struct ReportingChannel {
    inner: Arc<dyn CommandChannel>,
    events: broadcast::Sender<ConsoleEvent>,
}

impl ReportingChannel {
    pub fn new(inner: Arc<dyn CommandChannel>, events: broadcast::Sender<ConsoleEvent>) -> Self {
        Self { inner, events }
    }
}

#[async_trait]
impl CommandChannel for ReportingChannel {
    async fn send(&self, command: Command) -> Result<RawResponse, CommandError> {
        let action = command.action;
        match self.inner.send(command).await {
            Ok(response) => {
                debug!(%action, "controller acknowledged command");
                let _ = self.events.send(ConsoleEvent::Response {
                    action,
                    text: response.body.clone(),
                });
                Ok(response)
            }
            Err(err) => {
                warn!(%action, error = %err, "controller command failed");
                let _ = self.events.send(ConsoleEvent::Error(err.to_string()));
                Err(err)
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionOptions {
    pub geolocation_available: bool,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            geolocation_available: true,
        }
    }
}

/// Per-operator state: built once when the console starts and shared by
/// reference with whatever drives it.
pub struct ConsoleSession {
    dispatcher: SequencedDispatcher,
    camera: CameraModeSelector,
    calibration: CalibrationController,
    threshold: LearningThresholdToggle,
    events: broadcast::Sender<ConsoleEvent>,
}

impl ConsoleSession {
    pub fn new(
        channel: Arc<dyn CommandChannel>,
        panel: Arc<dyn CalibrationPanel>,
        options: SessionOptions,
    ) -> Self {
        let (events, _) = broadcast::channel(CONSOLE_EVENT_CAPACITY);
        let channel: Arc<dyn CommandChannel> =
            Arc::new(ReportingChannel::new(channel, events.clone()));
        Self {
            dispatcher: SequencedDispatcher::new(channel.clone(), options.geolocation_available),
            camera: CameraModeSelector::new(channel.clone(), events.clone()),
            calibration: CalibrationController::new(channel.clone(), panel, events.clone()),
            threshold: LearningThresholdToggle::new(channel),
            events,
        }
    }

    pub fn dispatcher(&self) -> &SequencedDispatcher {
        &self.dispatcher
    }

    pub fn camera(&self) -> &CameraModeSelector {
        &self.camera
    }

    pub fn calibration(&self) -> &CalibrationController {
        &self.calibration
    }

    pub fn threshold(&self) -> &LearningThresholdToggle {
        &self.threshold
    }

    pub fn subscribe_events(&self) -> broadcast::Receiver<ConsoleEvent> {
        self.events.subscribe()
    }
}

#[cfg(test)]
mod test_support;

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;

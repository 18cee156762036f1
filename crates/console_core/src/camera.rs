use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc,
};

use shared::{
    domain::CameraMode,
    error::CommandError,
    protocol::{Action, Command},
};
use tokio::sync::broadcast;
use tracing::info;

use crate::{CommandChannel, ConsoleEvent};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CameraModeReport {
    pub requested: CameraMode,
    /// The mode code the controller says it switched to.
    pub reported_code: i64,
    pub label: &'static str,
}

/// Steps the camera through [`CameraMode::CYCLE`], one mode per call.
///
/// The position moves on as soon as a request is issued, whatever the
/// controller answers, so a failed or slow exchange never stalls the cycle.
pub struct CameraModeSelector {
    channel: Arc<dyn CommandChannel>,
    events: broadcast::Sender<ConsoleEvent>,
    index: AtomicUsize,
}

impl CameraModeSelector {
    pub fn new(channel: Arc<dyn CommandChannel>, events: broadcast::Sender<ConsoleEvent>) -> Self {
        Self {
            channel,
            events,
            index: AtomicUsize::new(0),
        }
    }

    /// The mode the next call will request.
    pub fn next_mode(&self) -> CameraMode {
        CameraMode::CYCLE[self.index.load(Ordering::SeqCst)]
    }

    pub async fn cycle(&self) -> Result<CameraModeReport, CommandError> {
        let requested = self.claim_next();
        let response = self
            .channel
            .send(Command::integer(Action::SetCameraMode, requested.code()))
            .await?;
        let reported_code = response.parse_integer().inspect_err(|err| {
            let _ = self.events.send(ConsoleEvent::Error(err.to_string()));
        })?;

        let label = CameraMode::label_for_code(reported_code);
        info!(requested = requested.code(), reported_code, label, "camera mode changed");
        let _ = self.events.send(ConsoleEvent::CameraModeChanged {
            code: reported_code,
            label: label.to_string(),
        });
        Ok(CameraModeReport {
            requested,
            reported_code,
            label,
        })
    }

    fn claim_next(&self) -> CameraMode {
        let len = CameraMode::CYCLE.len();
        let index = self
            .index
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |index| {
                Some((index + 1) % len)
            })
            .unwrap_or_else(|index| index);
        CameraMode::CYCLE[index]
    }
}

#[cfg(test)]
#[path = "tests/camera_tests.rs"]
mod tests;

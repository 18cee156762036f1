use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

use shared::{
    error::CommandError,
    protocol::{Action, Command, RawResponse},
};
use tracing::debug;

use crate::CommandChannel;

/// Shows or hides the colour-learning threshold overlay on the camera feed.
pub struct LearningThresholdToggle {
    channel: Arc<dyn CommandChannel>,
    shown: AtomicBool,
}

impl LearningThresholdToggle {
    pub fn new(channel: Arc<dyn CommandChannel>) -> Self {
        Self {
            channel,
            shown: AtomicBool::new(false),
        }
    }

    pub fn is_shown(&self) -> bool {
        self.shown.load(Ordering::SeqCst)
    }

    /// Flips the local flag before sending; a failed send leaves it flipped.
    pub async fn toggle(&self) -> Result<RawResponse, CommandError> {
        let shown = !self.shown.fetch_xor(true, Ordering::SeqCst);
        debug!(shown, "toggling learning threshold overlay");
        self.channel
            .send(Command::flag(Action::ShowLearningThreshold, shown))
            .await
    }
}

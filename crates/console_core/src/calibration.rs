use std::sync::{Arc, Mutex, PoisonError};

use shared::{
    error::CommandError,
    protocol::{Action, CalibrationRecord, Command, CommandPayload, RawResponse},
};
use tokio::sync::broadcast;
use tracing::{debug, info};

use crate::{CommandChannel, ConsoleEvent};

/// Hue is an angle; ranges that cross 0° are edited with a negative minimum.
pub const HUE_CIRCLE_DEGREES: i32 = 360;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ChannelRange {
    pub min: i32,
    pub max: i32,
}

impl ChannelRange {
    pub fn new(min: i32, max: i32) -> Self {
        Self { min, max }
    }
}

/// The three slider pairs as the operator edits them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CalibrationRanges {
    pub hue: ChannelRange,
    pub saturation: ChannelRange,
    pub value: ChannelRange,
}

impl CalibrationRanges {
    /// Editing view of a controller record. A hue minimum above the maximum
    /// means the range wraps through 0°, shown as `min - 360`. Equal bounds
    /// do not wrap.
    pub fn from_record(record: CalibrationRecord) -> Self {
        let min_hue = if record.min_hue > record.max_hue {
            record.min_hue - HUE_CIRCLE_DEGREES
        } else {
            record.min_hue
        };
        Self {
            hue: ChannelRange::new(min_hue, record.max_hue),
            saturation: ChannelRange::new(record.min_sat, record.max_sat),
            value: ChannelRange::new(record.min_val, record.max_val),
        }
    }

    /// Controller record for these ranges; a negative hue minimum goes back
    /// onto the circle.
    pub fn to_record(&self) -> CalibrationRecord {
        let min_hue = if self.hue.min < 0 {
            self.hue.min + HUE_CIRCLE_DEGREES
        } else {
            self.hue.min
        };
        CalibrationRecord {
            min_hue,
            max_hue: self.hue.max,
            min_sat: self.saturation.min,
            max_sat: self.saturation.max,
            min_val: self.value.min,
            max_val: self.value.max,
        }
    }
}

/// Where the calibration sliders live.
pub trait CalibrationPanel: Send + Sync {
    fn read_ranges(&self) -> CalibrationRanges;
    fn write_ranges(&self, ranges: CalibrationRanges);
}

#[derive(Debug, Default)]
pub struct SharedCalibrationPanel {
    ranges: Mutex<CalibrationRanges>,
}

impl SharedCalibrationPanel {
    pub fn new(ranges: CalibrationRanges) -> Self {
        Self {
            ranges: Mutex::new(ranges),
        }
    }
}

impl CalibrationPanel for SharedCalibrationPanel {
    fn read_ranges(&self) -> CalibrationRanges {
        *self.ranges.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_ranges(&self, ranges: CalibrationRanges) {
        *self.ranges.lock().unwrap_or_else(PoisonError::into_inner) = ranges;
    }
}

pub struct CalibrationController {
    channel: Arc<dyn CommandChannel>,
    panel: Arc<dyn CalibrationPanel>,
    events: broadcast::Sender<ConsoleEvent>,
}

impl CalibrationController {
    pub fn new(
        channel: Arc<dyn CommandChannel>,
        panel: Arc<dyn CalibrationPanel>,
        events: broadcast::Sender<ConsoleEvent>,
    ) -> Self {
        Self {
            channel,
            panel,
            events,
        }
    }

    /// Asks the controller to learn thresholds from the current frame and
    /// loads them into the panel.
    pub async fn learn(&self) -> Result<CalibrationRanges, CommandError> {
        let response = self
            .channel
            .send(Command::bare(Action::DoCameraAutoLearning))
            .await?;
        self.load_controller_ranges(&response)
    }

    /// Sends the panel's ranges. The panel then shows what the controller
    /// reports back, not what was sent.
    pub async fn apply(&self) -> Result<CalibrationRanges, CommandError> {
        let record = self.panel.read_ranges().to_record();
        debug!(?record, "pushing calibration values");
        let response = self
            .channel
            .send(Command::with_payload(
                Action::SetCameraLearningValues,
                CommandPayload::Calibration(record),
            ))
            .await?;
        self.load_controller_ranges(&response)
    }

    pub async fn set_learning_size(&self, decrease: bool) -> Result<RawResponse, CommandError> {
        self.channel
            .send(Command::flag(Action::SetCameraLearningSize, decrease))
            .await
    }

    fn load_controller_ranges(
        &self,
        response: &RawResponse,
    ) -> Result<CalibrationRanges, CommandError> {
        let record: CalibrationRecord = response.parse_json().inspect_err(|err| {
            let _ = self.events.send(ConsoleEvent::Error(err.to_string()));
        })?;
        let ranges = CalibrationRanges::from_record(record);
        info!(
            hue_min = ranges.hue.min,
            hue_max = ranges.hue.max,
            action = %response.action,
            "calibration ranges updated"
        );
        self.panel.write_ranges(ranges);
        let _ = self.events.send(ConsoleEvent::CalibrationUpdated(ranges));
        Ok(ranges)
    }
}

#[cfg(test)]
#[path = "tests/calibration_tests.rs"]
mod tests;

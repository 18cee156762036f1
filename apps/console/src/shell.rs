use std::sync::Arc;

use clap::{Parser, Subcommand, ValueEnum};
use console_core::{
    CalibrationPanel, CalibrationRanges, ChannelRange, ConsoleSession, Dispatch, MapState,
    SharedCalibrationPanel,
};
use shared::domain::{GeoPoint, TrackMethod};
use tracing::debug;

#[derive(Parser, Debug)]
#[command(no_binary_name = true, disable_version_flag = true)]
struct ShellLine {
    #[command(subcommand)]
    command: ShellCommand,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum ShellCommand {
    /// Add a search-area corner.
    Bound {
        #[arg(allow_negative_numbers = true)]
        lat: f64,
        #[arg(allow_negative_numbers = true)]
        lng: f64,
    },
    /// Add a waypoint.
    Marker {
        #[arg(allow_negative_numbers = true)]
        lat: f64,
        #[arg(allow_negative_numbers = true)]
        lng: f64,
    },
    /// Remove every corner and waypoint.
    Clear,
    /// Unlock the map for drawing; nothing is dispatched while editing.
    Edit,
    /// Lock the map so drawn geometry can be dispatched.
    Lock,
    /// Upload the search area and start the search pattern.
    Auto,
    /// Upload the waypoints and start waypoint navigation.
    Manual,
    TrackUser,
    TrackObject {
        #[arg(value_enum)]
        method: ObjectTrackMethod,
    },
    Stop,
    /// Switch the camera to the next processing mode.
    CameraMode,
    LearningSize {
        #[arg(value_enum)]
        change: LearningWindowChange,
    },
    /// Learn colour thresholds from the current frame.
    Learn,
    /// Send hue, saturation and value ranges (hue minimum may be negative).
    Calibrate {
        #[arg(allow_negative_numbers = true)]
        hue_min: i32,
        #[arg(allow_negative_numbers = true)]
        hue_max: i32,
        #[arg(allow_negative_numbers = true)]
        sat_min: i32,
        #[arg(allow_negative_numbers = true)]
        sat_max: i32,
        #[arg(allow_negative_numbers = true)]
        val_min: i32,
        #[arg(allow_negative_numbers = true)]
        val_max: i32,
    },
    /// Show or hide the learning threshold overlay.
    Threshold,
    Show,
    Quit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ObjectTrackMethod {
    Strafe,
    Rotate,
}

impl From<ObjectTrackMethod> for TrackMethod {
    fn from(value: ObjectTrackMethod) -> Self {
        match value {
            ObjectTrackMethod::Strafe => TrackMethod::Strafe,
            ObjectTrackMethod::Rotate => TrackMethod::Rotate,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LearningWindowChange {
    Grow,
    Shrink,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    /// Anything worth seeing already went out on the event stream.
    Quiet,
    Note(String),
    Quit,
}

pub fn parse_line(line: &str) -> Result<ShellCommand, clap::Error> {
    ShellLine::try_parse_from(line.split_whitespace()).map(|parsed| parsed.command)
}

pub struct Shell {
    session: ConsoleSession,
    panel: Arc<SharedCalibrationPanel>,
    map: MapState,
}

impl Shell {
    pub fn new(session: ConsoleSession, panel: Arc<SharedCalibrationPanel>) -> Self {
        Self {
            session,
            panel,
            map: MapState::default(),
        }
    }

    pub async fn execute_line(&mut self, line: &str) -> Reply {
        if line.trim().is_empty() {
            return Reply::Quiet;
        }
        match parse_line(line) {
            Ok(command) => self.execute(command).await,
            Err(err) => Reply::Note(err.to_string()),
        }
    }

    pub async fn execute(&mut self, command: ShellCommand) -> Reply {
        debug!(?command, "shell command");
        match command {
            ShellCommand::Bound { lat, lng } => {
                self.map.bounds.push(GeoPoint::new(lat, lng));
                Reply::Note(format!("{} search-area corner(s)", self.map.bounds.len()))
            }
            ShellCommand::Marker { lat, lng } => {
                self.map.markers.push(GeoPoint::new(lat, lng));
                Reply::Note(format!("{} waypoint(s)", self.map.markers.len()))
            }
            ShellCommand::Clear => {
                self.map.bounds.clear();
                self.map.markers.clear();
                Reply::Note("map cleared".to_string())
            }
            ShellCommand::Edit => {
                self.map.editing = true;
                Reply::Note("map unlocked for editing".to_string())
            }
            ShellCommand::Lock => {
                self.map.editing = false;
                Reply::Note("map locked".to_string())
            }
            ShellCommand::Auto => {
                dispatch_reply(self.session.dispatcher().dispatch_bounds(&self.map).await)
            }
            ShellCommand::Manual => {
                dispatch_reply(self.session.dispatcher().dispatch_markers(&self.map).await)
            }
            ShellCommand::TrackUser => {
                dispatch_reply(self.session.dispatcher().begin_user_tracking().await)
            }
            ShellCommand::TrackObject { method } => {
                let _ = self
                    .session
                    .dispatcher()
                    .begin_object_tracking(method.into())
                    .await;
                Reply::Quiet
            }
            ShellCommand::Stop => {
                let _ = self.session.dispatcher().all_stop().await;
                Reply::Quiet
            }
            ShellCommand::CameraMode => {
                let _ = self.session.camera().cycle().await;
                Reply::Quiet
            }
            ShellCommand::LearningSize { change } => {
                let decrease = change == LearningWindowChange::Shrink;
                let _ = self.session.calibration().set_learning_size(decrease).await;
                Reply::Quiet
            }
            ShellCommand::Learn => {
                let _ = self.session.calibration().learn().await;
                Reply::Quiet
            }
            ShellCommand::Calibrate {
                hue_min,
                hue_max,
                sat_min,
                sat_max,
                val_min,
                val_max,
            } => {
                self.panel.write_ranges(CalibrationRanges {
                    hue: ChannelRange::new(hue_min, hue_max),
                    saturation: ChannelRange::new(sat_min, sat_max),
                    value: ChannelRange::new(val_min, val_max),
                });
                let _ = self.session.calibration().apply().await;
                Reply::Quiet
            }
            ShellCommand::Threshold => {
                let _ = self.session.threshold().toggle().await;
                let state = if self.session.threshold().is_shown() {
                    "shown"
                } else {
                    "hidden"
                };
                Reply::Note(format!("learning threshold {state}"))
            }
            ShellCommand::Show => Reply::Note(self.describe()),
            ShellCommand::Quit => Reply::Quit,
        }
    }

    fn describe(&self) -> String {
        let ranges = self.panel.read_ranges();
        format!(
            "editing: {}\nsearch area: {:?}\nwaypoints: {:?}\nnext camera mode: {}\n\
             calibration: {}\nlearning threshold shown: {}",
            self.map.editing,
            self.map
                .bounds
                .iter()
                .map(|point| (point.lat, point.lng))
                .collect::<Vec<_>>(),
            self.map
                .markers
                .iter()
                .map(|point| (point.lat, point.lng))
                .collect::<Vec<_>>(),
            self.session.camera().next_mode().label(),
            format_ranges(&ranges),
            self.session.threshold().is_shown(),
        )
    }
}

pub fn format_ranges(ranges: &CalibrationRanges) -> String {
    format!(
        "hue {}..{} sat {}..{} val {}..{}",
        ranges.hue.min,
        ranges.hue.max,
        ranges.saturation.min,
        ranges.saturation.max,
        ranges.value.min,
        ranges.value.max
    )
}

fn dispatch_reply<E>(result: Result<Dispatch, E>) -> Reply {
    match result {
        Ok(Dispatch::Skipped(reason)) => Reply::Note(format!("not sent: {reason}")),
        Ok(Dispatch::Sent(_)) | Err(_) => Reply::Quiet,
    }
}

#[cfg(test)]
#[path = "tests/shell_tests.rs"]
mod tests;

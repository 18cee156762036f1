use std::{fmt, sync::Arc};

use shared::{
    domain::{GeoPoint, TrackMethod},
    error::CommandError,
    protocol::{Action, Command, CommandPayload, RawResponse},
};
use tracing::{debug, info};

use crate::{codec::package_coordinates, CommandChannel};

/// A search area is drawn as two opposite corners.
pub const SEARCH_AREA_CORNERS: usize = 2;

/// What the map widget currently holds.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MapState {
    pub editing: bool,
    pub bounds: Vec<GeoPoint>,
    pub markers: Vec<GeoPoint>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    Editing,
    BoundsIncomplete { corners: usize },
    NoMarkers,
    GeolocationUnavailable,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::Editing => f.write_str("map is still being edited"),
            SkipReason::BoundsIncomplete { corners } => write!(
                f,
                "search area needs {SEARCH_AREA_CORNERS} corners, {corners} drawn"
            ),
            SkipReason::NoMarkers => f.write_str("no waypoints placed"),
            SkipReason::GeolocationUnavailable => f.write_str("geolocation is unavailable"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Dispatch {
    Sent(RawResponse),
    Skipped(SkipReason),
}

impl Dispatch {
    pub fn is_sent(&self) -> bool {
        matches!(self, Dispatch::Sent(_))
    }
}

pub struct SequencedDispatcher {
    channel: Arc<dyn CommandChannel>,
    geolocation_available: bool,
}

impl SequencedDispatcher {
    pub fn new(channel: Arc<dyn CommandChannel>, geolocation_available: bool) -> Self {
        Self {
            channel,
            geolocation_available,
        }
    }

    /// Uploads the search-area corners and, once the controller has taken
    /// them, starts the autonomous search pattern.
    pub async fn dispatch_bounds(&self, map: &MapState) -> Result<Dispatch, CommandError> {
        if map.editing {
            return Ok(skipped(Action::BeginAuto, SkipReason::Editing));
        }
        if map.bounds.len() != SEARCH_AREA_CORNERS {
            return Ok(skipped(
                Action::BeginAuto,
                SkipReason::BoundsIncomplete {
                    corners: map.bounds.len(),
                },
            ));
        }
        self.upload_then_begin(&map.bounds, Action::BeginAuto)
            .await
            .map(Dispatch::Sent)
    }

    /// Uploads the placed waypoints and, once the controller has taken them,
    /// starts waypoint navigation.
    pub async fn dispatch_markers(&self, map: &MapState) -> Result<Dispatch, CommandError> {
        if map.editing {
            return Ok(skipped(Action::BeginManual, SkipReason::Editing));
        }
        if map.markers.is_empty() {
            return Ok(skipped(Action::BeginManual, SkipReason::NoMarkers));
        }
        self.upload_then_begin(&map.markers, Action::BeginManual)
            .await
            .map(Dispatch::Sent)
    }

    pub async fn begin_user_tracking(&self) -> Result<Dispatch, CommandError> {
        if !self.geolocation_available {
            return Ok(skipped(
                Action::BeginUserTracking,
                SkipReason::GeolocationUnavailable,
            ));
        }
        self.channel
            .send(Command::bare(Action::BeginUserTracking))
            .await
            .map(Dispatch::Sent)
    }

    pub async fn all_stop(&self) -> Result<RawResponse, CommandError> {
        info!("sending all stop");
        self.channel.send(Command::bare(Action::AllStop)).await
    }

    pub async fn begin_object_tracking(
        &self,
        method: TrackMethod,
    ) -> Result<RawResponse, CommandError> {
        self.channel
            .send(Command::integer(Action::BeginObjectTracking, method.code()))
            .await
    }

    async fn upload_then_begin(
        &self,
        points: &[GeoPoint],
        follow_up: Action,
    ) -> Result<RawResponse, CommandError> {
        let waypoints = package_coordinates(Some(points));
        info!(points = waypoints.len(), %follow_up, "uploading waypoints");
        self.channel
            .send(Command::with_payload(
                Action::UpdateWaypoints,
                CommandPayload::Waypoints(waypoints),
            ))
            .await?;
        self.channel.send(Command::bare(follow_up)).await
    }
}

fn skipped(action: Action, reason: SkipReason) -> Dispatch {
    debug!(%action, %reason, "dispatch skipped");
    Dispatch::Skipped(reason)
}

#[cfg(test)]
#[path = "tests/dispatcher_tests.rs"]
mod tests;

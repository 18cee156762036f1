use serde::{Deserialize, Serialize};

/// Anything the map widget hands over that sits at a latitude/longitude.
pub trait GeoLocated {
    fn lat(&self) -> f64;
    fn lng(&self) -> f64;
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lng: f64,
}

impl GeoPoint {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }
}

impl GeoLocated for GeoPoint {
    fn lat(&self) -> f64 {
        self.lat
    }

    fn lng(&self) -> f64 {
        self.lng
    }
}

pub const UNKNOWN_CAMERA_MODE_LABEL: &str = "Unknown mode";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CameraMode {
    NoProcessing,
    CentreOfMass,
    Camshift,
    ConnectedComponents,
    ColourTraining,
}

impl CameraMode {
    /// The order the console steps through when the operator cycles modes.
    pub const CYCLE: [CameraMode; 5] = [
        CameraMode::NoProcessing,
        CameraMode::CentreOfMass,
        CameraMode::Camshift,
        CameraMode::ConnectedComponents,
        CameraMode::ColourTraining,
    ];

    pub fn code(self) -> i64 {
        match self {
            CameraMode::NoProcessing => 0,
            CameraMode::CentreOfMass => 1,
            CameraMode::Camshift => 2,
            CameraMode::ConnectedComponents => 3,
            CameraMode::ColourTraining => 999,
        }
    }

    pub fn from_code(code: i64) -> Option<Self> {
        Self::CYCLE.into_iter().find(|mode| mode.code() == code)
    }

    pub fn label(self) -> &'static str {
        match self {
            CameraMode::NoProcessing => "No processing",
            CameraMode::CentreOfMass => "Centre of mass",
            CameraMode::Camshift => "Camshift",
            CameraMode::ConnectedComponents => "Connected components",
            CameraMode::ColourTraining => "Colour training",
        }
    }

    pub fn label_for_code(code: i64) -> &'static str {
        Self::from_code(code)
            .map(Self::label)
            .unwrap_or(UNKNOWN_CAMERA_MODE_LABEL)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrackMethod {
    Strafe,
    Rotate,
}

impl TrackMethod {
    pub fn code(self) -> i64 {
        match self {
            TrackMethod::Strafe => 0,
            TrackMethod::Rotate => 1,
        }
    }
}

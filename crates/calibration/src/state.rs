//! Calibration states and their display metadata

use serde::{Deserialize, Serialize};
use std::fmt;

/// Raw calibration state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CalibrationState {
    /// No face in view
    #[default]
    NoFace,
    /// Face in view, writing hand not on the practice surface
    NoHands,
    /// Too close to (or far from) the camera
    Misaligned,
    /// Spine or head outside thresholds
    BadPosture,
    /// Everything in place
    Aligned,
}

impl CalibrationState {
    pub fn is_aligned(self) -> bool {
        self == CalibrationState::Aligned
    }
}

impl fmt::Display for CalibrationState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(display_for(*self).label)
    }
}

/// Status indicator color
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusColor {
    Red,
    Orange,
    Yellow,
    Green,
}

/// What the presentation layer shows for a state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StatusDisplay {
    pub label: &'static str,
    pub message: &'static str,
    pub color: StatusColor,
}

/// Map a state to its display metadata
pub fn display_for(state: CalibrationState) -> StatusDisplay {
    match state {
        CalibrationState::NoFace => StatusDisplay {
            label: "no_face",
            message: "Sit in front of the camera so your face is visible",
            color: StatusColor::Red,
        },
        CalibrationState::NoHands => StatusDisplay {
            label: "no_hands",
            message: "Place your writing hand on the paper",
            color: StatusColor::Orange,
        },
        CalibrationState::Misaligned => StatusDisplay {
            label: "misaligned",
            message: "Move back to a comfortable distance from the camera",
            color: StatusColor::Yellow,
        },
        CalibrationState::BadPosture => StatusDisplay {
            label: "bad_posture",
            message: "Sit up straight and keep your head level",
            color: StatusColor::Yellow,
        },
        CalibrationState::Aligned => StatusDisplay {
            label: "aligned",
            message: "Great, hold this position",
            color: StatusColor::Green,
        },
    }
}

//! sensor.raw_event.v1 schema definition
//!
//! Raw event shapes for the two push channels:
//! - Motion events: up to two acceleration vectors plus a rotation-rate
//!   triplet, any of which a given platform may omit
//! - Orientation events: euler angles, an absolute flag, and an optional
//!   magnetic heading that some platforms report instead of an absolute alpha
//!
//! camelCase vendor spellings are accepted via serde aliases so recorded
//! browser events deserialize unchanged.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::EngineError;

/// Current schema version
pub const SCHEMA_VERSION: &str = "sensor.raw_event.v1";

/// Three-axis reading whose axes may each be missing or null
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct RawVector {
    #[serde(default)]
    pub x: Option<f64>,
    #[serde(default)]
    pub y: Option<f64>,
    #[serde(default)]
    pub z: Option<f64>,
}

/// Rotation rate in the sensor's native euler axes (degrees/second)
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct RawRotationRate {
    #[serde(default)]
    pub alpha: Option<f64>,
    #[serde(default)]
    pub beta: Option<f64>,
    #[serde(default)]
    pub gamma: Option<f64>,
}

/// Raw motion event as delivered by the platform bridge
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct RawMotionEvent {
    /// Capture time; arrival time is used when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<DateTime<Utc>>,
    /// Acceleration with gravity folded in (preferred source)
    #[serde(
        default,
        alias = "accelerationIncludingGravity",
        skip_serializing_if = "Option::is_none"
    )]
    pub acceleration_including_gravity: Option<RawVector>,
    /// Acceleration with gravity removed (fallback source)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub acceleration: Option<RawVector>,
    /// Rotation rate in native euler axes
    #[serde(default, alias = "rotationRate", skip_serializing_if = "Option::is_none")]
    pub rotation_rate: Option<RawRotationRate>,
    /// Vendor-reported sampling interval in seconds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interval: Option<f64>,
}

/// Raw orientation event as delivered by the platform bridge
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct RawOrientationEvent {
    /// Capture time; arrival time is used when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<DateTime<Utc>>,
    /// Rotation around the z axis in degrees; possibly relative to an
    /// arbitrary reference, see `compass_heading`
    #[serde(default)]
    pub alpha: Option<f64>,
    /// Front-back tilt in degrees
    #[serde(default)]
    pub beta: Option<f64>,
    /// Left-right tilt in degrees
    #[serde(default)]
    pub gamma: Option<f64>,
    /// Whether the platform flags alpha as magnetic-north-referenced
    #[serde(default)]
    pub absolute: Option<bool>,
    /// Magnetic compass heading in degrees; overrides alpha when present
    #[serde(
        default,
        alias = "webkitCompassHeading",
        skip_serializing_if = "Option::is_none"
    )]
    pub compass_heading: Option<f64>,
}

/// Envelope tagging which channel an event arrived on, used by NDJSON
/// streams and the FFI bridge
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "channel", rename_all = "lowercase")]
pub enum RawSensorEvent {
    Motion(RawMotionEvent),
    Orientation(RawOrientationEvent),
}

impl RawSensorEvent {
    /// Parse a single tagged event from its JSON representation
    pub fn from_json(json: &str) -> Result<Self, EngineError> {
        serde_json::from_str(json)
            .map_err(|e| EngineError::ParseError(format!("Failed to parse sensor event: {}", e)))
    }
}

//! Core types for the Sensorium engine
//!
//! This module defines the data structures that flow through the engine:
//! canonical samples, the permission state machine, the retained chart
//! history point, and the read-only snapshot consumed by the display layer.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Sensor capability gated behind platform consent
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Capability {
    Orientation,
    Motion,
}

impl Capability {
    pub fn as_str(&self) -> &'static str {
        match self {
            Capability::Orientation => "orientation",
            Capability::Motion => "motion",
        }
    }

    /// The event channel this capability unlocks
    pub fn channel(&self) -> SensorChannel {
        match self {
            Capability::Orientation => SensorChannel::Orientation,
            Capability::Motion => SensorChannel::Motion,
        }
    }
}

/// Push-based sensor event channel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SensorChannel {
    Motion,
    Orientation,
}

impl SensorChannel {
    pub fn as_str(&self) -> &'static str {
        match self {
            SensorChannel::Motion => "motion",
            SensorChannel::Orientation => "orientation",
        }
    }

    /// Resolve a channel from its wire name
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "motion" => Some(SensorChannel::Motion),
            "orientation" => Some(SensorChannel::Orientation),
            _ => None,
        }
    }
}

/// Authorization state for the sensor capabilities as a whole
///
/// `Unknown` is the initial state whenever the platform requires an explicit
/// gesture-triggered grant. `Granted` means at least one capability is live.
/// `Denied` means every capability was refused; a fresh `request_access` call
/// is the only way out. `NotSupported` is reserved for embedders that detect
/// the platform exposes neither event channel at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PermissionState {
    Unknown,
    Granted,
    Denied,
    NotSupported,
}

impl PermissionState {
    pub fn as_str(&self) -> &'static str {
        match self {
            PermissionState::Unknown => "unknown",
            PermissionState::Granted => "granted",
            PermissionState::Denied => "denied",
            PermissionState::NotSupported => "notsupported",
        }
    }
}

/// Whether the platform demands an explicit, gesture-bound consent step
/// before the event channels may be subscribed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ConsentRequirement {
    NoConsentNeeded,
    ConsentRequired,
}

/// Outcome of a single capability's consent call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConsentOutcome {
    Granted,
    Denied,
}

/// Acceleration reading in meters/second², gravity included when the source
/// provides it. Produced once per motion event; immutable once created.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AccelerationSample {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

/// Rotation rate in degrees/second on the canonical x/y/z axes.
///
/// The sensor reports euler-named axes; the channel adapter remaps them as
/// beta→x, gamma→y, alpha→z before this type is constructed.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RotationRateSample {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

/// Orientation angles in degrees plus the heading reference.
///
/// `is_absolute` is true when `alpha` is referenced to magnetic north,
/// either because the event carried a magnetic heading or because the
/// platform flagged its alpha as absolute.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OrientationSample {
    pub alpha: f64,
    pub beta: f64,
    pub gamma: f64,
    pub is_absolute: bool,
}

/// Retained acceleration sample tagged with its capture time; lives only in
/// the rolling chart buffer
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HistoryPoint {
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub timestamp: DateTime<Utc>,
}

/// Producer block stamped into every snapshot for provenance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnapshotProducer {
    pub name: String,
    pub version: String,
    pub instance_id: String,
}

/// Read-only view of the engine's derived state.
///
/// The display layer must treat every field as a point-in-time value; the
/// engine never hands out mutable access. `history` is ordered oldest to
/// newest. Ages are `None` until the first event arrives on a channel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineSnapshot {
    pub producer: SnapshotProducer,
    pub permission_state: PermissionState,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub acceleration: Option<AccelerationSample>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rotation_rate: Option<RotationRateSample>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub orientation: Option<OrientationSample>,
    pub history: Vec<HistoryPoint>,
    /// Milliseconds since the last motion event, relative to `captured_at`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub motion_age_ms: Option<i64>,
    /// Milliseconds since the last orientation event, relative to `captured_at`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub orientation_age_ms: Option<i64>,
    pub captured_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_permission_state_serialization() {
        let json = serde_json::to_string(&PermissionState::NotSupported).unwrap();
        assert_eq!(json, "\"notsupported\"");

        let parsed: PermissionState = serde_json::from_str("\"denied\"").unwrap();
        assert_eq!(parsed, PermissionState::Denied);
    }

    #[test]
    fn test_consent_requirement_serialization() {
        let json = serde_json::to_string(&ConsentRequirement::ConsentRequired).unwrap();
        assert_eq!(json, "\"consent-required\"");

        let json = serde_json::to_string(&ConsentRequirement::NoConsentNeeded).unwrap();
        assert_eq!(json, "\"no-consent-needed\"");
    }

    #[test]
    fn test_capability_maps_to_channel() {
        assert_eq!(Capability::Motion.channel(), SensorChannel::Motion);
        assert_eq!(Capability::Orientation.channel(), SensorChannel::Orientation);
    }

    #[test]
    fn test_channel_from_name() {
        assert_eq!(SensorChannel::from_name("motion"), Some(SensorChannel::Motion));
        assert_eq!(
            SensorChannel::from_name("orientation"),
            Some(SensorChannel::Orientation)
        );
        assert_eq!(SensorChannel::from_name("compass"), None);
    }
}

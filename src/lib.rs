//! Sensorium - sensor acquisition and normalization engine for live device
//! dashboards
//!
//! Sensorium turns a handheld device's raw motion and orientation event
//! streams into a coherent, bounded view a display layer can render:
//! permission negotiation → channel lifecycle → normalization → derived
//! state.
//!
//! ## Modules
//!
//! - **Gate**: gesture-bound consent negotiation for the two capabilities
//! - **Channel**: subscription lifecycle and raw-event normalization
//! - **Reducer**: instantaneous readouts plus the throttled chart window
//! - **Engine**: the embeddable orchestration object with a snapshot API

pub mod channel;
pub mod engine;
pub mod error;
pub mod gate;
pub mod host;
pub mod reducer;
pub mod schema;
pub mod types;

// FFI bindings for C interop (always available for cdylib/staticlib builds)
pub mod ffi;

pub use engine::SensorEngine;
pub use error::EngineError;
pub use gate::PermissionGate;
pub use host::{SensorHost, UngatedHost};

// Schema exports
pub use schema::{RawMotionEvent, RawOrientationEvent, RawSensorEvent, SCHEMA_VERSION};

pub use types::{
    AccelerationSample, Capability, ConsentOutcome, ConsentRequirement, EngineSnapshot,
    HistoryPoint, OrientationSample, PermissionState, RotationRateSample, SensorChannel,
};

/// Engine version embedded in every snapshot
pub const ENGINE_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Producer name for snapshot provenance
pub const PRODUCER_NAME: &str = "sensorium";

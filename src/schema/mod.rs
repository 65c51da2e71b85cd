//! Raw inbound event schema
//!
//! This module defines the tolerant, vendor-agnostic shapes of the two
//! sensor event channels as the platform bridge delivers them. Every field
//! vendors disagree on is optional; the channel adapter resolves the
//! fallback order.

mod raw_event;

pub use raw_event::{
    RawMotionEvent, RawOrientationEvent, RawRotationRate, RawSensorEvent, RawVector,
    SCHEMA_VERSION,
};

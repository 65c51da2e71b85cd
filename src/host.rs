//! Platform seam
//!
//! The engine never reaches for platform globals; everything it needs from
//! the outside world sits behind the `SensorHost` trait: per-capability
//! consent entry points and handler registration for the two event channels.
//! Embedders implement it once per platform; tests implement it with
//! scripted doubles.

use crate::error::EngineError;
use crate::types::{Capability, ConsentOutcome, SensorChannel};

/// Platform hooks the engine drives during permission negotiation and
/// channel lifecycle
pub trait SensorHost {
    /// Whether the platform exposes an explicit consent entry point for this
    /// capability. Inspected without side effects.
    fn consent_required(&self, capability: Capability) -> bool;

    /// Invoke the capability's consent entry point and wait for its outcome.
    ///
    /// Called only for capabilities where `consent_required` returned true,
    /// and only from within a user gesture — platform policy the engine
    /// documents but cannot enforce. An `Err` is folded into that
    /// capability's denial by the gate.
    fn request_consent(&mut self, capability: Capability) -> Result<ConsentOutcome, EngineError>;

    /// Register the engine's handler for a channel
    fn register(&mut self, channel: SensorChannel);

    /// Unregister the engine's handler for a channel
    fn unregister(&mut self, channel: SensorChannel);
}

/// Host for platforms that never require explicit consent.
///
/// Both capabilities are implicitly available and registration is a no-op;
/// the embedder routes events straight into the engine's handlers. Used by
/// the replay CLI and the ungated FFI constructor.
#[derive(Debug, Clone, Copy, Default)]
pub struct UngatedHost;

impl SensorHost for UngatedHost {
    fn consent_required(&self, _capability: Capability) -> bool {
        false
    }

    fn request_consent(&mut self, capability: Capability) -> Result<ConsentOutcome, EngineError> {
        // No entry point exists, so the gate treats the capability as
        // implicitly granted and never reaches this.
        let _ = capability;
        Ok(ConsentOutcome::Granted)
    }

    fn register(&mut self, _channel: SensorChannel) {}

    fn unregister(&mut self, _channel: SensorChannel) {}
}

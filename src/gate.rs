//! Permission negotiation
//!
//! Orientation and motion sensing each carry an optional, gesture-bound
//! consent entry point, and the two exist independently: a platform may gate
//! both, one, or neither. The gate evaluates each capability on its own and
//! folds the results into a single state — any grant opens the engine, zero
//! grants deny it.

use log::warn;

use crate::host::SensorHost;
use crate::types::{Capability, ConsentOutcome, ConsentRequirement, PermissionState};

/// Capabilities in request order. Orientation is prompted first; the second
/// prompt runs only after the first resolves so the originating gesture
/// stays valid for both.
const CAPABILITIES: [Capability; 2] = [Capability::Orientation, Capability::Motion];

/// Permission state machine for the two sensor capabilities
#[derive(Debug, Clone)]
pub struct PermissionGate {
    state: PermissionState,
    granted: Vec<Capability>,
}

impl PermissionGate {
    /// Gate seeded with the platform's consent requirement.
    ///
    /// Platforms that never require explicit consent start and remain at
    /// `granted` with both capabilities available; gated platforms start at
    /// `unknown` until `request_access` runs.
    pub fn new(requirement: ConsentRequirement) -> Self {
        match requirement {
            ConsentRequirement::NoConsentNeeded => Self {
                state: PermissionState::Granted,
                granted: CAPABILITIES.to_vec(),
            },
            ConsentRequirement::ConsentRequired => Self {
                state: PermissionState::Unknown,
                granted: Vec::new(),
            },
        }
    }

    /// Gate for a platform that exposes neither sensor channel
    pub fn unsupported() -> Self {
        Self {
            state: PermissionState::NotSupported,
            granted: Vec::new(),
        }
    }

    /// Inspect the platform for explicit consent entry points. No side
    /// effects; either capability having one makes the whole flow gated.
    pub fn check_requirement(host: &dyn SensorHost) -> ConsentRequirement {
        if CAPABILITIES.iter().any(|c| host.consent_required(*c)) {
            ConsentRequirement::ConsentRequired
        } else {
            ConsentRequirement::NoConsentNeeded
        }
    }

    /// Run the consent flow for both capabilities and fold the outcomes.
    ///
    /// Must be invoked from within a user gesture; platforms may silently
    /// reject prompts triggered outside one. The two consent calls run
    /// sequentially, never concurrently. A capability without an entry
    /// point is implicitly granted. A consent call that fails is logged and
    /// treated as that capability's denial without aborting the other.
    ///
    /// Safe to repeat: a retry from `denied` is a fresh evaluation, and a
    /// repeat after `granted` re-derives the same grant set.
    pub fn request_access(&mut self, host: &mut dyn SensorHost) -> PermissionState {
        if self.state == PermissionState::NotSupported {
            return self.state;
        }

        let mut outcomes = Vec::with_capacity(CAPABILITIES.len());
        for capability in CAPABILITIES {
            let outcome = if !host.consent_required(capability) {
                ConsentOutcome::Granted
            } else {
                match host.request_consent(capability) {
                    Ok(outcome) => outcome,
                    Err(err) => {
                        warn!(
                            "consent request for {} failed: {}",
                            capability.as_str(),
                            err
                        );
                        ConsentOutcome::Denied
                    }
                }
            };
            outcomes.push((capability, outcome));
        }

        self.apply_outcomes(&outcomes)
    }

    /// Fold per-capability consent outcomes into the overall state: any
    /// grant wins, zero grants deny.
    ///
    /// Embedders that drive the platform prompts themselves report results
    /// here instead of through `request_access`.
    pub fn apply_outcomes(
        &mut self,
        outcomes: &[(Capability, ConsentOutcome)],
    ) -> PermissionState {
        if self.state == PermissionState::NotSupported {
            return self.state;
        }

        self.granted = outcomes
            .iter()
            .filter(|(_, outcome)| *outcome == ConsentOutcome::Granted)
            .map(|(capability, _)| *capability)
            .collect();

        self.state = if self.granted.is_empty() {
            PermissionState::Denied
        } else {
            PermissionState::Granted
        };
        self.state
    }

    pub fn state(&self) -> PermissionState {
        self.state
    }

    /// Capabilities granted by the latest evaluation, in request order
    pub fn granted_capabilities(&self) -> &[Capability] {
        &self.granted
    }
}

//! Engine orchestration
//!
//! `SensorEngine` wires the permission gate, the channel adapter, and the
//! sample reducer into the single object a display layer embeds: consent
//! negotiation in, raw events in, value snapshots out. The model is
//! single-threaded and cooperative — event handlers run to completion, are
//! never re-entered, and the only suspension point is inside the platform's
//! consent prompts.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::channel::{
    normalize_acceleration, normalize_orientation, normalize_rotation_rate, ChannelAdapter,
    ChannelSubscription,
};
use crate::gate::PermissionGate;
use crate::host::SensorHost;
use crate::reducer::SampleReducer;
use crate::schema::{RawMotionEvent, RawOrientationEvent, RawSensorEvent};
use crate::types::{
    Capability, ConsentOutcome, ConsentRequirement, EngineSnapshot, PermissionState,
    SensorChannel, SnapshotProducer,
};
use crate::{ENGINE_VERSION, PRODUCER_NAME};

/// Sensor acquisition engine: permission negotiation, channel lifecycle,
/// normalization, and derived state behind a read-only snapshot API
#[derive(Debug)]
pub struct SensorEngine {
    gate: PermissionGate,
    channels: ChannelAdapter,
    reducer: SampleReducer,
    instance_id: Uuid,
}

impl SensorEngine {
    /// Create an engine against the given platform host.
    ///
    /// Platforms without an explicit consent step are live immediately: both
    /// channels attach and the state starts at `granted`. Gated platforms
    /// start at `unknown` with nothing attached until `request_access`
    /// succeeds.
    pub fn new(host: &mut dyn SensorHost) -> Self {
        let requirement = PermissionGate::check_requirement(host);
        let mut engine = Self::with_requirement(requirement);
        if requirement == ConsentRequirement::NoConsentNeeded {
            engine
                .channels
                .attach(host, &[SensorChannel::Motion, SensorChannel::Orientation]);
        }
        engine
    }

    /// Engine seeded with a known consent requirement, without touching a
    /// host. Gated embedders (FFI) that run the platform prompts themselves
    /// start here and report outcomes via `apply_consent_outcomes`.
    pub fn with_requirement(requirement: ConsentRequirement) -> Self {
        Self {
            gate: PermissionGate::new(requirement),
            channels: ChannelAdapter::new(),
            reducer: SampleReducer::new(),
            instance_id: Uuid::new_v4(),
        }
    }

    /// Engine for a platform that exposes neither sensor channel
    pub fn unsupported() -> Self {
        Self {
            gate: PermissionGate::unsupported(),
            channels: ChannelAdapter::new(),
            reducer: SampleReducer::new(),
            instance_id: Uuid::new_v4(),
        }
    }

    /// Engine with a custom chart window size
    pub fn with_history_capacity(host: &mut dyn SensorHost, capacity: usize) -> Self {
        let mut engine = Self::new(host);
        engine.reducer = SampleReducer::with_history_capacity(capacity);
        engine
    }

    /// Run the consent flow and (re)attach the granted channels.
    ///
    /// Gesture-bound: platforms may silently reject prompts triggered
    /// outside a user interaction; callers own that constraint. Safe to
    /// repeat — already-attached channels stay attached exactly once, and a
    /// denied state can be retried.
    pub fn request_access(&mut self, host: &mut dyn SensorHost) -> PermissionState {
        let state = self.gate.request_access(host);
        self.sync_channels(host);
        state
    }

    /// Fold consent outcomes reported by an embedder that drove the
    /// platform prompts itself, then (re)attach the granted channels.
    /// Capabilities missing from `outcomes` count as denied.
    pub fn apply_consent_outcomes(
        &mut self,
        host: &mut dyn SensorHost,
        outcomes: &[(Capability, ConsentOutcome)],
    ) -> PermissionState {
        let state = self.gate.apply_outcomes(outcomes);
        self.sync_channels(host);
        state
    }

    /// Align attached channels with the granted capability set. An
    /// unchanged set is a guarded no-op; a changed set detaches first so
    /// handlers never accumulate; an empty set tears everything down.
    fn sync_channels(&mut self, host: &mut dyn SensorHost) {
        let wanted: Vec<SensorChannel> = self
            .gate
            .granted_capabilities()
            .iter()
            .map(|c| c.channel())
            .collect();

        if wanted.is_empty() {
            self.channels.detach(host);
            return;
        }

        let target = ChannelSubscription::from_channels(&wanted);
        if self.channels.subscription() != target && !self.channels.subscription().is_empty() {
            self.channels.detach(host);
        }
        self.channels.attach(host, &wanted);
    }

    /// Inbound motion event.
    ///
    /// Events on an unattached channel are dropped, which keeps the
    /// no-samples-before-grant invariant mechanical. A malformed event
    /// still counts as channel liveness but updates no derived state.
    pub fn handle_motion(&mut self, event: &RawMotionEvent) {
        if !self.channels.is_attached(SensorChannel::Motion) {
            return;
        }
        let at = event.timestamp.unwrap_or_else(Utc::now);
        self.channels.note_motion(at);

        if let Some(sample) = normalize_acceleration(event) {
            self.reducer.apply_acceleration(sample, at);
        }
        if let Some(rate) = normalize_rotation_rate(event) {
            self.reducer.apply_rotation_rate(rate);
        }
    }

    /// Inbound orientation event; same dropping and liveness rules as
    /// `handle_motion`
    pub fn handle_orientation(&mut self, event: &RawOrientationEvent) {
        if !self.channels.is_attached(SensorChannel::Orientation) {
            return;
        }
        let at = event.timestamp.unwrap_or_else(Utc::now);
        self.channels.note_orientation(at);

        if let Some(sample) = normalize_orientation(event) {
            self.reducer.apply_orientation(sample);
        }
    }

    /// Inbound event from a tagged stream (NDJSON replay, FFI bridge)
    pub fn handle_event(&mut self, event: &RawSensorEvent) {
        match event {
            RawSensorEvent::Motion(motion) => self.handle_motion(motion),
            RawSensorEvent::Orientation(orientation) => self.handle_orientation(orientation),
        }
    }

    /// Tear down both subscriptions. Safe at any time, twice included.
    pub fn detach(&mut self, host: &mut dyn SensorHost) {
        self.channels.detach(host);
    }

    pub fn permission_state(&self) -> PermissionState {
        self.gate.state()
    }

    /// Channels currently holding a registered handler
    pub fn attached_channels(&self) -> Vec<SensorChannel> {
        self.channels.attached_channels()
    }

    /// Value snapshot of the derived state as of the given instant.
    ///
    /// Readers get owned data; nothing here can observe a half-applied
    /// fold, since folds run to completion on the single event thread.
    pub fn snapshot(&self, as_of: DateTime<Utc>) -> EngineSnapshot {
        EngineSnapshot {
            producer: SnapshotProducer {
                name: PRODUCER_NAME.to_string(),
                version: ENGINE_VERSION.to_string(),
                instance_id: self.instance_id.to_string(),
            },
            permission_state: self.gate.state(),
            acceleration: self.reducer.acceleration(),
            rotation_rate: self.reducer.rotation_rate(),
            orientation: self.reducer.orientation(),
            history: self.reducer.history().to_vec(),
            motion_age_ms: self
                .channels
                .motion_age(as_of)
                .map(|d| d.num_milliseconds()),
            orientation_age_ms: self
                .channels
                .orientation_age(as_of)
                .map(|d| d.num_milliseconds()),
            captured_at: as_of,
        }
    }

    /// Snapshot against the current wall clock
    pub fn snapshot_now(&self) -> EngineSnapshot {
        self.snapshot(Utc::now())
    }
}

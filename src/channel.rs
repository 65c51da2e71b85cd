//! Event channel lifecycle and normalization
//!
//! Owns the subscription guard for the two push channels and translates raw
//! events into canonical samples, shielding the rest of the engine from
//! missing-field and cross-vendor inconsistencies. Each field that differs
//! across platforms resolves through an explicit, ordered fallback chain
//! rather than dynamic probing.

use chrono::{DateTime, Duration, Utc};
use log::debug;

use crate::host::SensorHost;
use crate::schema::{RawMotionEvent, RawOrientationEvent};
use crate::types::{AccelerationSample, OrientationSample, RotationRateSample, SensorChannel};

/// Guard recording which channels currently hold a registered handler.
///
/// Prevents duplicate registration across repeated permission grants or
/// re-initialization.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ChannelSubscription {
    motion: bool,
    orientation: bool,
}

impl ChannelSubscription {
    pub fn contains(&self, channel: SensorChannel) -> bool {
        match channel {
            SensorChannel::Motion => self.motion,
            SensorChannel::Orientation => self.orientation,
        }
    }

    pub fn is_empty(&self) -> bool {
        !self.motion && !self.orientation
    }

    /// Subscription covering exactly the given channels
    pub fn from_channels(channels: &[SensorChannel]) -> Self {
        let mut subscription = Self::default();
        for &channel in channels {
            subscription.set(channel, true);
        }
        subscription
    }

    /// Attached channels in a fixed motion-then-orientation order
    pub fn channels(&self) -> Vec<SensorChannel> {
        let mut channels = Vec::new();
        if self.motion {
            channels.push(SensorChannel::Motion);
        }
        if self.orientation {
            channels.push(SensorChannel::Orientation);
        }
        channels
    }

    fn set(&mut self, channel: SensorChannel, attached: bool) {
        match channel {
            SensorChannel::Motion => self.motion = attached,
            SensorChannel::Orientation => self.orientation = attached,
        }
    }
}

/// Adapter owning the two sensor event subscriptions and the per-channel
/// liveness instants
#[derive(Debug, Clone, Default)]
pub struct ChannelAdapter {
    subscription: ChannelSubscription,
    last_motion_at: Option<DateTime<Utc>>,
    last_orientation_at: Option<DateTime<Utc>>,
}

impl ChannelAdapter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register handlers for the given channels.
    ///
    /// Guarded per channel: a channel that is already attached is left
    /// alone, so repeated grants never accumulate duplicate handlers.
    pub fn attach(&mut self, host: &mut dyn SensorHost, channels: &[SensorChannel]) {
        for &channel in channels {
            if self.subscription.contains(channel) {
                continue;
            }
            host.register(channel);
            self.subscription.set(channel, true);
            debug!("attached {} channel", channel.as_str());
        }
    }

    /// Unregister every attached handler.
    ///
    /// Safe from any teardown path: immediately after `attach`, before any
    /// event has arrived, or when nothing is attached (a second call is a
    /// no-op).
    pub fn detach(&mut self, host: &mut dyn SensorHost) {
        for channel in [SensorChannel::Motion, SensorChannel::Orientation] {
            if !self.subscription.contains(channel) {
                continue;
            }
            host.unregister(channel);
            self.subscription.set(channel, false);
            debug!("detached {} channel", channel.as_str());
        }
    }

    pub fn is_attached(&self, channel: SensorChannel) -> bool {
        self.subscription.contains(channel)
    }

    pub fn subscription(&self) -> ChannelSubscription {
        self.subscription
    }

    pub fn attached_channels(&self) -> Vec<SensorChannel> {
        self.subscription.channels()
    }

    /// Record arrival of a motion event, malformed or not — arrival is
    /// liveness.
    pub fn note_motion(&mut self, at: DateTime<Utc>) {
        self.last_motion_at = Some(at);
    }

    /// Record arrival of an orientation event, malformed or not
    pub fn note_orientation(&mut self, at: DateTime<Utc>) {
        self.last_orientation_at = Some(at);
    }

    /// Elapsed time since the most recent motion event, if any arrived
    pub fn motion_age(&self, as_of: DateTime<Utc>) -> Option<Duration> {
        self.last_motion_at.map(|at| as_of - at)
    }

    /// Elapsed time since the most recent orientation event, if any arrived
    pub fn orientation_age(&self, as_of: DateTime<Utc>) -> Option<Duration> {
        self.last_orientation_at.map(|at| as_of - at)
    }
}

/// Extract an acceleration sample from a motion event.
///
/// Fallback order: the gravity-inclusive vector wins, the gravity-exclusive
/// vector is second, and an event carrying neither yields no sample. Axes
/// that are present but null read as 0.
pub fn normalize_acceleration(event: &RawMotionEvent) -> Option<AccelerationSample> {
    let vector = event.acceleration_including_gravity.or(event.acceleration)?;
    Some(AccelerationSample {
        x: vector.x.unwrap_or(0.0),
        y: vector.y.unwrap_or(0.0),
        z: vector.z.unwrap_or(0.0),
    })
}

/// Extract a rotation-rate sample from a motion event.
///
/// The sensor reports euler-named axes; they map onto the canonical frame as
/// beta→x, gamma→y, alpha→z. A naming convention, not a measurement
/// transform.
pub fn normalize_rotation_rate(event: &RawMotionEvent) -> Option<RotationRateSample> {
    let rate = event.rotation_rate?;
    Some(RotationRateSample {
        x: rate.beta.unwrap_or(0.0),
        y: rate.gamma.unwrap_or(0.0),
        z: rate.alpha.unwrap_or(0.0),
    })
}

/// Extract an orientation sample from an orientation event.
///
/// A non-null magnetic heading overrides alpha and forces the absolute
/// flag: the compass reference takes precedence over the generic, possibly
/// relative, alpha field. Otherwise alpha is used as-is and the flag mirrors
/// the event's own absolute field. An event with no angle and no heading
/// yields no sample.
pub fn normalize_orientation(event: &RawOrientationEvent) -> Option<OrientationSample> {
    if event.alpha.is_none()
        && event.beta.is_none()
        && event.gamma.is_none()
        && event.compass_heading.is_none()
    {
        return None;
    }

    let (alpha, is_absolute) = match event.compass_heading {
        Some(heading) => (heading, true),
        None => (event.alpha.unwrap_or(0.0), event.absolute.unwrap_or(false)),
    };

    Some(OrientationSample {
        alpha,
        beta: event.beta.unwrap_or(0.0),
        gamma: event.gamma.unwrap_or(0.0),
        is_absolute,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::EngineError;
    use crate::schema::{RawRotationRate, RawVector};
    use crate::types::{Capability, ConsentOutcome};
    use chrono::TimeZone;

    /// Host double that counts register/unregister calls per channel
    #[derive(Default)]
    struct CountingHost {
        registers: Vec<SensorChannel>,
        unregisters: Vec<SensorChannel>,
    }

    impl SensorHost for CountingHost {
        fn consent_required(&self, _capability: Capability) -> bool {
            false
        }

        fn request_consent(
            &mut self,
            _capability: Capability,
        ) -> Result<ConsentOutcome, EngineError> {
            Ok(ConsentOutcome::Granted)
        }

        fn register(&mut self, channel: SensorChannel) {
            self.registers.push(channel);
        }

        fn unregister(&mut self, channel: SensorChannel) {
            self.unregisters.push(channel);
        }
    }

    const BOTH: [SensorChannel; 2] = [SensorChannel::Motion, SensorChannel::Orientation];

    #[test]
    fn test_attach_twice_registers_once_per_channel() {
        let mut host = CountingHost::default();
        let mut adapter = ChannelAdapter::new();

        adapter.attach(&mut host, &BOTH);
        adapter.attach(&mut host, &BOTH);

        assert_eq!(host.registers, BOTH.to_vec());
        assert!(adapter.is_attached(SensorChannel::Motion));
        assert!(adapter.is_attached(SensorChannel::Orientation));
    }

    #[test]
    fn test_detach_is_idempotent() {
        let mut host = CountingHost::default();
        let mut adapter = ChannelAdapter::new();

        adapter.attach(&mut host, &BOTH);
        adapter.detach(&mut host);
        adapter.detach(&mut host);

        assert_eq!(host.unregisters, BOTH.to_vec());
        assert!(adapter.subscription().is_empty());
    }

    #[test]
    fn test_detach_before_any_event_leaves_no_registrations() {
        let mut host = CountingHost::default();
        let mut adapter = ChannelAdapter::new();

        adapter.attach(&mut host, &[SensorChannel::Orientation]);
        adapter.detach(&mut host);

        assert_eq!(host.registers.len(), host.unregisters.len());
        assert!(adapter.attached_channels().is_empty());
    }

    #[test]
    fn test_detach_without_attach_is_a_noop() {
        let mut host = CountingHost::default();
        let mut adapter = ChannelAdapter::new();

        adapter.detach(&mut host);
        assert!(host.unregisters.is_empty());
    }

    #[test]
    fn test_partial_attach() {
        let mut host = CountingHost::default();
        let mut adapter = ChannelAdapter::new();

        adapter.attach(&mut host, &[SensorChannel::Orientation]);

        assert!(adapter.is_attached(SensorChannel::Orientation));
        assert!(!adapter.is_attached(SensorChannel::Motion));
        assert_eq!(adapter.attached_channels(), vec![SensorChannel::Orientation]);
    }

    #[test]
    fn test_gravity_inclusive_vector_preferred() {
        let event = RawMotionEvent {
            acceleration_including_gravity: Some(RawVector {
                x: Some(0.1),
                y: Some(0.2),
                z: Some(9.8),
            }),
            acceleration: Some(RawVector {
                x: Some(1.0),
                y: Some(2.0),
                z: Some(3.0),
            }),
            ..Default::default()
        };

        let sample = normalize_acceleration(&event).unwrap();
        assert_eq!(sample.z, 9.8);
    }

    #[test]
    fn test_gravity_exclusive_fallback() {
        let event = RawMotionEvent {
            acceleration: Some(RawVector {
                x: Some(1.0),
                y: Some(2.0),
                z: Some(3.0),
            }),
            ..Default::default()
        };

        let sample = normalize_acceleration(&event).unwrap();
        assert_eq!(sample.x, 1.0);
    }

    #[test]
    fn test_motion_event_without_vectors_is_skipped() {
        let event = RawMotionEvent::default();
        assert!(normalize_acceleration(&event).is_none());
        assert!(normalize_rotation_rate(&event).is_none());
    }

    #[test]
    fn test_null_axes_default_to_zero() {
        let event = RawMotionEvent {
            acceleration_including_gravity: Some(RawVector {
                x: Some(1.5),
                y: None,
                z: None,
            }),
            ..Default::default()
        };

        let sample = normalize_acceleration(&event).unwrap();
        assert_eq!(sample.x, 1.5);
        assert_eq!(sample.y, 0.0);
        assert_eq!(sample.z, 0.0);
    }

    #[test]
    fn test_rotation_rate_axis_remap() {
        let event = RawMotionEvent {
            rotation_rate: Some(RawRotationRate {
                alpha: Some(3.0),
                beta: Some(1.0),
                gamma: Some(2.0),
            }),
            ..Default::default()
        };

        let rate = normalize_rotation_rate(&event).unwrap();
        assert_eq!(rate.x, 1.0); // beta
        assert_eq!(rate.y, 2.0); // gamma
        assert_eq!(rate.z, 3.0); // alpha
    }

    #[test]
    fn test_compass_heading_overrides_alpha() {
        let event = RawOrientationEvent {
            alpha: Some(40.0),
            beta: Some(5.0),
            gamma: Some(-5.0),
            absolute: Some(false),
            compass_heading: Some(200.0),
            ..Default::default()
        };

        let sample = normalize_orientation(&event).unwrap();
        assert_eq!(sample.alpha, 200.0);
        assert!(sample.is_absolute);
    }

    #[test]
    fn test_alpha_fallback_mirrors_absolute_flag() {
        let event = RawOrientationEvent {
            alpha: Some(40.0),
            beta: Some(5.0),
            gamma: Some(-5.0),
            absolute: Some(false),
            ..Default::default()
        };

        let sample = normalize_orientation(&event).unwrap();
        assert_eq!(sample.alpha, 40.0);
        assert!(!sample.is_absolute);
    }

    #[test]
    fn test_missing_absolute_flag_coerces_to_false() {
        let event = RawOrientationEvent {
            alpha: Some(90.0),
            ..Default::default()
        };

        let sample = normalize_orientation(&event).unwrap();
        assert_eq!(sample.alpha, 90.0);
        assert_eq!(sample.beta, 0.0);
        assert_eq!(sample.gamma, 0.0);
        assert!(!sample.is_absolute);
    }

    #[test]
    fn test_orientation_event_without_fields_is_skipped() {
        let event = RawOrientationEvent {
            absolute: Some(true),
            ..Default::default()
        };
        assert!(normalize_orientation(&event).is_none());
    }

    #[test]
    fn test_event_ages_tracked_independently() {
        let mut adapter = ChannelAdapter::new();
        let start = Utc.with_ymd_and_hms(2024, 1, 15, 14, 0, 0).unwrap();

        assert!(adapter.motion_age(start).is_none());
        assert!(adapter.orientation_age(start).is_none());

        adapter.note_motion(start);
        adapter.note_orientation(start + Duration::milliseconds(400));

        let as_of = start + Duration::milliseconds(1000);
        assert_eq!(adapter.motion_age(as_of).unwrap().num_milliseconds(), 1000);
        assert_eq!(
            adapter.orientation_age(as_of).unwrap().num_milliseconds(),
            600
        );
    }
}

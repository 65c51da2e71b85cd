//! Replay a short synthetic sensor session and print the resulting snapshot

use sensorium::{SensorEngine, UngatedHost};

fn main() {
    let events = [
        r#"{ "channel": "motion", "timestamp": "2024-01-15T14:00:00.000Z", "accelerationIncludingGravity": { "x": 0.12, "y": -0.40, "z": 9.78 }, "rotationRate": { "alpha": 1.5, "beta": -0.3, "gamma": 0.1 } }"#,
        r#"{ "channel": "motion", "timestamp": "2024-01-15T14:00:00.050Z", "accelerationIncludingGravity": { "x": 0.15, "y": -0.38, "z": 9.80 } }"#,
        r#"{ "channel": "motion", "timestamp": "2024-01-15T14:00:00.150Z", "accelerationIncludingGravity": { "x": 0.18, "y": -0.35, "z": 9.81 } }"#,
        r#"{ "channel": "orientation", "timestamp": "2024-01-15T14:00:00.200Z", "alpha": 40.0, "beta": 10.0, "gamma": -5.0, "webkitCompassHeading": 200.0 }"#,
    ];

    let mut host = UngatedHost;
    let mut engine = SensorEngine::new(&mut host);

    for line in events {
        match sensorium::RawSensorEvent::from_json(line) {
            Ok(event) => engine.handle_event(&event),
            Err(e) => eprintln!("Error: {e:?}"),
        }
    }

    match serde_json::to_string_pretty(&engine.snapshot_now()) {
        Ok(snapshot) => println!("{snapshot}"),
        Err(e) => eprintln!("Error: {e:?}"),
    }
}

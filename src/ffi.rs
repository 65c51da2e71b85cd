//! FFI bindings for the Sensorium engine
//!
//! This module provides C-compatible functions for embedding the engine from
//! other languages. The embedder owns the real platform bridge: it shows the
//! consent prompts, registers the native listeners, and forwards events as
//! JSON. All functions use C strings (null-terminated) and return allocated
//! memory that must be freed by the caller using `sensorium_free_string`.

use std::cell::RefCell;
use std::ffi::{CStr, CString};
use std::os::raw::c_char;
use std::ptr;

use serde::Deserialize;

use crate::engine::SensorEngine;
use crate::host::UngatedHost;
use crate::schema::RawSensorEvent;
use crate::types::{Capability, ConsentOutcome, ConsentRequirement, SensorChannel};

// Thread-local storage for the last error message
thread_local! {
    static LAST_ERROR: RefCell<Option<CString>> = const { RefCell::new(None) };
}

/// Set the last error message
fn set_last_error(msg: &str) {
    LAST_ERROR.with(|e| {
        *e.borrow_mut() = CString::new(msg).ok();
    });
}

/// Clear the last error message
fn clear_last_error() {
    LAST_ERROR.with(|e| {
        *e.borrow_mut() = None;
    });
}

/// Helper to convert C string to Rust string
unsafe fn cstr_to_string(ptr: *const c_char) -> Option<String> {
    if ptr.is_null() {
        return None;
    }
    CStr::from_ptr(ptr).to_str().ok().map(|s| s.to_string())
}

/// Helper to convert Rust string to C string (caller must free)
fn string_to_cstr(s: &str) -> *mut c_char {
    match CString::new(s) {
        Ok(cstr) => cstr.into_raw(),
        Err(_) => ptr::null_mut(),
    }
}

/// Consent outcomes as reported by the embedder. A capability missing from
/// the report counts as denied.
#[derive(Deserialize)]
struct ConsentReport {
    #[serde(default)]
    orientation: Option<ConsentOutcome>,
    #[serde(default)]
    motion: Option<ConsentOutcome>,
}

impl ConsentReport {
    fn outcomes(&self) -> Vec<(Capability, ConsentOutcome)> {
        vec![
            (
                Capability::Orientation,
                self.orientation.unwrap_or(ConsentOutcome::Denied),
            ),
            (
                Capability::Motion,
                self.motion.unwrap_or(ConsentOutcome::Denied),
            ),
        ]
    }
}

/// Opaque handle to a SensorEngine
pub struct SensorEngineHandle {
    engine: SensorEngine,
}

// ============================================================================
// Lifecycle
// ============================================================================

/// Create an engine for a platform without an explicit consent step. Both
/// channels are live immediately.
///
/// # Safety
/// - Returns a pointer to a newly allocated engine.
/// - Must be freed with `sensorium_engine_free`.
#[no_mangle]
pub unsafe extern "C" fn sensorium_engine_new() -> *mut SensorEngineHandle {
    clear_last_error();

    let mut host = UngatedHost;
    let engine = SensorEngine::new(&mut host);
    Box::into_raw(Box::new(SensorEngineHandle { engine }))
}

/// Create an engine for a consent-gated platform. The state starts at
/// `unknown` with no channel attached; report prompt results with
/// `sensorium_engine_report_consent`.
///
/// # Safety
/// - Returns a pointer to a newly allocated engine.
/// - Must be freed with `sensorium_engine_free`.
#[no_mangle]
pub unsafe extern "C" fn sensorium_engine_new_gated() -> *mut SensorEngineHandle {
    clear_last_error();

    let engine = SensorEngine::with_requirement(ConsentRequirement::ConsentRequired);
    Box::into_raw(Box::new(SensorEngineHandle { engine }))
}

/// Free an engine.
///
/// # Safety
/// - `engine` must be a valid pointer returned by a `sensorium_engine_new*`
///   function.
/// - After calling this function, the pointer is invalid.
#[no_mangle]
pub unsafe extern "C" fn sensorium_engine_free(engine: *mut SensorEngineHandle) {
    if !engine.is_null() {
        drop(Box::from_raw(engine));
    }
}

// ============================================================================
// Consent
// ============================================================================

/// Report consent prompt outcomes and fold them into the permission state.
///
/// `outcomes_json` looks like `{"orientation": "granted", "motion":
/// "denied"}`; a missing capability counts as denied. Returns the resulting
/// state (`"granted"`, `"denied"`, ...) as an allocated string. Afterwards,
/// query `sensorium_engine_channel_attached` to learn which native listeners
/// to register.
///
/// # Safety
/// - `engine` must be a valid pointer returned by a `sensorium_engine_new*`
///   function.
/// - `outcomes_json` must be a valid null-terminated C string.
/// - Returns a newly allocated string that must be freed with
///   `sensorium_free_string`.
/// - Returns NULL on error; call `sensorium_last_error` for the message.
#[no_mangle]
pub unsafe extern "C" fn sensorium_engine_report_consent(
    engine: *mut SensorEngineHandle,
    outcomes_json: *const c_char,
) -> *mut c_char {
    clear_last_error();

    if engine.is_null() {
        set_last_error("Null engine pointer");
        return ptr::null_mut();
    }
    let handle = &mut *engine;

    let json = match cstr_to_string(outcomes_json) {
        Some(s) => s,
        None => {
            set_last_error("Invalid outcomes string pointer");
            return ptr::null_mut();
        }
    };

    let report: ConsentReport = match serde_json::from_str(&json) {
        Ok(report) => report,
        Err(e) => {
            set_last_error(&format!("Failed to parse consent report: {}", e));
            return ptr::null_mut();
        }
    };

    let mut host = UngatedHost;
    let state = handle
        .engine
        .apply_consent_outcomes(&mut host, &report.outcomes());
    string_to_cstr(state.as_str())
}

/// Whether a channel currently holds a registered handler.
///
/// # Safety
/// - `engine` must be a valid pointer returned by a `sensorium_engine_new*`
///   function.
/// - `channel` must be a valid null-terminated C string (`"motion"` or
///   `"orientation"`).
/// - Returns 1 if attached, 0 if not, -1 on error.
#[no_mangle]
pub unsafe extern "C" fn sensorium_engine_channel_attached(
    engine: *const SensorEngineHandle,
    channel: *const c_char,
) -> i32 {
    clear_last_error();

    if engine.is_null() {
        set_last_error("Null engine pointer");
        return -1;
    }
    let handle = &*engine;

    let name = match cstr_to_string(channel) {
        Some(s) => s,
        None => {
            set_last_error("Invalid channel string pointer");
            return -1;
        }
    };

    match SensorChannel::from_name(&name) {
        Some(channel) => i32::from(handle.engine.attached_channels().contains(&channel)),
        None => {
            set_last_error(&format!("Unknown sensor channel: {}", name));
            -1
        }
    }
}

// ============================================================================
// Events and snapshots
// ============================================================================

/// Feed one tagged sensor event, e.g. `{"channel": "motion",
/// "accelerationIncludingGravity": {"x": 0.1, "y": 0.2, "z": 9.8}}`.
///
/// # Safety
/// - `engine` must be a valid pointer returned by a `sensorium_engine_new*`
///   function.
/// - `event_json` must be a valid null-terminated C string.
/// - Returns 0 on success, non-zero on error; call `sensorium_last_error`
///   for the message.
#[no_mangle]
pub unsafe extern "C" fn sensorium_engine_handle_event(
    engine: *mut SensorEngineHandle,
    event_json: *const c_char,
) -> i32 {
    clear_last_error();

    if engine.is_null() {
        set_last_error("Null engine pointer");
        return -1;
    }
    let handle = &mut *engine;

    let json = match cstr_to_string(event_json) {
        Some(s) => s,
        None => {
            set_last_error("Invalid event string pointer");
            return -1;
        }
    };

    match RawSensorEvent::from_json(&json) {
        Ok(event) => {
            handle.engine.handle_event(&event);
            0
        }
        Err(e) => {
            set_last_error(&e.to_string());
            -1
        }
    }
}

/// Snapshot the engine's derived state as JSON.
///
/// # Safety
/// - `engine` must be a valid pointer returned by a `sensorium_engine_new*`
///   function.
/// - Returns a newly allocated string that must be freed with
///   `sensorium_free_string`.
/// - Returns NULL on error; call `sensorium_last_error` for the message.
#[no_mangle]
pub unsafe extern "C" fn sensorium_engine_snapshot(
    engine: *const SensorEngineHandle,
) -> *mut c_char {
    clear_last_error();

    if engine.is_null() {
        set_last_error("Null engine pointer");
        return ptr::null_mut();
    }
    let handle = &*engine;

    match serde_json::to_string(&handle.engine.snapshot_now()) {
        Ok(json) => string_to_cstr(&json),
        Err(e) => {
            set_last_error(&format!("Failed to encode snapshot: {}", e));
            ptr::null_mut()
        }
    }
}

// ============================================================================
// Memory Management
// ============================================================================

/// Free a string returned by Sensorium functions.
///
/// # Safety
/// - `ptr` must be a valid pointer returned by a Sensorium function, or NULL.
/// - After calling this function, the pointer is invalid.
#[no_mangle]
pub unsafe extern "C" fn sensorium_free_string(ptr: *mut c_char) {
    if !ptr.is_null() {
        drop(CString::from_raw(ptr));
    }
}

// ============================================================================
// Error Handling
// ============================================================================

/// Get the last error message.
///
/// # Safety
/// - Returns a pointer to a thread-local error string.
/// - The returned pointer is valid until the next Sensorium call on this
///   thread.
/// - Do NOT free the returned pointer.
/// - Returns NULL if no error occurred.
#[no_mangle]
pub unsafe extern "C" fn sensorium_last_error() -> *const c_char {
    LAST_ERROR.with(|e| match &*e.borrow() {
        Some(cstr) => cstr.as_ptr(),
        None => ptr::null(),
    })
}

// ============================================================================
// Version Information
// ============================================================================

/// Get the Sensorium library version.
///
/// # Safety
/// - Returns a pointer to a static string. Do NOT free.
#[no_mangle]
pub unsafe extern "C" fn sensorium_version() -> *const c_char {
    static VERSION: &[u8] = concat!(env!("CARGO_PKG_VERSION"), "\0").as_bytes();
    VERSION.as_ptr() as *const c_char
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::ffi::CString;

    #[test]
    fn test_ffi_ungated_lifecycle() {
        unsafe {
            let engine = sensorium_engine_new();
            assert!(!engine.is_null());

            let event = CString::new(
                r#"{ "channel": "motion", "accelerationIncludingGravity": { "x": 0.1, "y": 0.2, "z": 9.8 } }"#,
            )
            .unwrap();
            assert_eq!(sensorium_engine_handle_event(engine, event.as_ptr()), 0);

            let snapshot = sensorium_engine_snapshot(engine);
            assert!(!snapshot.is_null());

            let snapshot_str = CStr::from_ptr(snapshot).to_str().unwrap();
            assert!(snapshot_str.contains("\"permission_state\":\"granted\""));
            assert!(snapshot_str.contains("\"acceleration\""));

            sensorium_free_string(snapshot);
            sensorium_engine_free(engine);
        }
    }

    #[test]
    fn test_ffi_gated_consent_flow() {
        unsafe {
            let engine = sensorium_engine_new_gated();
            assert!(!engine.is_null());

            let motion = CString::new("motion").unwrap();
            let orientation = CString::new("orientation").unwrap();
            assert_eq!(
                sensorium_engine_channel_attached(engine, motion.as_ptr()),
                0
            );

            let report =
                CString::new(r#"{ "orientation": "granted", "motion": "denied" }"#).unwrap();
            let state = sensorium_engine_report_consent(engine, report.as_ptr());
            assert!(!state.is_null());
            assert_eq!(CStr::from_ptr(state).to_str().unwrap(), "granted");
            sensorium_free_string(state);

            assert_eq!(
                sensorium_engine_channel_attached(engine, orientation.as_ptr()),
                1
            );
            assert_eq!(
                sensorium_engine_channel_attached(engine, motion.as_ptr()),
                0
            );

            sensorium_engine_free(engine);
        }
    }

    #[test]
    fn test_ffi_error_handling() {
        unsafe {
            let engine = sensorium_engine_new();

            let invalid = CString::new("not json").unwrap();
            assert_eq!(sensorium_engine_handle_event(engine, invalid.as_ptr()), -1);

            let error = sensorium_last_error();
            assert!(!error.is_null());
            let error_str = CStr::from_ptr(error).to_str().unwrap();
            assert!(!error_str.is_empty());

            let unknown = CString::new("barometer").unwrap();
            assert_eq!(
                sensorium_engine_channel_attached(engine, unknown.as_ptr()),
                -1
            );

            sensorium_engine_free(engine);
        }
    }

    #[test]
    fn test_ffi_version() {
        unsafe {
            let version = sensorium_version();
            assert!(!version.is_null());

            let version_str = CStr::from_ptr(version).to_str().unwrap();
            assert!(!version_str.is_empty());
        }
    }
}

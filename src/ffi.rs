//! FFI bindings for Synheart XP
//!
//! This module provides C-compatible functions for calling the engine from
//! other languages. All functions use C strings (null-terminated) and return
//! allocated memory that must be freed by the caller using `xp_free_string`.

use std::cell::RefCell;
use std::ffi::{CStr, CString};
use std::os::raw::c_char;
use std::ptr;

use crate::config::XpConfig;
use crate::pipeline::{activity_to_xp_json, daily_caps_json, session_to_xp_report, XpEngine};

// Thread-local storage for the last error message
thread_local! {
    static LAST_ERROR: RefCell<Option<CString>> = const { RefCell::new(None) };
}

fn set_last_error(msg: &str) {
    LAST_ERROR.with(|e| {
        *e.borrow_mut() = CString::new(msg).ok();
    });
}

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

/// Read a required string argument, recording an error when it is unusable
unsafe fn required_arg(ptr: *const c_char, name: &str) -> Option<String> {
    let value = cstr_to_string(ptr);
    if value.is_none() {
        set_last_error(&format!("Invalid {name} string pointer"));
    }
    value
}

/// Map a pipeline result onto the C calling convention
fn into_c_result<E: std::fmt::Display>(result: Result<String, E>) -> *mut c_char {
    match result {
        Ok(json) => string_to_cstr(&json),
        Err(e) => {
            set_last_error(&e.to_string());
            ptr::null_mut()
        }
    }
}

// ============================================================================
// Stateless API
// ============================================================================

/// Allocate XP for one activity JSON object; returns the allocation JSON.
///
/// # Safety
/// - `json` must be a valid null-terminated C string.
/// - Returns a newly allocated string that must be freed with `xp_free_string`.
/// - Returns NULL on error; call `xp_last_error` to get the error message.
#[no_mangle]
pub unsafe extern "C" fn xp_allocate_activity(json: *const c_char) -> *mut c_char {
    clear_last_error();

    let Some(json_str) = required_arg(json, "JSON") else {
        return ptr::null_mut();
    };

    into_c_result(activity_to_xp_json(&json_str))
}

/// Process a workout session JSON and return the XP report JSON.
///
/// No daily cap is applied; use an engine handle for that.
///
/// # Safety
/// - `json` must be a valid null-terminated C string.
/// - Returns a newly allocated string that must be freed with `xp_free_string`.
/// - Returns NULL on error; call `xp_last_error` to get the error message.
#[no_mangle]
pub unsafe extern "C" fn xp_session_to_report(json: *const c_char) -> *mut c_char {
    clear_last_error();

    let Some(json_str) = required_arg(json, "JSON") else {
        return ptr::null_mut();
    };

    into_c_result(session_to_xp_report(json_str))
}

/// Apply the daily cap to `current_json` given the day's prior allocations.
///
/// # Safety
/// - `daily_json` (JSON array) and `current_json` must be valid null-terminated C strings.
/// - Returns a newly allocated string that must be freed with `xp_free_string`.
/// - Returns NULL on error; call `xp_last_error` to get the error message.
#[no_mangle]
pub unsafe extern "C" fn xp_apply_daily_caps(
    daily_json: *const c_char,
    current_json: *const c_char,
) -> *mut c_char {
    clear_last_error();

    let Some(daily_str) = required_arg(daily_json, "daily JSON") else {
        return ptr::null_mut();
    };
    let Some(current_str) = required_arg(current_json, "current JSON") else {
        return ptr::null_mut();
    };

    into_c_result(daily_caps_json(&daily_str, &current_str))
}

// ============================================================================
// Stateful Engine API
// ============================================================================

/// Opaque handle to an XpEngine
pub struct XpEngineHandle {
    engine: XpEngine,
}

/// Create a new engine.
///
/// `config_json` may be NULL for default tuning.
///
/// # Safety
/// - `config_json`, when not NULL, must be a valid null-terminated C string.
/// - Returns a pointer that must be freed with `xp_engine_free`.
/// - Returns NULL on error; call `xp_last_error` to get the error message.
#[no_mangle]
pub unsafe extern "C" fn xp_engine_new(config_json: *const c_char) -> *mut XpEngineHandle {
    clear_last_error();

    let config = if config_json.is_null() {
        XpConfig::default()
    } else {
        let Some(json_str) = required_arg(config_json, "config JSON") else {
            return ptr::null_mut();
        };
        match XpConfig::from_json(&json_str) {
            Ok(config) => config,
            Err(e) => {
                set_last_error(&e.to_string());
                return ptr::null_mut();
            }
        }
    };

    match XpEngine::with_config(config) {
        Ok(engine) => Box::into_raw(Box::new(XpEngineHandle { engine })),
        Err(e) => {
            set_last_error(&e.to_string());
            ptr::null_mut()
        }
    }
}

/// Free an engine.
///
/// # Safety
/// - `engine` must be a valid pointer returned by `xp_engine_new`.
/// - After calling this function, the pointer is invalid.
#[no_mangle]
pub unsafe extern "C" fn xp_engine_free(engine: *mut XpEngineHandle) {
    if !engine.is_null() {
        drop(Box::from_raw(engine));
    }
}

/// Process a session JSON with a stateful engine, recording it in the ledger.
///
/// # Safety
/// - `engine` must be a valid pointer returned by `xp_engine_new`.
/// - `json` must be a valid null-terminated C string.
/// - Returns a newly allocated string that must be freed with `xp_free_string`.
/// - Returns NULL on error; call `xp_last_error` to get the error message.
#[no_mangle]
pub unsafe extern "C" fn xp_engine_process_session(
    engine: *mut XpEngineHandle,
    json: *const c_char,
) -> *mut c_char {
    clear_last_error();

    if engine.is_null() {
        set_last_error("Null engine pointer");
        return ptr::null_mut();
    }

    let handle = &mut *engine;

    let Some(json_str) = required_arg(json, "JSON") else {
        return ptr::null_mut();
    };

    into_c_result(handle.engine.process_session(&json_str))
}

/// Save the engine's ledger to JSON.
///
/// # Safety
/// - `engine` must be a valid pointer returned by `xp_engine_new`.
/// - Returns a newly allocated string that must be freed with `xp_free_string`.
/// - Returns NULL on error; call `xp_last_error` to get the error message.
#[no_mangle]
pub unsafe extern "C" fn xp_engine_save_ledger(engine: *mut XpEngineHandle) -> *mut c_char {
    clear_last_error();

    if engine.is_null() {
        set_last_error("Null engine pointer");
        return ptr::null_mut();
    }

    let handle = &*engine;
    into_c_result(handle.engine.save_ledger())
}

/// Load the engine's ledger from JSON.
///
/// # Safety
/// - `engine` must be a valid pointer returned by `xp_engine_new`.
/// - `json` must be a valid null-terminated C string.
/// - Returns 0 on success, non-zero on error.
/// - On error, call `xp_last_error` to get the error message.
#[no_mangle]
pub unsafe extern "C" fn xp_engine_load_ledger(
    engine: *mut XpEngineHandle,
    json: *const c_char,
) -> i32 {
    clear_last_error();

    if engine.is_null() {
        set_last_error("Null engine pointer");
        return -1;
    }

    let handle = &mut *engine;

    let Some(json_str) = required_arg(json, "JSON") else {
        return -1;
    };

    match handle.engine.load_ledger(&json_str) {
        Ok(()) => 0,
        Err(e) => {
            set_last_error(&e.to_string());
            -1
        }
    }
}

// ============================================================================
// Memory Management
// ============================================================================

/// Free a string returned by XP functions.
///
/// # Safety
/// - `ptr` must be a valid pointer returned by an XP function, or NULL.
/// - After calling this function, the pointer is invalid.
#[no_mangle]
pub unsafe extern "C" fn xp_free_string(ptr: *mut c_char) {
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
/// - The returned pointer is valid until the next XP function call on this thread.
/// - Do NOT free the returned pointer.
/// - Returns NULL if no error occurred.
#[no_mangle]
pub unsafe extern "C" fn xp_last_error() -> *const c_char {
    LAST_ERROR.with(|e| match &*e.borrow() {
        Some(cstr) => cstr.as_ptr(),
        None => ptr::null(),
    })
}

// ============================================================================
// Version Information
// ============================================================================

/// Get the XP library version.
///
/// # Safety
/// - Returns a pointer to a static string. Do NOT free.
#[no_mangle]
pub unsafe extern "C" fn xp_version() -> *const c_char {
    static VERSION: &[u8] = concat!(env!("CARGO_PKG_VERSION"), "\0").as_bytes();
    VERSION.as_ptr() as *const c_char
}

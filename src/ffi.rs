//! FFI bindings for Sleep Trends
//!
//! This module provides C-compatible functions for calling the engine from the
//! UI layer. All functions take C strings (null-terminated) and return allocated
//! memory that must be freed by the caller using `sleep_trends_free_string`.

use std::cell::RefCell;
use std::ffi::{CStr, CString};
use std::os::raw::c_char;
use std::ptr;

use crate::config::AnalyticsConfig;
use crate::error::AnalyticsError;
use crate::log::parse_entries;
use crate::pipeline::{report_to_json, TrendAnalyzer};

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

fn report_json(entries_json: &str, config: AnalyticsConfig) -> Result<String, AnalyticsError> {
    let analyzer = TrendAnalyzer::new(config)?;
    let entries = parse_entries(entries_json)?;
    let report = analyzer.compute_report(&entries)?;
    report_to_json(&report)
}

fn finish(result: Result<String, AnalyticsError>) -> *mut c_char {
    match result {
        Ok(json) => string_to_cstr(&json),
        Err(e) => {
            set_last_error(&e.to_string());
            ptr::null_mut()
        }
    }
}

// ============================================================================
// Reports
// ============================================================================

/// Compute a trend report from a JSON array of sleep log entries.
///
/// Per-entry durations keep the input order. Entries without an `id` get a
/// stable one derived from their position and content.
///
/// # Safety
/// - `entries_json` must be a valid null-terminated C string.
/// - Returns a newly allocated string that must be freed with `sleep_trends_free_string`.
/// - Returns NULL on error; call `sleep_trends_last_error` to get the error message.
#[no_mangle]
pub unsafe extern "C" fn sleep_trends_compute_report(entries_json: *const c_char) -> *mut c_char {
    clear_last_error();

    let entries = match cstr_to_string(entries_json) {
        Some(s) => s,
        None => {
            set_last_error("Invalid entries string pointer");
            return ptr::null_mut();
        }
    };

    finish(report_json(&entries, AnalyticsConfig::default()))
}

/// Compute a trend report with an explicit JSON configuration.
///
/// # Safety
/// - `entries_json` and `config_json` must be valid null-terminated C strings.
/// - Returns a newly allocated string that must be freed with `sleep_trends_free_string`.
/// - Returns NULL on error; call `sleep_trends_last_error` to get the error message.
#[no_mangle]
pub unsafe extern "C" fn sleep_trends_compute_report_with_config(
    entries_json: *const c_char,
    config_json: *const c_char,
) -> *mut c_char {
    clear_last_error();

    let entries = match cstr_to_string(entries_json) {
        Some(s) => s,
        None => {
            set_last_error("Invalid entries string pointer");
            return ptr::null_mut();
        }
    };

    let config = match cstr_to_string(config_json) {
        Some(s) => s,
        None => {
            set_last_error("Invalid config string pointer");
            return ptr::null_mut();
        }
    };

    finish(AnalyticsConfig::from_json(&config).and_then(|config| report_json(&entries, config)))
}

// ============================================================================
// Memory Management
// ============================================================================

/// Free a string returned by a Sleep Trends function.
///
/// # Safety
/// - `ptr` must be a valid pointer returned by this library, or NULL.
/// - After calling this function, the pointer is invalid.
#[no_mangle]
pub unsafe extern "C" fn sleep_trends_free_string(ptr: *mut c_char) {
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
/// - The returned pointer is valid until the next call into this library on this thread.
/// - Do NOT free the returned pointer.
/// - Returns NULL if no error occurred.
#[no_mangle]
pub unsafe extern "C" fn sleep_trends_last_error() -> *const c_char {
    LAST_ERROR.with(|e| match &*e.borrow() {
        Some(cstr) => cstr.as_ptr(),
        None => ptr::null(),
    })
}

/// Get the library version.
///
/// # Safety
/// - Returns a pointer to a static string. Do NOT free.
#[no_mangle]
pub unsafe extern "C" fn sleep_trends_version() -> *const c_char {
    static VERSION: &[u8] = concat!(env!("CARGO_PKG_VERSION"), "\0").as_bytes();
    VERSION.as_ptr() as *const c_char
}

//! C-compatible API exposed to the engine runtime and distributed workers.
//!
//! Every call that produces data returns a JSON envelope the caller must
//! release with [`sidecar_free_str`]:
//! `{"ok":true,"shape":{..}}` or
//! `{"ok":false,"code":N,"kind":"..","reason":"..","field":..}`.

use std::ffi::{CStr, CString};
use std::os::raw::c_char;
use std::path::Path;

use serde_json::json;

use crate::common::config::AppCfg;
use crate::common::error::{MetaCode, MetaError, MetaResult};
use crate::common::log;
use crate::data::codec;
use crate::data::domain::{ResolvedShape, TargetKind};
use crate::data::repo_fs::FsMetaRepo;
use crate::data::service;
use crate::data::shape;

/// ABI version to coordinate with native callers.
#[no_mangle]
pub extern "C" fn sidecar_api_version() -> u32 {
    1
}

/// Install the JSON-line log backend (stderr) at the configured level.
/// Returns 0 if another logger was already installed by the host.
#[no_mangle]
pub extern "C" fn sidecar_init() -> u32 {
    u32::from(log::install(AppCfg::load().log_filter()))
}

/// Decode sidecar text and resolve it for `kind` (0 = matrix, 1 = frame).
#[no_mangle]
pub extern "C" fn sidecar_resolve(meta_text: *const c_char, kind: u32) -> *const c_char {
    let result = read_arg(meta_text, "meta_text").and_then(|text| {
        let kind = target_kind(kind)?;
        let descriptor = codec::decode(&text)?;
        shape::resolve(&descriptor, kind)
    });
    string_to_raw(envelope(result))
}

/// Load the sidecar next to `data_path` and resolve it for `kind`.
#[no_mangle]
pub extern "C" fn sidecar_load(data_path: *const c_char, kind: u32) -> *const c_char {
    let result = read_arg(data_path, "data_path").and_then(|path| {
        let kind = target_kind(kind)?;
        let repo = FsMetaRepo::new(&AppCfg::load());
        service::load_shape(&repo, Path::new(&path), kind)
    });
    string_to_raw(envelope(result))
}

/// Free strings allocated by Rust.
#[no_mangle]
pub extern "C" fn sidecar_free_str(ptr: *const c_char) {
    if ptr.is_null() {
        return;
    }
    unsafe {
        let _ = CString::from_raw(ptr as *mut c_char);
    }
}

fn read_arg(ptr: *const c_char, name: &str) -> MetaResult<String> {
    if ptr.is_null() {
        return Err(MetaError::InvalidRequest(format!("{name} is null")));
    }
    let raw = unsafe { CStr::from_ptr(ptr) };
    raw.to_str()
        .map(str::to_owned)
        .map_err(|_| MetaError::InvalidRequest(format!("{name} is not valid UTF-8")))
}

fn target_kind(raw: u32) -> MetaResult<TargetKind> {
    TargetKind::from_raw(raw)
        .ok_or_else(|| MetaError::InvalidRequest(format!("unknown target kind {raw}")))
}

fn envelope(result: MetaResult<ResolvedShape>) -> String {
    match result {
        Ok(shape) => json!({ "ok": true, "shape": shape }).to_string(),
        Err(err) => json!({
            "ok": false,
            "code": err.code() as u32,
            "kind": err.kind(),
            "reason": err.to_string(),
            "field": err.field(),
        })
        .to_string(),
    }
}

fn string_to_raw(s: String) -> *const c_char {
    match CString::new(s) {
        Ok(cstring) => cstring.into_raw(),
        Err(_) => fallback_json_raw(),
    }
}

fn fallback_envelope() -> String {
    json!({
        "ok": false,
        "code": MetaCode::Internal as u32,
        "kind": "Internal",
        "reason": "result could not be passed as a C string",
        "field": null,
    })
    .to_string()
}

fn fallback_json_raw() -> *const c_char {
    CString::new(fallback_envelope())
        .expect("fallback envelope has no interior NUL")
        .into_raw()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn call_resolve(text: &str, kind: u32) -> serde_json::Value {
        let input = CString::new(text).unwrap();
        let out = sidecar_resolve(input.as_ptr(), kind);
        let parsed = serde_json::from_str(unsafe { CStr::from_ptr(out) }.to_str().unwrap()).unwrap();
        sidecar_free_str(out);
        parsed
    }

    #[test]
    fn resolve_envelope_ok() {
        let v = call_resolve(r#"{"numRows":2,"numCols":4,"valueType":"f64","numNonZeros":0}"#, 0);
        assert_eq!(v["ok"], true);
        assert_eq!(v["shape"]["kind"], "homogeneous");
        assert_eq!(v["shape"]["numCols"], 4);
        assert_eq!(v["shape"]["valueType"], "f64");
        assert_eq!(v["shape"]["numNonZeros"], 0);
        assert_eq!(v["shape"]["columns"][3]["valueType"], "f64");
    }

    #[test]
    fn resolve_envelope_error() {
        let v = call_resolve(
            r#"{"numRows":2,"numCols":3,"schema":[{"label":"a","valueType":"f64"},{"label":"b","valueType":"f64"}]}"#,
            1,
        );
        assert_eq!(v["ok"], false);
        assert_eq!(v["code"], 4);
        assert_eq!(v["kind"], "SchemaLengthMismatch");
        assert_eq!(v["field"], "schema");
    }

    #[test]
    fn fallback_matches_envelope_shape() {
        let out = fallback_json_raw();
        let v: serde_json::Value =
            serde_json::from_str(unsafe { CStr::from_ptr(out) }.to_str().unwrap()).unwrap();
        sidecar_free_str(out);
        assert_eq!(v["ok"], false);
        assert_eq!(v["code"], MetaCode::Internal as u32);
        assert_eq!(v["kind"], "Internal");
        assert!(v["field"].is_null());
    }

    #[test]
    fn bad_arguments() {
        let out = sidecar_resolve(std::ptr::null(), 0);
        let v: serde_json::Value =
            serde_json::from_str(unsafe { CStr::from_ptr(out) }.to_str().unwrap()).unwrap();
        sidecar_free_str(out);
        assert_eq!(v["kind"], "InvalidRequest");

        let v = call_resolve(r#"{"numRows":1,"numCols":1,"valueType":"f64"}"#, 7);
        assert_eq!(v["kind"], "InvalidRequest");
        assert!(v["field"].is_null());
    }
}

use crate::ipc::error::err;
use crate::ipc::types::{AppState, Request};
use crate::store::{LoadReport, StoreError, StudentStore};
use crate::validate::{StudentInput, ValidationError};
use serde_json::json;

pub fn param_str<'a>(req: &'a Request, key: &str) -> Option<&'a str> {
    req.params.get(key).and_then(|v| v.as_str())
}

/// Form fields may arrive as strings (raw entry text) or JSON numbers.
/// Anything else reads as empty so validation reports it.
pub fn param_text(req: &Request, key: &str) -> String {
    match req.params.get(key) {
        Some(serde_json::Value::String(s)) => s.clone(),
        Some(serde_json::Value::Number(n)) => n.to_string(),
        _ => String::new(),
    }
}

/// A trimmed, non-empty record code from `params[key]`, string or number.
pub fn param_code(req: &Request, key: &str) -> Option<String> {
    let code = param_text(req, key).trim().to_string();
    if code.is_empty() {
        None
    } else {
        Some(code)
    }
}

pub fn student_input(req: &Request) -> StudentInput {
    StudentInput {
        code: param_text(req, "code"),
        name: param_text(req, "name"),
        cw1: param_text(req, "cw1"),
        cw2: param_text(req, "cw2"),
        cw3: param_text(req, "cw3"),
        exam: param_text(req, "exam"),
    }
}

pub fn require_store<'a>(
    state: &'a mut AppState,
    req: &Request,
) -> Result<&'a mut StudentStore, serde_json::Value> {
    state
        .store
        .as_mut()
        .ok_or_else(|| err(&req.id, "no_workspace", "select a workspace first", None))
}

pub fn store_err(req: &Request, e: &StoreError) -> serde_json::Value {
    let details = match e {
        StoreError::DuplicateCode(code)
        | StoreError::CodeTaken(code)
        | StoreError::OriginalNotFound(code)
        | StoreError::NotFound(code) => Some(json!({ "code": code })),
        StoreError::Load { path, .. } | StoreError::Save { path, .. } => {
            Some(json!({ "path": path.to_string_lossy() }))
        }
    };
    err(&req.id, e.code(), e.to_string(), details)
}

pub fn validation_err(req: &Request, e: &ValidationError) -> serde_json::Value {
    err(
        &req.id,
        "validation_failed",
        e.to_string(),
        Some(json!({ "field": e.field() })),
    )
}

pub fn load_result(
    store: &StudentStore,
    report: Result<LoadReport, StoreError>,
) -> serde_json::Value {
    let (report, load_error) = match report {
        Ok(r) => (r, None),
        Err(e) => (LoadReport::default(), Some(e.to_string())),
    };
    json!({
        "studentCount": store.len(),
        "createdPlaceholder": report.created_placeholder,
        "skippedLines": report.skipped,
        "loadError": load_error,
    })
}

use crate::config::StudentdConfig;
use crate::ipc::error::{err, ok};
use crate::ipc::helpers::{load_result, param_str};
use crate::ipc::types::{AppState, Request};
use crate::store::StudentStore;
use serde_json::json;
use std::path::PathBuf;

fn handle_health(state: &mut AppState, req: &Request) -> serde_json::Value {
    ok(
        &req.id,
        json!({
            "version": env!("CARGO_PKG_VERSION"),
            "workspacePath": state.workspace.as_ref().map(|p| p.to_string_lossy().to_string())
        }),
    )
}

fn handle_workspace_select(state: &mut AppState, req: &Request) -> serde_json::Value {
    let Some(path) = param_str(req, "path").map(PathBuf::from) else {
        return err(&req.id, "bad_params", "missing params.path", None);
    };

    if let Err(e) = std::fs::create_dir_all(&path) {
        return err(
            &req.id,
            "workspace_open_failed",
            e.to_string(),
            Some(json!({ "path": path.to_string_lossy() })),
        );
    }

    // Best-effort: a broken studentd.toml falls back to defaults.
    let cfg = StudentdConfig::load_or_default(&path);
    let (store, report) = StudentStore::open(cfg.data_path(&path));
    tracing::info!(
        "workspace {} opened with {} students",
        path.display(),
        store.len()
    );

    let mut result = load_result(&store, report);
    result["workspacePath"] = json!(path.to_string_lossy());
    result["dataFile"] = json!(store.path().to_string_lossy());
    state.workspace = Some(path);
    state.store = Some(store);
    ok(&req.id, result)
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "health" => Some(handle_health(state, req)),
        "workspace.select" => Some(handle_workspace_select(state, req)),
        _ => None,
    }
}

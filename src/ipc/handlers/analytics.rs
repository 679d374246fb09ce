use crate::calc::ClassStats;
use crate::ipc::error::ok;
use crate::ipc::types::{AppState, Request};
use crate::student::Student;
use serde_json::json;

fn handle_highest(state: &mut AppState, req: &Request) -> serde_json::Value {
    let student = state
        .store
        .as_ref()
        .and_then(|s| s.highest())
        .map(Student::view);
    ok(&req.id, json!({ "student": student }))
}

fn handle_lowest(state: &mut AppState, req: &Request) -> serde_json::Value {
    let student = state
        .store
        .as_ref()
        .and_then(|s| s.lowest())
        .map(Student::view);
    ok(&req.id, json!({ "student": student }))
}

fn handle_average(state: &mut AppState, req: &Request) -> serde_json::Value {
    let avg = state
        .store
        .as_ref()
        .map(|s| s.average_percentage())
        .unwrap_or(0.0);
    ok(&req.id, json!({ "averagePercentage": avg }))
}

fn handle_summary(state: &mut AppState, req: &Request) -> serde_json::Value {
    let stats = match state.store.as_ref() {
        Some(s) => s.stats(),
        None => ClassStats::from_percents(std::iter::empty()),
    };
    ok(&req.id, json!(stats))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "analytics.highest" => Some(handle_highest(state, req)),
        "analytics.lowest" => Some(handle_lowest(state, req)),
        "analytics.average" => Some(handle_average(state, req)),
        "analytics.summary" => Some(handle_summary(state, req)),
        _ => None,
    }
}

use crate::ipc::error::{err, ok};
use crate::ipc::helpers::{
    load_result, param_code, param_str, require_store, store_err, student_input,
    validation_err,
};
use crate::ipc::types::{AppState, Request};
use crate::store::SortKey;
use crate::student::{Student, StudentView};
use serde_json::json;

fn list_json(students: &[Student]) -> serde_json::Value {
    let rows: Vec<StudentView> = students.iter().map(Student::view).collect();
    json!({ "students": rows })
}

fn handle_students_list(state: &mut AppState, req: &Request) -> serde_json::Value {
    let Some(store) = state.store.as_ref() else {
        return ok(&req.id, json!({ "students": [] }));
    };
    ok(&req.id, list_json(store.students()))
}

fn handle_students_get(state: &mut AppState, req: &Request) -> serde_json::Value {
    let Some(code) = param_code(req, "code") else {
        return err(&req.id, "bad_params", "missing code", None);
    };
    let Some(store) = state.store.as_ref() else {
        return ok(&req.id, json!({ "student": null }));
    };
    let student = store.find(&code).map(Student::view);
    ok(&req.id, json!({ "student": student }))
}

fn handle_students_create(state: &mut AppState, req: &Request) -> serde_json::Value {
    let store = match require_store(state, req) {
        Ok(s) => s,
        Err(resp) => return resp,
    };
    let student = match student_input(req).validate() {
        Ok(s) => s,
        Err(e) => return validation_err(req, &e),
    };
    let view = student.view();
    match store.add(student) {
        Ok(message) => ok(&req.id, json!({ "message": message, "student": view })),
        Err(e) => store_err(req, &e),
    }
}

fn handle_students_update(state: &mut AppState, req: &Request) -> serde_json::Value {
    let Some(original_code) = param_str(req, "originalCode").map(|s| s.to_string()) else {
        return err(&req.id, "bad_params", "missing originalCode", None);
    };
    let store = match require_store(state, req) {
        Ok(s) => s,
        Err(resp) => return resp,
    };
    let student = match student_input(req).validate() {
        Ok(s) => s,
        Err(e) => return validation_err(req, &e),
    };
    let view = student.view();
    match store.update(&original_code, student) {
        Ok(message) => ok(&req.id, json!({ "message": message, "student": view })),
        Err(e) => store_err(req, &e),
    }
}

fn handle_students_delete(state: &mut AppState, req: &Request) -> serde_json::Value {
    let Some(code) = param_code(req, "code") else {
        return err(&req.id, "bad_params", "missing code", None);
    };
    let store = match require_store(state, req) {
        Ok(s) => s,
        Err(resp) => return resp,
    };
    match store.delete(&code) {
        Ok(message) => ok(&req.id, json!({ "message": message, "code": code })),
        Err(e) => store_err(req, &e),
    }
}

fn handle_students_sort(state: &mut AppState, req: &Request) -> serde_json::Value {
    let key = match param_str(req, "key") {
        Some(k) => match SortKey::parse(k) {
            Some(key) => key,
            None => {
                return err(
                    &req.id,
                    "bad_params",
                    format!("unknown sort key: {k}"),
                    Some(json!({ "allowed": ["code", "name", "percentage"] })),
                )
            }
        },
        None => return err(&req.id, "bad_params", "missing key", None),
    };
    let descending = req
        .params
        .get("descending")
        .and_then(|v| v.as_bool())
        .unwrap_or(false);
    let store = match require_store(state, req) {
        Ok(s) => s,
        Err(resp) => return resp,
    };
    store.sort(key, descending);
    ok(&req.id, list_json(store.students()))
}

fn handle_students_reload(state: &mut AppState, req: &Request) -> serde_json::Value {
    let store = match require_store(state, req) {
        Ok(s) => s,
        Err(resp) => return resp,
    };
    let report = store.load();
    ok(&req.id, load_result(store, report))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "students.list" => Some(handle_students_list(state, req)),
        "students.get" => Some(handle_students_get(state, req)),
        "students.create" => Some(handle_students_create(state, req)),
        "students.update" => Some(handle_students_update(state, req)),
        "students.delete" => Some(handle_students_delete(state, req)),
        "students.sort" => Some(handle_students_sort(state, req)),
        "students.reload" => Some(handle_students_reload(state, req)),
        _ => None,
    }
}

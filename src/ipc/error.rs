use serde::Serialize;
use serde_json::json;

#[derive(Debug, Serialize)]
struct ErrObj<'a> {
    code: &'a str,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<serde_json::Value>,
}

pub fn ok(id: &str, result: serde_json::Value) -> serde_json::Value {
    json!({
        "id": id,
        "ok": true,
        "result": result
    })
}

/// Failure envelope; `code` is the stable identifier the UI switches on,
/// `message` is shown to the user as-is.
pub fn err(
    id: &str,
    code: &str,
    message: impl Into<String>,
    details: Option<serde_json::Value>,
) -> serde_json::Value {
    let error = ErrObj {
        code,
        message: message.into(),
        details,
    };
    json!({
        "id": id,
        "ok": false,
        "error": error,
    })
}

use std::io;

use docket_client::{ClientError, SuccessEnvelope};
use serde::Serialize;
use serde_json::{Value, json};

const JSON_VERSION: &str = "v1";

pub fn render_success_json(success: &SuccessEnvelope) -> io::Result<String> {
    let value = match success.command.as_str() {
        "import" | "import list" | "missing dismiss" | "missing uploaded" | "settings show"
        | "settings set" | "analyze" | "deadlines" => enveloped(&success.data),
        "patterns" => render_patterns_json(&success.data),
        "missing list" => render_missing_json(&success.data),
        "reminders" => render_reminders_json(&success.data),
        "reminders process" => enveloped(&success.data),
        _ => {
            return Err(io::Error::other(format!(
                "JSON output is not supported for command `{}`",
                success.command
            )));
        }
    };

    serialize_json_pretty(&value)
}

pub fn render_error_json(error: &ClientError) -> io::Result<String> {
    let payload = json!({
        "error": {
            "code": error.code,
            "message": error.message,
            "recovery_steps": error.recovery_steps,
        }
    });
    serialize_json_pretty(&payload)
}

fn enveloped(data: &Value) -> Value {
    json!({
        "ok": true,
        "version": JSON_VERSION,
        "data": data.clone()
    })
}

fn render_patterns_json(data: &Value) -> Value {
    json!({
        "policy_version": data.get("policy_version").cloned().unwrap_or(Value::Null),
        "from": data.get("from").cloned().unwrap_or(Value::Null),
        "to": data.get("to").cloned().unwrap_or(Value::Null),
        "rows": data.get("rows").cloned().unwrap_or_else(|| json!([])),
    })
}

fn render_missing_json(data: &Value) -> Value {
    json!({
        "policy_version": data.get("policy_version").cloned().unwrap_or(Value::Null),
        "as_of": data.get("as_of").cloned().unwrap_or(Value::Null),
        "rows": data.get("rows").cloned().unwrap_or_else(|| json!([])),
    })
}

fn render_reminders_json(data: &Value) -> Value {
    json!({
        "policy_version": data.get("policy_version").cloned().unwrap_or(Value::Null),
        "as_of": data.get("as_of").cloned().unwrap_or(Value::Null),
        "total_pending": data.get("total_pending").cloned().unwrap_or(Value::Null),
        "total_reminders": data.get("total_reminders").cloned().unwrap_or(Value::Null),
        "by_type": data.get("by_type").cloned().unwrap_or(Value::Null),
        "by_urgency": data.get("by_urgency").cloned().unwrap_or(Value::Null),
        "rows": data.get("rows").cloned().unwrap_or_else(|| json!([])),
        "warnings": data.get("warnings").cloned().unwrap_or_else(|| json!([])),
    })
}

fn serialize_json_pretty<T>(value: &T) -> io::Result<String>
where
    T: Serialize,
{
    serde_json::to_string_pretty(value).map_err(io::Error::other)
}

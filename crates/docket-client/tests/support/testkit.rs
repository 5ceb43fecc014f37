use std::fs;
use std::path::{Path, PathBuf};

use docket_client::commands::import::{self, ImportRunOptions};
use docket_client::commands::missing::{self, MissingListOptions};
use docket_client::commands::patterns::{self, PatternsRunOptions};
use docket_client::commands::reminders::{self, RemindersListOptions};
use serde_json::{Value, json};
use tempfile::{Builder, TempDir};

pub fn temp_home_in_tmp(prefix: &str) -> std::io::Result<(TempDir, PathBuf)> {
    let dir = Builder::new().prefix(prefix).tempdir_in("/tmp")?;
    let home = dir.path().join("tracker-home");
    fs::create_dir_all(&home)?;
    Ok((dir, home))
}

pub fn upload(document_type: &str, source: &str, uploaded_at: &str) -> Value {
    json!({
        "document_type": document_type,
        "source": source,
        "uploaded_at": uploaded_at,
    })
}

/// Uploads on the 15th of each month of 2026, starting in January.
pub fn monthly_uploads(document_type: &str, source: &str, months: u32) -> Vec<Value> {
    (1..=months)
        .map(|month| upload(document_type, source, &format!("2026-{month:02}-15")))
        .collect()
}

pub fn import_rows(home: &Path, rows: &[Value], as_of: &str) {
    let temp_dir = Builder::new()
        .prefix("docket-import-fixture")
        .tempdir_in("/tmp");
    assert!(temp_dir.is_ok());
    if let Ok(dir) = temp_dir {
        let fixture = write_fixture_json(dir.path(), "uploads.json", rows);
        assert!(fixture.is_ok());
        if let Ok(path) = fixture {
            let result = import::run_with_options(ImportRunOptions {
                path: Some(path.display().to_string()),
                dry_run: false,
                as_of: Some(as_of.to_string()),
                home_override: Some(home),
                stdin_override: None,
            });
            assert!(result.is_ok());
        }
    }
}

pub fn patterns_payload(home: &Path, from: Option<&str>, to: Option<&str>, as_of: &str) -> Value {
    let result = patterns::run_with_options(PatternsRunOptions {
        from: from.map(std::string::ToString::to_string),
        to: to.map(std::string::ToString::to_string),
        as_of: Some(as_of.to_string()),
        home_override: Some(home),
    });
    assert!(result.is_ok());
    if let Ok(success) = result {
        let payload = serde_json::to_value(success);
        assert!(payload.is_ok());
        if let Ok(value) = payload {
            return value;
        }
    }
    Value::Null
}

pub fn patterns_rows(home: &Path, from: Option<&str>, to: Option<&str>, as_of: &str) -> Vec<Value> {
    patterns_payload(home, from, to, as_of)["data"]["rows"]
        .as_array()
        .cloned()
        .unwrap_or_default()
}

pub fn missing_rows(home: &Path, as_of: &str) -> Vec<Value> {
    let result = missing::list_with_options(MissingListOptions {
        as_of: Some(as_of.to_string()),
        home_override: Some(home),
    });
    assert!(result.is_ok());
    if let Ok(success) = result {
        let payload = serde_json::to_value(success);
        assert!(payload.is_ok());
        if let Ok(value) = payload {
            return value["data"]["rows"].as_array().cloned().unwrap_or_default();
        }
    }
    Vec::new()
}

pub fn reminders_payload(home: &Path, as_of: &str, ignore_settings: bool) -> Value {
    let result = reminders::list_with_options(RemindersListOptions {
        as_of: Some(as_of.to_string()),
        ignore_settings,
        home_override: Some(home),
    });
    assert!(result.is_ok());
    if let Ok(success) = result {
        let payload = serde_json::to_value(success);
        assert!(payload.is_ok());
        if let Ok(value) = payload {
            return value["data"].clone();
        }
    }
    Value::Null
}

pub fn reminder_rows(home: &Path, as_of: &str) -> Vec<Value> {
    reminders_payload(home, as_of, false)["rows"]
        .as_array()
        .cloned()
        .unwrap_or_default()
}

pub fn pattern_exists(rows: &[Value], source: &str, frequency: &str) -> bool {
    rows.iter().any(|row| {
        row.get("source").and_then(Value::as_str) == Some(source)
            && row.get("frequency").and_then(Value::as_str) == Some(frequency)
    })
}

fn write_fixture_json(base: &Path, name: &str, rows: &[Value]) -> std::io::Result<PathBuf> {
    let path = base.join(name);
    let body = serde_json::to_string_pretty(rows).map_err(std::io::Error::other)?;
    fs::write(&path, body)?;
    Ok(path)
}

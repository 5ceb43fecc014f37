use std::fs;

use docket_client::setup::ensure_initialized_at;
use rusqlite::Connection;
use tempfile::tempdir;

fn object_exists(connection: &Connection, object_type: &str, object_name: &str) -> bool {
    let query = "SELECT 1 FROM sqlite_master WHERE type = ?1 AND name = ?2";
    let statement = connection.prepare(query);
    if statement.is_err() {
        return false;
    }

    if let Ok(mut stmt) = statement {
        let mut rows = stmt.query([object_type, object_name]);
        if rows.is_err() {
            return false;
        }

        if let Ok(ref mut row_cursor) = rows {
            let next_row = row_cursor.next();
            if let Ok(row) = next_row {
                return row.is_some();
            }
        }
    }

    false
}

fn meta_value(connection: &Connection, key: &str) -> Option<String> {
    let query = "SELECT value FROM internal_meta WHERE key = ?1 LIMIT 1";
    let statement = connection.prepare(query).ok()?;
    let mut stmt = statement;
    let rows = stmt.query([key]).ok()?;
    let mut row_cursor = rows;
    let row = row_cursor.next().ok()??;
    row.get::<_, String>(0).ok()
}

fn user_version(connection: &Connection) -> Option<i64> {
    connection
        .query_row("PRAGMA user_version", [], |row| row.get::<_, i64>(0))
        .ok()
}

#[test]
fn setup_creates_tracker_db_at_home_override() {
    let temp = tempdir();
    assert!(temp.is_ok());
    if let Ok(temp_dir) = temp {
        let home = temp_dir.path().join("tracker-home");

        let context = ensure_initialized_at(&home);
        assert!(context.is_ok());
        if let Ok(setup_context) = context {
            assert!(setup_context.db_path.ends_with("tracker.db"));
            assert!(setup_context.readonly_uri.contains("mode=ro"));
            assert!(home.join("tracker.db").exists());
        }
    }
}

#[test]
fn setup_is_idempotent_for_existing_trackers() {
    let temp = tempdir();
    assert!(temp.is_ok());
    if let Ok(temp_dir) = temp {
        let home = temp_dir.path().join("tracker-home");

        let first = ensure_initialized_at(&home);
        assert!(first.is_ok());
        let second = ensure_initialized_at(&home);
        assert!(second.is_ok());

        if let (Ok(first_context), Ok(second_context)) = (first, second) {
            assert_eq!(first_context.db_path, second_context.db_path);
            assert_eq!(first_context.schema_version, second_context.schema_version);
        }
    }
}

#[test]
fn setup_lands_every_required_table_view_and_index() {
    let temp = tempdir();
    assert!(temp.is_ok());
    if let Ok(temp_dir) = temp {
        let home = temp_dir.path().join("tracker-home");
        let context = ensure_initialized_at(&home);
        assert!(context.is_ok());

        if let Ok(setup_context) = context {
            let connection = Connection::open(&setup_context.db_path);
            assert!(connection.is_ok());
            if let Ok(conn) = connection {
                for table in [
                    "internal_meta",
                    "internal_import_runs",
                    "internal_uploads",
                    "internal_patterns",
                    "internal_missing_documents",
                    "internal_reminder_settings",
                    "internal_reminder_log",
                    "internal_analysis_runs",
                    "internal_tax_deadlines",
                ] {
                    assert!(object_exists(&conn, "table", table), "missing table {table}");
                }

                for view in [
                    "v1_uploads",
                    "v1_patterns",
                    "v1_missing_documents",
                    "v1_reminder_settings",
                    "v1_analysis_runs",
                ] {
                    assert!(object_exists(&conn, "view", view), "missing view {view}");
                }

                for index in [
                    "idx_internal_uploads_type_source_date",
                    "idx_internal_uploads_import_id",
                    "idx_internal_missing_documents_status",
                    "idx_internal_missing_documents_pattern_id",
                    "idx_internal_reminder_log_missing_id",
                    "idx_internal_analysis_runs_started_at_desc",
                ] {
                    assert!(object_exists(&conn, "index", index), "missing index {index}");
                }

                assert_eq!(user_version(&conn), Some(2));
                assert_eq!(meta_value(&conn, "schema_version"), Some("v1".to_string()));
                assert_eq!(
                    meta_value(&conn, "public_views_version"),
                    Some("v1".to_string())
                );
                assert_eq!(
                    meta_value(&conn, "upload_contract_version"),
                    Some("v1".to_string())
                );
            }
        }
    }
}

#[test]
fn a_dropped_view_is_repaired_on_the_next_startup() {
    let temp = tempdir();
    assert!(temp.is_ok());
    if let Ok(temp_dir) = temp {
        let home = temp_dir.path().join("tracker-home");
        let first = ensure_initialized_at(&home);
        assert!(first.is_ok());

        if let Ok(setup_context) = first {
            let connection = Connection::open(&setup_context.db_path);
            assert!(connection.is_ok());
            if let Ok(conn) = connection {
                let dropped = conn.execute_batch("DROP VIEW v1_patterns");
                assert!(dropped.is_ok());
                assert!(!object_exists(&conn, "view", "v1_patterns"));
            }

            let second = ensure_initialized_at(&home);
            assert!(second.is_ok());

            let reopened = Connection::open(&setup_context.db_path);
            assert!(reopened.is_ok());
            if let Ok(conn) = reopened {
                assert!(object_exists(&conn, "view", "v1_patterns"));
            }
        }
    }
}

#[test]
fn drifted_meta_values_are_rejected_as_corrupt() {
    let temp = tempdir();
    assert!(temp.is_ok());
    if let Ok(temp_dir) = temp {
        let home = temp_dir.path().join("tracker-home");
        let first = ensure_initialized_at(&home);
        assert!(first.is_ok());

        if let Ok(setup_context) = first {
            let connection = Connection::open(&setup_context.db_path);
            assert!(connection.is_ok());
            if let Ok(conn) = connection {
                let tampered = conn.execute(
                    "UPDATE internal_meta SET value = 'v9' WHERE key = 'schema_version'",
                    [],
                );
                assert!(tampered.is_ok());
            }

            let second = ensure_initialized_at(&home);
            assert!(second.is_err());
            if let Err(error) = second {
                assert_eq!(error.code, "tracker_corrupt");
            }
        }
    }
}

#[test]
fn a_non_database_file_is_reported_as_corrupt() {
    let temp = tempdir();
    assert!(temp.is_ok());
    if let Ok(temp_dir) = temp {
        let home = temp_dir.path().join("tracker-home");
        let created = fs::create_dir_all(&home);
        assert!(created.is_ok());
        let written = fs::write(home.join("tracker.db"), "not a sqlite file at all");
        assert!(written.is_ok());

        let result = ensure_initialized_at(&home);
        assert!(result.is_err());
        if let Err(error) = result {
            assert!(
                error.code == "tracker_corrupt" || error.code == "migration_failed",
                "unexpected code {}",
                error.code
            );
        }
    }
}

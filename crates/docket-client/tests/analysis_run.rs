mod support;

use docket_client::commands::analyze::{self, AnalyzeOptions};
use docket_client::commands::deadlines::{self, DeadlinesOptions};
use rusqlite::Connection;
use serde_json::Value;
use support::testkit::{import_rows, monthly_uploads, temp_home_in_tmp, upload};

fn run_analysis(home: &std::path::Path, as_of: &str) -> Value {
    let result = analyze::run_with_options(AnalyzeOptions {
        as_of: Some(as_of.to_string()),
        home_override: Some(home),
    });
    assert!(result.is_ok());
    if let Ok(envelope) = result {
        return serde_json::to_value(envelope).unwrap_or(Value::Null)["data"].clone();
    }
    Value::Null
}

fn deadline_rows(home: &std::path::Path) -> Vec<Value> {
    let result = deadlines::list_with_options(DeadlinesOptions {
        home_override: Some(home),
    });
    assert!(result.is_ok());
    if let Ok(envelope) = result {
        let payload = serde_json::to_value(envelope).unwrap_or(Value::Null);
        return payload["data"]["rows"].as_array().cloned().unwrap_or_default();
    }
    Vec::new()
}

#[test]
fn analyze_reports_sources_patterns_and_missing_counts() {
    let temp = temp_home_in_tmp("docket-analyze-counts");
    assert!(temp.is_ok());
    if let Ok((_dir, home)) = temp {
        let mut rows = monthly_uploads("bank_statement", "CBA", 6);
        rows.push(upload("payg_summary", "Acme", "2025-07-14"));
        import_rows(&home, &rows, "2026-06-20");

        let data = run_analysis(&home, "2026-07-26");
        assert_eq!(data["total_sources"], Value::from(2));
        // The lone PAYG upload stays unknown and does not count as detected.
        assert_eq!(data["patterns_detected"], Value::from(1));
        assert_eq!(data["missing_detected"], Value::from(1));
        assert_eq!(data["errors"].as_array().map(Vec::len), Some(0));
        assert!(data["run_id"].as_str().unwrap_or_default().starts_with("run_"));
        assert_eq!(
            data["policy_version"],
            Value::String("pattern/v1".to_string())
        );
    }
}

#[test]
fn every_analysis_run_is_recorded_in_the_run_log() {
    let temp = temp_home_in_tmp("docket-analyze-log");
    assert!(temp.is_ok());
    if let Ok((_dir, home)) = temp {
        import_rows(
            &home,
            &monthly_uploads("bank_statement", "CBA", 4),
            "2026-04-20",
        );
        run_analysis(&home, "2026-05-01");
        run_analysis(&home, "2026-05-02");

        let db_path = home.join("tracker.db");
        let connection = Connection::open(&db_path);
        assert!(connection.is_ok());
        if let Ok(conn) = connection {
            // One run per import plus the two explicit runs above.
            let count = conn.query_row("SELECT COUNT(*) FROM v1_analysis_runs", [], |row| {
                row.get::<_, i64>(0)
            });
            assert_eq!(count.ok(), Some(3));

            let recorded = conn.query_row(
                "SELECT total_sources, patterns_detected FROM v1_analysis_runs
                 ORDER BY started_at DESC, run_id DESC LIMIT 1",
                [],
                |row| Ok((row.get::<_, i64>(0)?, row.get::<_, i64>(1)?)),
            );
            assert_eq!(recorded.ok(), Some((1, 1)));
        }
    }
}

#[test]
fn confident_missing_documents_register_calendar_deadlines() {
    let temp = temp_home_in_tmp("docket-analyze-deadlines");
    assert!(temp.is_ok());
    if let Ok((_dir, home)) = temp {
        import_rows(
            &home,
            &monthly_uploads("bank_statement", "CBA", 6),
            "2026-07-26",
        );

        let rows = deadline_rows(&home);
        assert_eq!(rows.len(), 1);
        let deadline = &rows[0];
        assert_eq!(deadline["deadline_type"], Value::String("custom".to_string()));
        assert_eq!(deadline["due_date"], Value::String("2026-07-15".to_string()));
        let title = deadline["title"].as_str().unwrap_or_default();
        assert!(title.contains("bank statement"));
        assert!(title.contains("CBA"));
        assert!(deadline["missing_id"].as_str().unwrap_or_default().starts_with("mis_"));
        assert!(deadline["pattern_id"].as_str().unwrap_or_default().starts_with("pat_"));
    }
}

#[test]
fn low_confidence_records_never_reach_the_calendar() {
    let temp = temp_home_in_tmp("docket-analyze-gate");
    assert!(temp.is_ok());
    if let Ok((_dir, home)) = temp {
        // Wildly uneven intervals: volatile stability, low confidence.
        import_rows(
            &home,
            &[
                upload("receipt", "Officeworks", "2026-01-01"),
                upload("receipt", "Officeworks", "2026-01-11"),
                upload("receipt", "Officeworks", "2026-03-12"),
            ],
            "2026-05-01",
        );

        let data = run_analysis(&home, "2026-05-01");
        assert!(data["missing_detected"].as_i64().unwrap_or(0) >= 1);
        assert_eq!(data["deadlines_created"], Value::from(0));
        assert!(deadline_rows(&home).is_empty());
    }
}

#[test]
fn fulfilled_records_drop_their_deadlines_on_the_next_run() {
    let temp = temp_home_in_tmp("docket-analyze-refresh");
    assert!(temp.is_ok());
    if let Ok((_dir, home)) = temp {
        import_rows(
            &home,
            &monthly_uploads("bank_statement", "CBA", 6),
            "2026-07-26",
        );
        assert_eq!(deadline_rows(&home).len(), 1);

        import_rows(
            &home,
            &[upload("bank_statement", "CBA", "2026-07-27")],
            "2026-07-28",
        );
        assert!(deadline_rows(&home).is_empty());
    }
}

mod support;

use docket_client::commands::reminders::{self, RemindersProcessOptions};
use docket_client::commands::settings::{self, SettingsOptions, SettingsPatch};
use docket_client::notify::RecordingNotifier;
use serde_json::Value;
use support::testkit::{
    import_rows, monthly_uploads, reminder_rows, reminders_payload, temp_home_in_tmp,
};

fn import_overdue_statements(home: &std::path::Path, as_of: &str) {
    import_rows(home, &monthly_uploads("bank_statement", "CBA", 6), as_of);
}

#[test]
fn five_days_overdue_produces_an_overdue_high_reminder() {
    let temp = temp_home_in_tmp("docket-reminders-overdue");
    assert!(temp.is_ok());
    if let Ok((_dir, home)) = temp {
        // Grace ended 2026-07-20; five days later.
        import_overdue_statements(&home, "2026-07-25");

        let rows = reminder_rows(&home, "2026-07-25");
        assert_eq!(rows.len(), 1);
        assert_eq!(
            rows[0]["reminder_type"],
            Value::String("overdue".to_string())
        );
        assert_eq!(rows[0]["urgency"], Value::String("high".to_string()));
        assert!(rows[0]["actions"]
            .as_array()
            .map(|actions| actions.iter().any(|action| action == "upload"))
            .unwrap_or(false));
    }
}

#[test]
fn twenty_days_overdue_produces_a_critical_final_notice() {
    let temp = temp_home_in_tmp("docket-reminders-final");
    assert!(temp.is_ok());
    if let Ok((_dir, home)) = temp {
        import_overdue_statements(&home, "2026-08-09");

        let rows = reminder_rows(&home, "2026-08-09");
        assert_eq!(rows.len(), 1);
        assert_eq!(
            rows[0]["reminder_type"],
            Value::String("final_notice".to_string())
        );
        assert_eq!(rows[0]["urgency"], Value::String("critical".to_string()));
        let title = rows[0]["title"].as_str().unwrap_or_default();
        assert!(title.contains("Final Notice"));
        let body = rows[0]["body"].as_str().unwrap_or_default();
        assert!(body.contains("significantly overdue"));
    }
}

#[test]
fn disabled_settings_exclude_the_type_unless_ignored() {
    let temp = temp_home_in_tmp("docket-reminders-disabled");
    assert!(temp.is_ok());
    if let Ok((_dir, home)) = temp {
        import_overdue_statements(&home, "2026-07-25");

        let disabled = settings::set_with_options(
            "bank_statement",
            SettingsPatch {
                enabled: Some(false),
                ..SettingsPatch::default()
            },
            SettingsOptions {
                home_override: Some(&home),
            },
        );
        assert!(disabled.is_ok());

        let respected = reminders_payload(&home, "2026-07-25", false);
        assert_eq!(respected["total_reminders"], Value::from(0));
        assert_eq!(respected["total_pending"], Value::from(1));

        let ignored = reminders_payload(&home, "2026-07-25", true);
        assert_eq!(ignored["total_reminders"], Value::from(1));
    }
}

#[test]
fn groupings_in_the_payload_match_the_rows() {
    let temp = temp_home_in_tmp("docket-reminders-groups");
    assert!(temp.is_ok());
    if let Ok((_dir, home)) = temp {
        import_overdue_statements(&home, "2026-07-25");

        let payload = reminders_payload(&home, "2026-07-25", false);
        assert_eq!(payload["by_type"]["overdue"], Value::from(1));
        assert_eq!(payload["by_urgency"]["high"], Value::from(1));
        assert_eq!(payload["total_reminders"], Value::from(1));
        assert_eq!(
            payload["policy_version"],
            Value::String("pattern/v1".to_string())
        );
    }
}

#[test]
fn processing_delivers_due_reminders_and_flips_status_to_reminded() {
    let temp = temp_home_in_tmp("docket-reminders-process");
    assert!(temp.is_ok());
    if let Ok((_dir, home)) = temp {
        import_overdue_statements(&home, "2026-07-25");

        let notifier = RecordingNotifier::new();
        let processed = reminders::process_with_options(RemindersProcessOptions {
            as_of: Some("2026-07-25".to_string()),
            home_override: Some(&home),
            notifier: Some(&notifier),
        });
        assert!(processed.is_ok());
        if let Ok(envelope) = processed {
            let payload = serde_json::to_value(envelope).unwrap_or(Value::Null);
            assert_eq!(payload["data"]["processed"], Value::from(1));
            assert_eq!(payload["data"]["sent"], Value::from(1));
            assert_eq!(payload["data"]["failed"], Value::from(0));
        }

        // Default settings deliver over email only.
        let deliveries = notifier.deliveries();
        assert_eq!(deliveries.len(), 1);
        assert_eq!(deliveries[0].1, "email");

        let rows = support::testkit::missing_rows(&home, "2026-07-25");
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0]["status"], Value::String("reminded".to_string()));
    }
}

#[test]
fn repeated_processing_stops_at_the_reminder_cap() {
    let temp = temp_home_in_tmp("docket-reminders-cap");
    assert!(temp.is_ok());
    if let Ok((_dir, home)) = temp {
        import_overdue_statements(&home, "2026-07-25");

        let capped = settings::set_with_options(
            "bank_statement",
            SettingsPatch {
                max_reminders: Some(1),
                ..SettingsPatch::default()
            },
            SettingsOptions {
                home_override: Some(&home),
            },
        );
        assert!(capped.is_ok());

        let notifier = RecordingNotifier::new();
        let first = reminders::process_with_options(RemindersProcessOptions {
            as_of: Some("2026-07-25".to_string()),
            home_override: Some(&home),
            notifier: Some(&notifier),
        });
        assert!(first.is_ok());

        // The cap is reached, so the record is excluded entirely.
        let rows = reminder_rows(&home, "2026-08-09");
        assert!(rows.is_empty());
    }
}

#[test]
fn failed_deliveries_are_counted_and_surfaced() {
    let temp = temp_home_in_tmp("docket-reminders-failures");
    assert!(temp.is_ok());
    if let Ok((_dir, home)) = temp {
        import_overdue_statements(&home, "2026-07-25");

        let notifier = RecordingNotifier::failing();
        let processed = reminders::process_with_options(RemindersProcessOptions {
            as_of: Some("2026-07-25".to_string()),
            home_override: Some(&home),
            notifier: Some(&notifier),
        });
        assert!(processed.is_ok());
        if let Ok(envelope) = processed {
            let payload = serde_json::to_value(envelope).unwrap_or(Value::Null);
            assert_eq!(payload["data"]["sent"], Value::from(0));
            assert_eq!(payload["data"]["failed"], Value::from(1));
            let errors = payload["data"]["errors"].as_array().cloned().unwrap_or_default();
            assert_eq!(errors.len(), 1);
        }

        // A failed delivery leaves the record pending and uncounted.
        let rows = support::testkit::missing_rows(&home, "2026-07-25");
        assert_eq!(rows[0]["status"], Value::String("pending".to_string()));
        let retry = reminder_rows(&home, "2026-07-25");
        assert_eq!(retry.len(), 1);
    }
}

#[test]
fn reminders_before_their_send_date_are_not_processed() {
    let temp = temp_home_in_tmp("docket-reminders-notdue");
    assert!(temp.is_ok());
    if let Ok((_dir, home)) = temp {
        // Upcoming window: expected 2026-07-15, listed from 2026-07-08.
        import_overdue_statements(&home, "2026-07-09");

        let rows = reminder_rows(&home, "2026-07-09");
        assert_eq!(rows.len(), 1);
        assert_eq!(
            rows[0]["reminder_type"],
            Value::String("upcoming".to_string())
        );
        // First before-due slot for bank statements is 3 days ahead.
        assert_eq!(
            rows[0]["scheduled_for"],
            Value::String("2026-07-12".to_string())
        );

        let notifier = RecordingNotifier::new();
        let processed = reminders::process_with_options(RemindersProcessOptions {
            as_of: Some("2026-07-09".to_string()),
            home_override: Some(&home),
            notifier: Some(&notifier),
        });
        assert!(processed.is_ok());
        if let Ok(envelope) = processed {
            let payload = serde_json::to_value(envelope).unwrap_or(Value::Null);
            assert_eq!(payload["data"]["processed"], Value::from(0));
        }
        assert!(notifier.deliveries().is_empty());
    }
}

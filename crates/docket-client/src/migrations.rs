use std::collections::HashMap;

use rusqlite::Connection;
use rusqlite_migration::{M, Migrations};

const BOOTSTRAP_SQL: &str = include_str!("migrations/0001_bootstrap.sql");
const ADD_TAX_DEADLINES_SQL: &str = include_str!("migrations/0002_add_tax_deadlines.sql");

pub const REQUIRED_VIEW_NAMES: [&str; 5] = [
    "v1_uploads",
    "v1_patterns",
    "v1_missing_documents",
    "v1_reminder_settings",
    "v1_analysis_runs",
];

pub const REQUIRED_INDEX_NAMES: [&str; 6] = [
    "idx_internal_uploads_type_source_date",
    "idx_internal_uploads_import_id",
    "idx_internal_missing_documents_status",
    "idx_internal_missing_documents_pattern_id",
    "idx_internal_reminder_log_missing_id",
    "idx_internal_analysis_runs_started_at_desc",
];

pub const REQUIRED_META_KEYS: [(&str, &str); 3] = [
    ("schema_version", "v1"),
    ("public_views_version", "v1"),
    ("upload_contract_version", "v1"),
];

pub fn run_pending(conn: &mut Connection) -> rusqlite_migration::Result<()> {
    let migrations = Migrations::new(vec![M::up(BOOTSTRAP_SQL), M::up(ADD_TAX_DEADLINES_SQL)]);
    migrations.to_latest(conn)
}

pub fn safe_repair_statement(statement_name: &str) -> Option<String> {
    parse_safe_repair_statements().remove(statement_name)
}

fn parse_safe_repair_statements() -> HashMap<String, String> {
    let mut blocks: HashMap<String, String> = HashMap::new();
    let mut active_name: Option<String> = None;
    let mut active_sql = String::new();

    for line in BOOTSTRAP_SQL.lines() {
        let trimmed = line.trim();

        if let Some(name) = trimmed.strip_prefix("-- docket:safe_repair:start:") {
            active_name = Some(name.to_string());
            active_sql.clear();
            continue;
        }

        if let Some(name) = trimmed.strip_prefix("-- docket:safe_repair:end:") {
            if let Some(active) = &active_name
                && active == name
            {
                blocks.insert(name.to_string(), active_sql.trim().to_string());
            }
            active_name = None;
            active_sql.clear();
            continue;
        }

        if active_name.is_some() {
            active_sql.push_str(line);
            active_sql.push('\n');
        }
    }

    blocks
}

#[cfg(test)]
mod tests {
    use super::{REQUIRED_INDEX_NAMES, REQUIRED_VIEW_NAMES, safe_repair_statement};

    #[test]
    fn safe_repair_statement_exists_for_views_and_indexes() {
        for name in REQUIRED_VIEW_NAMES {
            assert!(safe_repair_statement(name).is_some());
        }
        for name in REQUIRED_INDEX_NAMES {
            assert!(safe_repair_statement(name).is_some());
        }
    }

    #[test]
    fn safe_repair_blocks_contain_create_statements() {
        for name in REQUIRED_VIEW_NAMES {
            let sql = safe_repair_statement(name);
            assert!(sql.is_some());
            if let Some(body) = sql {
                assert!(body.to_ascii_lowercase().contains("create view"));
            }
        }
    }
}

use std::path::{Path, PathBuf};

use crate::ClientResult;
use crate::analysis::date::{build_filter, format_iso_date};
use crate::analysis::pattern::{DocumentPattern, detect_patterns};
use crate::analysis::policy::PATTERN_POLICY_VERSION;
use crate::analysis::query::load_uploads;
use crate::commands::common::{data_range_hint, resolve_as_of};
use crate::contracts::envelope::{SuccessEnvelope, success};
use crate::contracts::types::{PatternChangeRow, PatternRow, PatternsData};
use crate::setup::{SetupContext, ensure_initialized, ensure_initialized_at};
use crate::state::open_connection;
use crate::store;

#[derive(Debug, Default)]
pub struct PatternsRunOptions<'a> {
    pub from: Option<String>,
    pub to: Option<String>,
    pub as_of: Option<String>,
    pub home_override: Option<&'a Path>,
}

pub fn run(from: Option<&str>, to: Option<&str>, as_of: Option<&str>) -> ClientResult<SuccessEnvelope> {
    run_with_options(PatternsRunOptions {
        from: from.map(std::string::ToString::to_string),
        to: to.map(std::string::ToString::to_string),
        as_of: as_of.map(std::string::ToString::to_string),
        home_override: None,
    })
}

#[doc(hidden)]
pub fn run_with_options(options: PatternsRunOptions<'_>) -> ClientResult<SuccessEnvelope> {
    let setup = load_setup(options.home_override)?;
    let filter = build_filter(options.from.as_deref(), options.to.as_deref(), "patterns")?;
    let as_of = resolve_as_of(options.as_of.as_deref(), "patterns")?;

    let db_path = PathBuf::from(&setup.db_path);
    let connection = open_connection(&db_path)?;
    let uploads = load_uploads(&connection, &db_path, &filter)?;
    let previous = store::load_patterns(&connection, &db_path)?;
    let patterns = detect_patterns(&uploads, &previous, as_of);

    let rows = patterns.iter().map(pattern_row).collect::<Vec<PatternRow>>();

    let data = PatternsData {
        policy_version: PATTERN_POLICY_VERSION.to_string(),
        from: filter.from.as_ref().map(format_iso_date),
        to: filter.to.as_ref().map(format_iso_date),
        rows,
        data_range_hint: data_range_hint(&setup.data_range),
    };

    success("patterns", data)
}

pub(crate) fn pattern_row(pattern: &DocumentPattern) -> PatternRow {
    PatternRow {
        pattern_id: pattern.pattern_id.clone(),
        document_type: pattern.document_type.clone(),
        source: pattern.source.clone(),
        frequency: pattern.frequency.as_str().to_string(),
        stability: pattern.stability.as_str().to_string(),
        confidence: pattern.confidence.as_str().to_string(),
        average_interval_days: pattern.average_interval_days,
        stddev_interval_days: pattern.stddev_interval_days,
        coefficient_of_variation: pattern.coefficient_of_variation,
        uploads_analyzed: pattern.uploads_analyzed,
        last_upload_date: pattern.last_upload_date.as_ref().map(format_iso_date),
        next_expected_date: pattern.next_expected_date.as_ref().map(format_iso_date),
        pattern_changes: pattern
            .pattern_changes
            .iter()
            .map(|change| PatternChangeRow {
                changed_at: format_iso_date(&change.changed_at),
                field: change.field.clone(),
                from: change.from.clone(),
                to: change.to.clone(),
            })
            .collect(),
    }
}

fn load_setup(home_override: Option<&Path>) -> ClientResult<SetupContext> {
    if let Some(home) = home_override {
        return ensure_initialized_at(home);
    }
    ensure_initialized()
}

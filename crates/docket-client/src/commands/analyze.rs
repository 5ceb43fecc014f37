use std::path::{Path, PathBuf};

use crate::ClientResult;
use crate::analysis::date::format_iso_date;
use crate::analysis::policy::PATTERN_POLICY_VERSION;
use crate::analysis::refresh::run_analysis;
use crate::commands::common::resolve_as_of;
use crate::contracts::envelope::{SuccessEnvelope, success};
use crate::contracts::types::AnalyzeData;
use crate::setup::{SetupContext, ensure_initialized, ensure_initialized_at};
use crate::state::open_connection;

#[derive(Debug, Default)]
pub struct AnalyzeOptions<'a> {
    pub as_of: Option<String>,
    pub home_override: Option<&'a Path>,
}

pub fn run(as_of: Option<&str>) -> ClientResult<SuccessEnvelope> {
    run_with_options(AnalyzeOptions {
        as_of: as_of.map(std::string::ToString::to_string),
        home_override: None,
    })
}

#[doc(hidden)]
pub fn run_with_options(options: AnalyzeOptions<'_>) -> ClientResult<SuccessEnvelope> {
    let setup = load_setup(options.home_override)?;
    let as_of = resolve_as_of(options.as_of.as_deref(), "analyze")?;

    let db_path = PathBuf::from(&setup.db_path);
    let mut connection = open_connection(&db_path)?;
    let outcome = run_analysis(&mut connection, &db_path, as_of)?;

    let data = AnalyzeData {
        run_id: outcome.run_id,
        policy_version: PATTERN_POLICY_VERSION.to_string(),
        as_of: format_iso_date(&as_of),
        total_sources: outcome.total_sources,
        patterns_detected: outcome.patterns_detected,
        missing_detected: outcome.missing_detected,
        deadlines_created: outcome.deadlines_created,
        duration_ms: outcome.duration_ms,
        errors: outcome.errors,
    };

    success("analyze", data)
}

fn load_setup(home_override: Option<&Path>) -> ClientResult<SetupContext> {
    if let Some(home) = home_override {
        return ensure_initialized_at(home);
    }
    ensure_initialized()
}

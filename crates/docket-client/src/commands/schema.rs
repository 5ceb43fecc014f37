use std::path::Path;

use crate::contracts::envelope::{SuccessEnvelope, success};
use crate::contracts::types::{SchemaSummaryData, SchemaViewData};
use crate::setup::{SetupContext, ensure_initialized, ensure_initialized_at};
use crate::{ClientError, ClientResult};

#[derive(Debug, Default)]
pub struct SchemaOptions<'a> {
    pub home_override: Option<&'a Path>,
}

pub fn summary() -> ClientResult<SuccessEnvelope> {
    summary_with_options(SchemaOptions::default())
}

#[doc(hidden)]
pub fn summary_with_options(options: SchemaOptions<'_>) -> ClientResult<SuccessEnvelope> {
    let setup = load_setup(options.home_override)?;
    let data = SchemaSummaryData {
        db_path: setup.db_path.clone(),
        schema_version: setup.schema_version.clone(),
        public_views: setup.public_views.clone(),
        data_range: setup.data_range.clone(),
    };
    success("schema", data)
}

pub fn view(view_name: &str) -> ClientResult<SuccessEnvelope> {
    view_with_options(view_name, SchemaOptions::default())
}

#[doc(hidden)]
pub fn view_with_options(
    view_name: &str,
    options: SchemaOptions<'_>,
) -> ClientResult<SuccessEnvelope> {
    let setup = load_setup(options.home_override)?;
    let found = setup
        .public_views
        .iter()
        .find(|candidate| candidate.name == view_name)
        .cloned();

    let Some(view) = found else {
        let known = setup
            .public_views
            .iter()
            .map(|candidate| candidate.name.clone())
            .collect::<Vec<String>>()
            .join(", ");
        return Err(ClientError::invalid_argument_with_recovery(
            &format!("Unknown view `{view_name}`."),
            vec![
                format!("Pick one of: {known}."),
                "Run `docket db schema` for the full storage contract.".to_string(),
            ],
        ));
    };

    success("schema.view", SchemaViewData { view })
}

fn load_setup(home_override: Option<&Path>) -> ClientResult<SetupContext> {
    if let Some(home) = home_override {
        return ensure_initialized_at(home);
    }
    ensure_initialized()
}

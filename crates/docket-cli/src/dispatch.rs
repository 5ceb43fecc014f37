use docket_client::commands;
use docket_client::commands::settings::SettingsPatch;
use docket_client::{ClientResult, SuccessEnvelope};

use crate::cli::{
    Cli, Commands, DbCommand, ImportCommand, IsoDate, MissingCommand, RemindersCommand,
    SchemaCommand, SettingsCommand,
};

pub fn dispatch(cli: &Cli) -> ClientResult<SuccessEnvelope> {
    match &cli.command {
        Commands::Import { command } => match command {
            ImportCommand::Create {
                dry_run,
                as_of,
                json: _,
                path,
            } => commands::import::run_with_options(commands::import::ImportRunOptions {
                path: path.clone(),
                dry_run: *dry_run,
                as_of: date_arg(as_of.as_ref()),
                home_override: None,
                stdin_override: None,
            }),
            ImportCommand::List { .. } => commands::import::list(),
        },
        Commands::Patterns {
            from, to, as_of, ..
        } => commands::patterns::run(
            from.as_ref().map(IsoDate::as_str),
            to.as_ref().map(IsoDate::as_str),
            as_of.as_ref().map(IsoDate::as_str),
        ),
        Commands::Missing { command } => match command {
            MissingCommand::List { as_of, .. } => {
                commands::missing::list(as_of.as_ref().map(IsoDate::as_str))
            }
            MissingCommand::Dismiss { missing_id, .. } => commands::missing::dismiss(missing_id),
            MissingCommand::Uploaded { missing_id, .. } => {
                commands::missing::mark_uploaded(missing_id)
            }
        },
        Commands::Reminders { command } => match command {
            RemindersCommand::List {
                as_of,
                ignore_settings,
                ..
            } => commands::reminders::list(as_of.as_ref().map(IsoDate::as_str), *ignore_settings),
            RemindersCommand::Process { as_of, .. } => {
                commands::reminders::process(as_of.as_ref().map(IsoDate::as_str))
            }
        },
        Commands::Settings { command } => match command {
            SettingsCommand::Show { document_type, .. } => {
                commands::settings::show(document_type.as_deref())
            }
            SettingsCommand::Set {
                document_type,
                enabled,
                days_before,
                days_after,
                email,
                push,
                max_reminders,
                ..
            } => commands::settings::set(
                document_type,
                SettingsPatch {
                    enabled: *enabled,
                    reminder_days_before: *days_before,
                    reminder_days_after: *days_after,
                    email_notifications: *email,
                    push_notifications: *push,
                    max_reminders: *max_reminders,
                },
            ),
        },
        Commands::Analyze { as_of, .. } => {
            commands::analyze::run(as_of.as_ref().map(IsoDate::as_str))
        }
        Commands::Deadlines { .. } => commands::deadlines::list(),
        Commands::Db { command } => match command {
            DbCommand::Schema { command } => match command {
                Some(SchemaCommand::View { view_name }) => commands::schema::view(view_name),
                None => commands::schema::summary(),
            },
        },
    }
}

fn date_arg(value: Option<&IsoDate>) -> Option<String> {
    value.map(|date| date.as_str().to_string())
}

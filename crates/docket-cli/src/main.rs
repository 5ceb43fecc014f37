mod cli;
mod dispatch;
mod output;
mod stdout_io;

use std::process::ExitCode;

use clap::{Parser, error::ErrorKind};
use docket_client::ClientError;
use stdout_io::write_stdout_text;

const ROOT_HELP: &str = "Docket - document upload patterns and reminders

Usage:
  docket <command>

Start here:
  docket import create --help
  docket patterns
  docket db schema
";

const TOP_LEVEL_HELP: &str = "Docket — document upload patterns and reminders

USAGE: docket <command>

Record your upload history:
  1. docket import create --help                    Read the import schema and workflow
  2. docket import create --dry-run <path>          Safely validate without data writes
  3. docket import create <path>                    Import upload events

See what Docket learned (refreshed on each import):
  docket patterns                                   Learned cadence per document source
  docket missing list                               Documents that look overdue or due soon
  docket reminders list                             The reminder batch that would go out
  docket deadlines                                  Tax-calendar entries for confident gaps

Act on it:
  docket reminders process                          Deliver due reminders and record sends
  docket missing uploaded <id>                      Close a record once the document arrives
  docket missing dismiss <id>                       Silence a record for good
  docket settings set <type> --enabled false        Tune per-type reminder behavior

Maintenance:
  docket analyze                                    Re-run detection without importing
  docket import list                                List past imports
  docket db schema                                  DB path and public view contracts

Run `docket <command> --help` for command usage.
";

fn main() -> ExitCode {
    match run() {
        Ok(code) => code,
        Err(code) => code,
    }
}

fn run() -> Result<ExitCode, ExitCode> {
    let raw_args = std::env::args().collect::<Vec<String>>();
    if raw_args.len() == 1 {
        if write_stdout_text(ROOT_HELP).is_err() {
            return Err(ExitCode::from(2));
        }
        return Ok(ExitCode::SUCCESS);
    }
    let parsed = cli::Cli::try_parse();
    let cli = match parsed {
        Ok(value) => value,
        Err(err) => {
            if matches!(
                err.kind(),
                ErrorKind::DisplayHelp
                    | ErrorKind::DisplayVersion
                    | ErrorKind::DisplayHelpOnMissingArgumentOrSubcommand
            ) {
                if matches!(
                    err.kind(),
                    ErrorKind::DisplayHelp | ErrorKind::DisplayHelpOnMissingArgumentOrSubcommand
                ) && is_top_level_help_request(&raw_args)
                {
                    if write_stdout_text(TOP_LEVEL_HELP).is_err() {
                        return Err(ExitCode::from(2));
                    }
                } else if write_stdout_text(&err.to_string()).is_err() {
                    return Err(ExitCode::from(2));
                }
                return Ok(ExitCode::SUCCESS);
            }
            let command_hint = if matches!(
                err.kind(),
                ErrorKind::MissingRequiredArgument
                    | ErrorKind::InvalidValue
                    | ErrorKind::ValueValidation
                    | ErrorKind::WrongNumberOfValues
                    | ErrorKind::UnknownArgument
                    | ErrorKind::InvalidSubcommand
            ) {
                command_path_from_args(&raw_args)
            } else {
                None
            };
            let clean_message = strip_clap_boilerplate(&err.to_string());
            let parse_error =
                ClientError::invalid_argument_for_command(&clean_message, command_hint.as_deref());
            let mode = infer_requested_output_mode(&raw_args);
            if output::print_failure(&parse_error, mode).is_err() {
                return Err(ExitCode::from(2));
            }
            return Err(ExitCode::from(1));
        }
    };
    let mode = output::mode_for_command(&cli.command);

    let dispatched = dispatch::dispatch(&cli);
    match dispatched {
        Ok(success) => {
            if output::print_success(&success, mode).is_err() {
                return Err(ExitCode::from(2));
            }
            Ok(ExitCode::SUCCESS)
        }
        Err(error) => {
            if output::print_failure(&error, mode).is_err() {
                return Err(ExitCode::from(2));
            }
            Err(exit_code_for_error(&error))
        }
    }
}

fn is_top_level_help_request(raw_args: &[String]) -> bool {
    raw_args.len() == 2 && matches!(raw_args[1].as_str(), "--help" | "-h")
}

/// Strips clap's trailing boilerplate (Usage line, "For more information"
/// hint) so our "What to do next" section is the single source of guidance.
fn strip_clap_boilerplate(message: &str) -> String {
    let trimmed = if let Some(pos) = message.find("\n\nUsage:") {
        &message[..pos]
    } else if let Some(pos) = message.find("\nFor more information") {
        &message[..pos]
    } else {
        message
    };
    trimmed.trim_end().to_string()
}

/// Builds the subcommand path from raw CLI args for use in help hints.
fn command_path_from_args(raw_args: &[String]) -> Option<String> {
    let non_flags: Vec<&str> = raw_args
        .iter()
        .skip(1)
        .filter(|value| !value.starts_with('-'))
        .map(String::as_str)
        .collect();
    if non_flags.is_empty() {
        return None;
    }

    let hint = match non_flags.as_slice() {
        ["import", "create", ..] => Some("import create"),
        ["import", "list", ..] => Some("import list"),
        ["import", ..] => Some("import"),
        ["patterns", ..] => Some("patterns"),
        ["missing", "list", ..] => Some("missing list"),
        ["missing", "dismiss", ..] => Some("missing dismiss"),
        ["missing", "uploaded", ..] => Some("missing uploaded"),
        ["missing", ..] => Some("missing"),
        ["reminders", "list", ..] => Some("reminders list"),
        ["reminders", "process", ..] => Some("reminders process"),
        ["reminders", ..] => Some("reminders"),
        ["settings", "show", ..] => Some("settings show"),
        ["settings", "set", ..] => Some("settings set"),
        ["settings", ..] => Some("settings"),
        ["analyze", ..] => Some("analyze"),
        ["deadlines", ..] => Some("deadlines"),
        ["db", "schema", "view", ..] => Some("db schema view"),
        ["db", "schema", ..] => Some("db schema"),
        ["db", ..] => Some("db"),
        _ => None,
    };
    hint.map(std::string::ToString::to_string)
}

fn exit_code_for_error(error: &ClientError) -> ExitCode {
    if is_internal_error(error) {
        ExitCode::from(2)
    } else {
        ExitCode::from(1)
    }
}

fn infer_requested_output_mode(raw_args: &[String]) -> output::OutputMode {
    if raw_args.iter().skip(1).any(|value| value == "--json") {
        return output::OutputMode::Json;
    }
    output::OutputMode::Text
}

fn is_internal_error(error: &ClientError) -> bool {
    error.code.starts_with("internal_")
        || matches!(
            error.code.as_str(),
            "tracker_init_permission_denied"
                | "tracker_locked"
                | "tracker_corrupt"
                | "migration_failed"
                | "tracker_init_failed"
        )
}

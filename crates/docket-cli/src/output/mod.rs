mod analyze_text;
mod error_text;
mod format;
mod import_text;
mod json;
mod missing_text;
mod mode;
mod patterns_text;
mod reminders_text;
mod schema_text;
mod settings_text;

use std::io;

use docket_client::{ClientError, SuccessEnvelope};

pub use mode::{OutputMode, mode_for_command};

pub fn print_success(success: &SuccessEnvelope, mode: OutputMode) -> io::Result<()> {
    let body = match mode {
        OutputMode::Text => render_text_success(success)?,
        OutputMode::Json => json::render_success_json(success)?,
    };
    println!("{body}");
    Ok(())
}

pub fn print_failure(error: &ClientError, mode: OutputMode) -> io::Result<()> {
    let body = match mode {
        OutputMode::Json => json::render_error_json(error)?,
        OutputMode::Text => error_text::render_error(error),
    };
    println!("{body}");
    Ok(())
}

fn render_text_success(success: &SuccessEnvelope) -> io::Result<String> {
    match success.command.as_str() {
        "schema" => schema_text::render_schema_summary(&success.data),
        "schema.view" => schema_text::render_schema_view(&success.data),
        "import" => import_text::render_import_run(&success.data),
        "import list" => import_text::render_import_list(&success.data),
        "patterns" => patterns_text::render_patterns(&success.data),
        "missing list" => missing_text::render_missing_list(&success.data),
        "missing dismiss" | "missing uploaded" => {
            missing_text::render_missing_action(&success.data)
        }
        "reminders" => reminders_text::render_reminders(&success.data),
        "reminders process" => reminders_text::render_process(&success.data),
        "settings show" => settings_text::render_settings_show(&success.data),
        "settings set" => settings_text::render_settings_set(&success.data),
        "analyze" => analyze_text::render_analyze(&success.data),
        "deadlines" => analyze_text::render_deadlines(&success.data),
        _ => Err(io::Error::other(format!(
            "unsupported text output command `{}`",
            success.command
        ))),
    }
}

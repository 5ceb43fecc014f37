use chrono::NaiveDate;
use clap::{Parser, Subcommand};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IsoDate(pub String);

impl IsoDate {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

pub fn parse_iso_date(value: &str) -> Result<IsoDate, String> {
    if value.len() != 10 {
        return Err("date must use YYYY-MM-DD format".to_string());
    }

    let bytes = value.as_bytes();
    if bytes[4] != b'-' || bytes[7] != b'-' {
        return Err("date must use YYYY-MM-DD format".to_string());
    }

    for index in [0usize, 1, 2, 3, 5, 6, 8, 9] {
        if !bytes[index].is_ascii_digit() {
            return Err("date must use YYYY-MM-DD format".to_string());
        }
    }

    if NaiveDate::parse_from_str(value, "%Y-%m-%d").is_err() {
        return Err("date must use valid calendar values".to_string());
    }

    Ok(IsoDate(value.to_string()))
}

pub fn parse_bool_value(value: &str) -> Result<bool, String> {
    match value {
        "true" | "on" | "yes" => Ok(true),
        "false" | "off" | "no" => Ok(false),
        _ => Err("expected `true` or `false`".to_string()),
    }
}

/// Extended help shown after `docket import create --help`.
/// Contains workflow guidance, schema, and next-step instructions.
pub const IMPORT_CREATE_AFTER_HELP: &str = "\
How import works:
  Docket does not read your documents. You record one row per document
  you uploaded (or received), and Docket learns each source's rhythm
  from the dates alone.

  Accepted formats:
    JSON — one top-level array of upload objects
    CSV  — one header row with schema field names

  <path> is a local file path.
  To read stdin explicitly, use `-` as the path.
  Example: cat uploads.json | docket import create --dry-run -

What to do next:
  1. Export or jot down your upload history as JSON or CSV.
  2. Run `docket import create --dry-run <path>` and fix any reported issues.
  3. Run `docket import create <path>` once dry-run passes.
  4. Run `docket patterns` to see what Docket learned.

Import schema:
  JSON example (one top-level array):
  [
    {
      \"document_type\": \"bank_statement\",
      \"source\": \"Commonwealth Bank\",
      \"uploaded_at\": \"2026-01-15\",
      \"reference\": \"statement-jan.pdf\",
      \"notes\": \"everyday account\"
    }
  ]

  CSV example (header + rows):
  document_type,source,uploaded_at,reference,notes
  bank_statement,Commonwealth Bank,2026-01-15,statement-jan.pdf,everyday account
  payg_summary,Acme Pty Ltd,2026-07-14,,

Stability rule (important):
  Keep `document_type` and `source` spelled exactly the same across
  imports. Docket groups history by that pair; if the spelling drifts,
  the learned patterns drift too.

Field rules:
  document_type (required):
    A stable type key in snake_case. Known keys get tuned reminder
    schedules: bank_statement, credit_card_statement, dividend_statement,
    interest_statement, payg_summary, rental_statement. Any other key
    works and falls back to the default schedule.

  source (required):
    Who issues the document. Example: `Commonwealth Bank`

  uploaded_at (required):
    Date only, exactly `YYYY-MM-DD`.

  reference (optional):
    File name or external id, if you have one. Two uploads from the same
    source on the same day need distinct references to both be kept.

  notes (optional):
    Free text for your own use.
";

#[derive(Debug, Parser)]
#[command(
    name = "docket",
    version,
    about = "document upload patterns and reminders",
    disable_help_subcommand = true
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Manage upload-history imports
    #[command(arg_required_else_help = true)]
    Import {
        #[command(subcommand)]
        command: ImportCommand,
    },
    /// Show learned upload patterns per document source
    Patterns {
        /// Start date filter (YYYY-MM-DD)
        #[arg(long, value_parser = parse_iso_date)]
        from: Option<IsoDate>,
        /// End date filter (YYYY-MM-DD)
        #[arg(long, value_parser = parse_iso_date)]
        to: Option<IsoDate>,
        /// Evaluate as of this date instead of today (YYYY-MM-DD)
        #[arg(long, value_parser = parse_iso_date)]
        as_of: Option<IsoDate>,
        /// Emit structured JSON object output for machine parsing
        #[arg(long)]
        json: bool,
    },
    /// Inspect and act on missing-document records
    #[command(arg_required_else_help = true)]
    Missing {
        #[command(subcommand)]
        command: MissingCommand,
    },
    /// Generate and deliver document reminders
    #[command(arg_required_else_help = true)]
    Reminders {
        #[command(subcommand)]
        command: RemindersCommand,
    },
    /// Show or change per-document-type reminder settings
    #[command(arg_required_else_help = true)]
    Settings {
        #[command(subcommand)]
        command: SettingsCommand,
    },
    /// Re-run pattern analysis and missing-document detection now
    Analyze {
        /// Evaluate as of this date instead of today (YYYY-MM-DD)
        #[arg(long, value_parser = parse_iso_date)]
        as_of: Option<IsoDate>,
        /// Emit structured JSON object output for machine parsing
        #[arg(long)]
        json: bool,
    },
    /// List tax-calendar deadlines created from confident missing documents
    Deadlines {
        /// Emit structured JSON object output for machine parsing
        #[arg(long)]
        json: bool,
    },
    /// Database discovery commands
    #[command(arg_required_else_help = true)]
    Db {
        #[command(subcommand)]
        command: DbCommand,
    },
}

#[derive(Debug, Clone, Subcommand)]
pub enum ImportCommand {
    /// Import normalized upload events into your local Docket tracker
    #[command(after_long_help = IMPORT_CREATE_AFTER_HELP)]
    Create {
        /// Validate import data without writing to the tracker
        #[arg(long)]
        dry_run: bool,
        /// Analyze as of this date instead of today (YYYY-MM-DD)
        #[arg(long, value_parser = parse_iso_date)]
        as_of: Option<IsoDate>,
        /// Emit machine-readable JSON output
        #[arg(long)]
        json: bool,
        /// Path to a normalized JSON or CSV file (use `-` for stdin)
        path: Option<String>,
    },
    /// List all past imports with their row counts
    List {
        /// Emit machine-readable JSON output
        #[arg(long)]
        json: bool,
    },
}

#[derive(Debug, Clone, Subcommand)]
pub enum MissingCommand {
    /// List open missing-document records
    List {
        /// Evaluate as of this date instead of today (YYYY-MM-DD)
        #[arg(long, value_parser = parse_iso_date)]
        as_of: Option<IsoDate>,
        /// Emit machine-readable JSON output
        #[arg(long)]
        json: bool,
    },
    /// Dismiss a record so it stops generating reminders
    Dismiss {
        /// The record id to dismiss (e.g. mis_abc123)
        missing_id: String,
        /// Emit machine-readable JSON output
        #[arg(long)]
        json: bool,
    },
    /// Mark a record uploaded once the document has arrived
    Uploaded {
        /// The record id to close (e.g. mis_abc123)
        missing_id: String,
        /// Emit machine-readable JSON output
        #[arg(long)]
        json: bool,
    },
}

#[derive(Debug, Clone, Subcommand)]
pub enum RemindersCommand {
    /// Show the reminder batch that would go out
    List {
        /// Evaluate as of this date instead of today (YYYY-MM-DD)
        #[arg(long, value_parser = parse_iso_date)]
        as_of: Option<IsoDate>,
        /// Generate even for document types with reminders disabled
        #[arg(long)]
        ignore_settings: bool,
        /// Emit machine-readable JSON output
        #[arg(long)]
        json: bool,
    },
    /// Deliver due reminders and record the sends
    Process {
        /// Evaluate as of this date instead of today (YYYY-MM-DD)
        #[arg(long, value_parser = parse_iso_date)]
        as_of: Option<IsoDate>,
        /// Emit machine-readable JSON output
        #[arg(long)]
        json: bool,
    },
}

#[derive(Debug, Clone, Subcommand)]
pub enum SettingsCommand {
    /// Show stored reminder settings (optionally for one document type)
    Show {
        /// Document type key (e.g. bank_statement)
        document_type: Option<String>,
        /// Emit machine-readable JSON output
        #[arg(long)]
        json: bool,
    },
    /// Change reminder settings for one document type
    Set {
        /// Document type key (e.g. bank_statement)
        document_type: String,
        /// Turn reminders on or off for this type
        #[arg(long, value_parser = parse_bool_value)]
        enabled: Option<bool>,
        /// Days before the expected date for the first reminder
        #[arg(long = "days-before")]
        days_before: Option<i64>,
        /// Days after the expected date for the first overdue reminder
        #[arg(long = "days-after")]
        days_after: Option<i64>,
        /// Deliver reminders over email
        #[arg(long, value_parser = parse_bool_value)]
        email: Option<bool>,
        /// Deliver reminders over push notifications
        #[arg(long, value_parser = parse_bool_value)]
        push: Option<bool>,
        /// Maximum reminders per missing document
        #[arg(long = "max-reminders")]
        max_reminders: Option<i64>,
        /// Emit machine-readable JSON output
        #[arg(long)]
        json: bool,
    },
}

#[derive(Debug, Clone, Subcommand)]
pub enum DbCommand {
    /// Show your local database path and public view contracts
    Schema {
        #[command(subcommand)]
        command: Option<SchemaCommand>,
    },
}

#[derive(Debug, Clone, Subcommand)]
pub enum SchemaCommand {
    /// Show column details for a specific public view
    View {
        /// Name of the view to inspect (e.g. v1_patterns)
        view_name: String,
    },
}

#[cfg(test)]
pub fn parse_from<I, T>(itr: I) -> Result<Cli, clap::Error>
where
    I: IntoIterator<Item = T>,
    T: Into<std::ffi::OsString> + Clone,
{
    Cli::try_parse_from(itr)
}

use crate::cli::{
    Commands, ImportCommand, MissingCommand, RemindersCommand, SettingsCommand,
};

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum OutputMode {
    Text,
    Json,
}

pub fn mode_for_command(command: &Commands) -> OutputMode {
    let json = match command {
        Commands::Import { command } => match command {
            ImportCommand::Create { json, .. } | ImportCommand::List { json } => *json,
        },
        Commands::Missing { command } => match command {
            MissingCommand::List { json, .. }
            | MissingCommand::Dismiss { json, .. }
            | MissingCommand::Uploaded { json, .. } => *json,
        },
        Commands::Reminders { command } => match command {
            RemindersCommand::List { json, .. } | RemindersCommand::Process { json, .. } => *json,
        },
        Commands::Settings { command } => match command {
            SettingsCommand::Show { json, .. } | SettingsCommand::Set { json, .. } => *json,
        },
        Commands::Patterns { json, .. }
        | Commands::Analyze { json, .. }
        | Commands::Deadlines { json } => *json,
        Commands::Db { .. } => false,
    };

    if json { OutputMode::Json } else { OutputMode::Text }
}

//! Session management CLI commands.

use clap::{Args, Subcommand};

use crate::output::{self, OutputFormat, SessionRow};
use userhub_auth::UserDirectory;
use userhub_core::error::AppError;

/// Arguments for session commands
#[derive(Debug, Args)]
pub struct SessionArgs {
    /// Session subcommand
    #[command(subcommand)]
    pub command: SessionCommand,
}

/// Session subcommands
#[derive(Debug, Subcommand)]
pub enum SessionCommand {
    /// List a user's sessions
    List {
        /// Username
        username: String,
    },
    /// Revoke one session
    Revoke {
        /// Username
        username: String,
        /// Session ID
        id: String,
    },
    /// Revoke every session of a user except one
    RevokeOthers {
        /// Username
        username: String,
        /// Session ID to keep
        id: String,
    },
}

/// Execute session commands
pub fn execute(
    args: &SessionArgs,
    directory: &UserDirectory,
    format: OutputFormat,
) -> Result<(), AppError> {
    match &args.command {
        SessionCommand::List { username } => {
            let user = directory.load_user(username)?;
            let rows = SessionRow::from_user(&user.export_public());
            output::print_list(&rows, format);
        }
        SessionCommand::Revoke { username, id } => {
            directory.update_user(username, |user| {
                user.session_rm(id)?;
                user.write()
            })?;
            output::print_success(&format!("Session {} of '{}' revoked", id, username));
        }
        SessionCommand::RevokeOthers { username, id } => {
            let removed = directory.update_user(username, |user| {
                if user.session_get(id).is_none() {
                    output::print_warning(&format!(
                        "'{}' has no session {}, revoking all sessions",
                        username, id
                    ));
                }
                let removed = user.session_n_rm(id);
                user.write()?;
                Ok(removed)
            })?;
            output::print_success(&format!("{} session(s) of '{}' revoked", removed, username));
        }
    }

    Ok(())
}

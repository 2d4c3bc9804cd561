//! User management CLI commands.

use clap::{Args, Subcommand};
use serde::Serialize;
use tabled::Tabled;

use crate::output::{self, OutputFormat};
use userhub_auth::UserDirectory;
use userhub_core::error::AppError;

/// Arguments for user commands
#[derive(Debug, Args)]
pub struct UserArgs {
    /// User subcommand
    #[command(subcommand)]
    pub command: UserCommand,
}

/// User subcommands
#[derive(Debug, Subcommand)]
pub enum UserCommand {
    /// List all users
    List,
    /// Create a user
    Add {
        /// Username
        username: String,
        /// Group membership, repeatable
        #[arg(short, long = "group")]
        groups: Vec<String>,
        /// Password (prompted when omitted)
        #[arg(short, long)]
        password: Option<String>,
    },
    /// Delete a user and all of their sessions
    Remove {
        /// Username
        username: String,
        /// Skip confirmation
        #[arg(long)]
        force: bool,
    },
    /// Change a user's password
    Passwd {
        /// Username
        username: String,
        /// New password (prompted when omitted)
        #[arg(short, long)]
        password: Option<String>,
    },
    /// Replace a user's groups
    Groups {
        /// Username
        username: String,
        /// New groups; none clears all memberships
        groups: Vec<String>,
    },
    /// Show a user without secrets
    Show {
        /// Username
        username: String,
    },
}

/// User display row for table output
#[derive(Debug, Serialize, Tabled)]
struct UserRow {
    /// Username
    username: String,
    /// Groups
    groups: String,
    /// Session count
    sessions: usize,
}

/// Execute user commands
pub fn execute(
    args: &UserArgs,
    directory: &UserDirectory,
    format: OutputFormat,
) -> Result<(), AppError> {
    match &args.command {
        UserCommand::List => {
            let rows: Vec<UserRow> = directory
                .users()?
                .iter()
                .map(|u| UserRow {
                    username: u.name().to_string(),
                    groups: u.groups().join(", "),
                    sessions: u.sessions().len(),
                })
                .collect();

            output::print_list(&rows, format);
        }
        UserCommand::Add {
            username,
            groups,
            password,
        } => {
            let password = match password {
                Some(p) => p.clone(),
                None => prompt_password()?,
            };

            match directory.create_user(username, &password, groups.clone())? {
                Some(_) => output::print_success(&format!("User '{}' created", username)),
                None => {
                    return Err(AppError::argument(format!(
                        "User limit of {} reached, '{}' not created.",
                        directory.limits().max_users,
                        username
                    )));
                }
            }
        }
        UserCommand::Remove { username, force } => {
            let user = directory.load_user(username)?;

            if !force {
                let confirm = dialoguer::Confirm::new()
                    .with_prompt(format!("Delete user '{}' and all of their sessions?", username))
                    .default(false)
                    .interact()
                    .map_err(|e| AppError::internal(format!("Input error: {}", e)))?;

                if !confirm {
                    output::print_warning("Aborted");
                    return Ok(());
                }
            }

            user.remove()?;
            output::print_success(&format!("User '{}' removed", username));
        }
        UserCommand::Passwd { username, password } => {
            directory.load_user(username)?;
            let password = match password {
                Some(p) => p.clone(),
                None => prompt_password()?,
            };

            directory.update_user(username, |user| {
                user.set_password(&password)?;
                user.write()
            })?;
            output::print_success(&format!("Password of '{}' changed", username));
        }
        UserCommand::Groups { username, groups } => {
            directory.update_user(username, |user| {
                user.set_groups(groups.clone())?;
                user.write()
            })?;
            output::print_success(&format!(
                "Groups of '{}' set to [{}]",
                username,
                groups.join(", ")
            ));
        }
        UserCommand::Show { username } => {
            let user = directory.load_user(username)?;
            output::print_user(&user.export_public(), format);
        }
    }

    Ok(())
}

fn prompt_password() -> Result<String, AppError> {
    dialoguer::Password::new()
        .with_prompt("Password")
        .with_confirmation("Repeat password", "Passwords do not match")
        .interact()
        .map_err(|e| AppError::internal(format!("Input error: {}", e)))
}

//! Command handlers, one module per top-level subcommand.

pub mod config_cmd;
pub mod info;
pub mod man;
pub mod sensors;
pub mod setup;
pub mod states;
pub mod watch;

mod util;

use hassmirror_core::ConnectionConfig;

use crate::cli::{Command, GlobalOpts};
use crate::error::CliError;

/// Route a hub-bound command to its handler.
pub async fn dispatch(
    cmd: Command,
    profile_name: &str,
    conn: ConnectionConfig,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let result = match cmd {
        Command::States(args) => states::handle_list(&conn, args, global).await,
        Command::State(args) => states::handle_one(&conn, args, global).await,
        Command::Sensors => sensors::handle(conn, global).await,
        Command::Info => info::handle(conn, profile_name, global).await,
        Command::Watch(args) => watch::handle(conn, args, global).await,
        Command::Setup(_) | Command::Config(_) | Command::Completions(_) | Command::Man(_) => {
            unreachable!("handled before a connection is resolved")
        }
    };
    result.map_err(|e| e.for_profile(profile_name))
}

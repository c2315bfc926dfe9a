//! Command-line interface.

pub mod commands;
pub mod types;

pub use types::{Cli, Commands, LocateArgs, RunArgs};

/// Print a fatal error and exit non-zero.
pub fn handle_error(err: anyhow::Error, json_mode: bool) -> ! {
    if json_mode {
        let payload = serde_json::json!({ "error": format!("{err:#}") });
        eprintln!("{payload}");
    } else {
        eprintln!("{}", console::style(format!("error: {err:#}")).red());
    }
    std::process::exit(1);
}

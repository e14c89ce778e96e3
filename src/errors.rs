// Error types for windtunnel

use snafu::Snafu;
use std::io;

#[derive(Debug, Snafu)]
pub enum WindTunnelError {
    // Accounts file errors
    #[snafu(display("Error reading accounts file"))]
    AccountsIOError { source: io::Error },
    #[snafu(display("Invalid account record on line {line}"))]
    AccountsParseError {
        line: usize,
        source: serde_json::Error,
    },

    // Wing catalog errors
    #[snafu(display("Unknown wing profile: {id}"))]
    UnknownWingProfile { id: String },

    // Config management errors
    #[snafu(display("Could not find application data directory to save config file"))]
    NoConfigDir,
    #[snafu(display("Error writing config file"))]
    ConfigIOError { source: io::Error },
    #[snafu(display("Error serializing config file"))]
    ConfigSerializeError { source: serde_json::Error },

    // User input validation errors
    #[snafu(display("Invalid user input: {field} - {reason}"))]
    InvalidUserInput { field: String, reason: String },

    // UI errors
    #[snafu(display("Could not start the user interface: {reason}"))]
    UiStartError { reason: String },
}

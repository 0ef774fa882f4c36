//! CLI module for orderdesk
//!
//! - `serve`: run the HTTP API (default)

pub mod serve;

use clap::{Parser, Subcommand};

/// orderdesk - merchant order desk API with a response cache
#[derive(Parser)]
#[command(name = "orderdesk")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Run the API server
    Serve(serve::ServeArgs),
}

impl Cli {
    /// Subcommand to run, `serve` when none was given
    pub fn command(self) -> Command {
        self.command
            .unwrap_or(Command::Serve(serve::ServeArgs::default()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serve_is_default() {
        let cli = Cli::parse_from(["orderdesk"]);
        let Command::Serve(args) = cli.command();
        assert_eq!(args.port, None);
    }

    #[test]
    fn test_serve_overrides() {
        let cli = Cli::parse_from(["orderdesk", "serve", "--host", "127.0.0.1", "--port", "9000"]);
        let Command::Serve(args) = cli.command();
        assert_eq!(args.host.as_deref(), Some("127.0.0.1"));
        assert_eq!(args.port, Some(9000));
    }
}

//! CLI argument definitions.

use std::path::PathBuf;

use clap::{ArgAction, Parser, Subcommand};

use querymind::config::Endpoints;

/// QueryMind - chat with the QueryMind assistant and feed it PDFs
#[derive(Parser, Debug)]
#[command(name = "querymind")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(flatten)]
    pub endpoints: Endpoints,

    /// File holding the auth token (default: ~/.querymind/auth_token)
    #[arg(long, env = "QUERYMIND_TOKEN_FILE", global = true)]
    pub token_file: Option<PathBuf>,

    /// Increase log verbosity (-v, -vv)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Subcommand to execute (defaults to `chat`)
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start an interactive chat session
    Chat,

    /// Send a single message and print the reply
    Send {
        /// Continue an existing backend session
        #[arg(short, long)]
        session: Option<String>,

        /// Message to send
        #[arg(trailing_var_arg = true, required = true)]
        message: Vec<String>,
    },

    /// Upload PDF files into an existing backend session
    Upload {
        /// Session to upload into
        #[arg(short, long)]
        session: Option<String>,

        /// PDF files to upload, in order
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },

    /// Log in and store the access token
    Login {
        /// Account email
        #[arg(long)]
        email: String,

        /// Account password (prompted for when omitted)
        #[arg(long, env = "QUERYMIND_PASSWORD", hide_env_values = true)]
        password: Option<String>,
    },

    /// Create an account
    Signup {
        /// Account email
        #[arg(long)]
        email: String,

        /// Display name
        #[arg(long)]
        name: Option<String>,

        /// Account password (prompted for when omitted)
        #[arg(long, env = "QUERYMIND_PASSWORD", hide_env_values = true)]
        password: Option<String>,
    },

    /// Forget the stored access token
    Logout,

    /// Show login state and configured endpoints
    Status,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_to_no_subcommand() {
        let cli = Cli::parse_from(["querymind"]);
        assert!(cli.command.is_none());
        assert_eq!(cli.verbose, 0);
    }

    #[test]
    fn send_collects_trailing_words() {
        let cli = Cli::parse_from(["querymind", "send", "-s", "s1", "hello", "there"]);
        match cli.command {
            Some(Commands::Send { session, message }) => {
                assert_eq!(session.as_deref(), Some("s1"));
                assert_eq!(message, ["hello", "there"]);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn global_flags_after_subcommand() {
        let cli = Cli::parse_from([
            "querymind",
            "upload",
            "a.pdf",
            "b.pdf",
            "--upload-url",
            "http://files.test",
            "-vv",
        ]);
        assert_eq!(cli.endpoints.upload_url, "http://files.test");
        assert_eq!(cli.verbose, 2);
        match cli.command {
            Some(Commands::Upload { session, files }) => {
                assert!(session.is_none());
                assert_eq!(files.len(), 2);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }
}

//! Parsing of lines typed into the interactive chat.

use std::path::PathBuf;

/// One line of interactive input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input {
    /// Plain text to send.
    Message(String),
    /// `/attach <file>...`
    Attach(Vec<PathBuf>),
    /// `/remove <n>`, 1-based as listed by `/files`.
    Remove(usize),
    /// `/files`
    Files,
    /// `/upload`
    Upload,
    /// `/help`
    Help,
    /// `/quit` or `/exit`
    Quit,
    /// Blank line.
    Empty,
    /// Unrecognized or malformed command, with a hint.
    Invalid(String),
}

pub const HELP: &str = "\
Commands:
  /attach <file>...  Stage PDF files for upload
  /files             List staged files
  /remove <n>        Unstage file number n
  /upload            Upload staged files into this conversation
  /help              Show this help
  /quit              Leave
Anything else is sent as a message.";

pub fn parse(line: &str) -> Input {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return Input::Empty;
    }
    let Some(command) = trimmed.strip_prefix('/') else {
        return Input::Message(line.trim_end_matches(['\r', '\n']).to_string());
    };

    let mut words = command.split_whitespace();
    match words.next().unwrap_or_default() {
        "attach" => {
            let paths: Vec<PathBuf> = words.map(PathBuf::from).collect();
            if paths.is_empty() {
                Input::Invalid("usage: /attach <file>...".into())
            } else {
                Input::Attach(paths)
            }
        }
        "remove" | "rm" => match words.next().and_then(|n| n.parse::<usize>().ok()) {
            Some(n) if n > 0 => Input::Remove(n),
            _ => Input::Invalid("usage: /remove <n>".into()),
        },
        "files" | "ls" => Input::Files,
        "upload" => Input::Upload,
        "help" | "?" => Input::Help,
        "quit" | "exit" | "q" => Input::Quit,
        other => Input::Invalid(format!("unknown command /{other}, try /help")),
    }
}

//! CLI command execution.
//!
//! Reads the token store, builds the HTTP backend, and drives a
//! `Conversation`. This is the only layer that touches stdin/stdout.

use std::io::Write;
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use chrono::Local;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use querymind::auth::{self, AuthToken, Credentials, TokenStore};
use querymind::backend::{ChatBackend, HttpBackend};
use querymind::chat::{Activity, ChatError, Conversation, StateEvent};
use querymind::config::Endpoints;
use querymind::format::{format_bot_response, render_plain};
use querymind::models::{Message, PendingUpload, Sender};

use super::args::{Cli, Commands};
use super::input::{self, Input};

/// Everything a command needs from the global options.
struct CommandContext {
    endpoints: Endpoints,
    store: TokenStore,
    client: reqwest::Client,
}

impl CommandContext {
    fn from_cli(cli: &Cli) -> Result<Self> {
        let store = match &cli.token_file {
            Some(path) => TokenStore::new(path),
            None => TokenStore::default_location()?,
        };
        Ok(Self {
            endpoints: cli.endpoints.clone(),
            store,
            client: reqwest::Client::new(),
        })
    }

    fn backend(&self) -> HttpBackend {
        self.endpoints.backend(self.client.clone())
    }

    fn token(&self) -> Result<Option<AuthToken>> {
        self.store
            .load()
            .with_context(|| format!("Failed to read token from {}", self.store.path().display()))
    }
}

pub async fn execute(cli: Cli) -> Result<()> {
    let ctx = CommandContext::from_cli(&cli)?;

    match cli.command {
        None | Some(Commands::Chat) => run_chat(&ctx).await,
        Some(Commands::Send { session, message }) => {
            send_once(&ctx, session.as_deref(), &message.join(" ")).await
        }
        Some(Commands::Upload { session, files }) => {
            upload_once(&ctx, session.as_deref(), &files).await
        }
        Some(Commands::Login { email, password }) => login(&ctx, email, password).await,
        Some(Commands::Signup {
            email,
            name,
            password,
        }) => signup(&ctx, email, name, password).await,
        Some(Commands::Logout) => logout(&ctx),
        Some(Commands::Status) => status(&ctx),
    }
}

// === Rendering ===

fn render_message(message: &Message) -> String {
    let time = message.created_at.with_timezone(&Local).format("%H:%M:%S");
    let body = match message.sender {
        Sender::Bot => render_plain(&format_bot_response(&message.text)),
        Sender::User => message.text.clone(),
    };
    let mut out = format!("[{time}] {}> {body}", message.sender);
    for name in &message.attachments {
        out.push_str(&format!("\n    attached: {name}"));
    }
    out
}

fn render_staged(files: &[PendingUpload]) {
    if files.is_empty() {
        println!("No files staged.");
        return;
    }
    println!("Staged files:");
    for (i, file) in files.iter().enumerate() {
        println!("  {}. {}", i + 1, file.name);
    }
}

/// Print state changes as they happen. User messages are skipped because
/// the user just typed them.
fn spawn_renderer(mut events: mpsc::UnboundedReceiver<StateEvent>) -> JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(event) = events.recv().await {
            match event {
                StateEvent::MessageAppended(m) if m.is_bot() => println!("{}", render_message(&m)),
                StateEvent::BusyChanged {
                    activity: Activity::Sending,
                    busy: true,
                } => println!("AI is thinking..."),
                StateEvent::BusyChanged {
                    activity: Activity::Uploading,
                    busy: true,
                } => println!("Uploading..."),
                StateEvent::SessionChanged(id) => println!("(session {id})"),
                _ => {}
            }
        }
    })
}

fn alert(err: &ChatError) {
    eprintln!("! {err}");
}

// === Chat ===

async fn run_chat(ctx: &CommandContext) -> Result<()> {
    let Some(token) = ctx.token()? else {
        bail!("Not logged in. Run `querymind login --email <email>` first.");
    };

    let (conversation, events) = Conversation::with_events(ctx.backend());
    let renderer = spawn_renderer(events);
    conversation.greet();
    println!("Type a message, or /help for commands.");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await.context("Failed to read input")? {
        match input::parse(&line) {
            Input::Message(text) => {
                if let Err(e) = conversation.send(&text, Some(&token)).await {
                    alert(&e);
                }
            }
            Input::Attach(paths) => {
                let requested = paths.len();
                let accepted = conversation.stage_paths(&paths);
                if accepted < requested {
                    println!("Skipped {} non-PDF file(s).", requested - accepted);
                }
                if conversation.state().session_id().is_none() {
                    println!("Send a message first to start the conversation and enable PDF uploads.");
                }
                render_staged(&conversation.state().staged());
            }
            Input::Remove(n) => match conversation.unstage(n - 1) {
                Some(file) => println!("Removed {}.", file.name),
                None => println!("No staged file number {n}."),
            },
            Input::Files => render_staged(&conversation.state().staged()),
            Input::Upload => match conversation.upload(Some(&token)).await {
                Ok(report) if !report.is_complete() => {
                    render_staged(&conversation.state().staged());
                }
                Ok(_) => {}
                Err(e) => alert(&e),
            },
            Input::Help => println!("{}", input::HELP),
            Input::Quit => break,
            Input::Empty => {}
            Input::Invalid(hint) => println!("{hint}"),
        }
    }

    drop(conversation);
    renderer.await.context("Renderer task failed")?;
    Ok(())
}

/// Print the bot side of a one-shot conversation.
fn print_bot_messages<B: ChatBackend>(conversation: &Conversation<B>) {
    for message in &conversation.state().messages() {
        if message.is_bot() {
            println!("{}", render_message(message));
        }
    }
}

async fn send_once(ctx: &CommandContext, session: Option<&str>, message: &str) -> Result<()> {
    let token = ctx.token()?;
    let conversation = Conversation::new(ctx.backend());
    if let Some(id) = session {
        conversation.state().set_session_id(id);
    }

    let delivery = conversation.send(message, token.as_ref()).await?;
    print_bot_messages(&conversation);
    if let Some(id) = conversation.state().session_id() {
        eprintln!("Session: {id}");
    }
    if delivery.is_failed() {
        bail!("Message was not delivered");
    }
    Ok(())
}

async fn upload_once(ctx: &CommandContext, session: Option<&str>, files: &[PathBuf]) -> Result<()> {
    let token = ctx.token()?;
    let conversation = Conversation::new(ctx.backend());
    if let Some(id) = session {
        conversation.state().set_session_id(id);
    }

    let requested = files.len();
    let accepted = conversation.stage_paths(files);
    if accepted < requested {
        eprintln!("Skipped {} non-PDF file(s).", requested - accepted);
    }

    let report = conversation.upload(token.as_ref()).await?;
    print_bot_messages(&conversation);
    if let Some(failure) = report.failure {
        let remaining = conversation.state().staged().len();
        bail!(
            "Upload stopped at {}; {remaining} file(s) not uploaded",
            failure.file
        );
    }
    Ok(())
}

// === Auth ===

/// Use the given password or prompt for one on stdin.
fn password_or_prompt(password: Option<String>) -> Result<String> {
    if let Some(p) = password {
        return Ok(p);
    }
    eprint!("Password: ");
    std::io::stderr().flush().ok();
    let mut line = String::new();
    std::io::stdin()
        .read_line(&mut line)
        .context("Failed to read password")?;
    let password = line.trim_end_matches(['\r', '\n']).to_string();
    if password.is_empty() {
        bail!("Password is required");
    }
    Ok(password)
}

async fn login(ctx: &CommandContext, email: String, password: Option<String>) -> Result<()> {
    let credentials = Credentials {
        email,
        password: password_or_prompt(password)?,
        name: None,
    };
    let token = auth::login(&ctx.client, &ctx.endpoints.login_url, &credentials)
        .await
        .context("Login failed")?;
    ctx.store.save(&token).context("Failed to store token")?;
    println!("Logged in as {}.", credentials.email);
    Ok(())
}

async fn signup(
    ctx: &CommandContext,
    email: String,
    name: Option<String>,
    password: Option<String>,
) -> Result<()> {
    let credentials = Credentials {
        email,
        password: password_or_prompt(password)?,
        name,
    };
    auth::signup(&ctx.client, &ctx.endpoints.signup_url, &credentials)
        .await
        .context("Signup failed")?;
    println!(
        "Account created for {}. Run `querymind login --email {}` to sign in.",
        credentials.email, credentials.email
    );
    Ok(())
}

fn logout(ctx: &CommandContext) -> Result<()> {
    if ctx.store.clear()? {
        println!("Signed out.");
    } else {
        println!("Not logged in.");
    }
    Ok(())
}

fn status(ctx: &CommandContext) -> Result<()> {
    let state = if ctx.token()?.is_some() {
        "logged in"
    } else {
        "not logged in"
    };
    println!("Auth:       {state} ({})", ctx.store.path().display());
    println!("Chat URL:   {}", ctx.endpoints.chat_url);
    println!("Upload URL: {}", ctx.endpoints.upload_url);
    println!("Login URL:  {}", ctx.endpoints.login_url);
    println!("Signup URL: {}", ctx.endpoints.signup_url);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bot_messages_render_with_formatting() {
        let message = Message::bot("- Paper (http://arxiv.org/abs/1)")
            .with_attachments(vec!["a.pdf".into()]);
        let rendered = render_message(&message);
        assert!(rendered.contains("bot> "));
        assert!(rendered.contains("  * Paper\n    http://arxiv.org/abs/1"));
        assert!(rendered.ends_with("attached: a.pdf"));
    }

    #[test]
    fn user_messages_render_verbatim() {
        let rendered = render_message(&Message::user("- not (http://a.card)"));
        assert!(rendered.ends_with("user> - not (http://a.card)"));
    }
}

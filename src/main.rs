//! Chat Registry - Entry Point
//!
//! Registers a user, logs them in, and runs an interactive chat session
//! against the room dispatcher.

use std::env;
use std::sync::Arc;

use tokio::io::{self, AsyncBufReadExt, AsyncWriteExt, BufReader, Lines, Stdin};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use chat_registry::{
    open_sink, spawn_dispatcher, AppError, ChatSession, CliPrompts, Config,
    InMemoryUserRepository, PasswordHasher, Role, User, UserService,
};

/// Line-based prompting over stdin
struct Prompter {
    lines: Lines<BufReader<Stdin>>,
}

impl Prompter {
    fn new() -> Self {
        Self {
            lines: BufReader::new(io::stdin()).lines(),
        }
    }

    /// Print a prompt and read one trimmed line
    async fn ask(&mut self, prompt: &str) -> Result<String, AppError> {
        let mut stdout = io::stdout();
        stdout.write_all(prompt.as_bytes()).await?;
        stdout.flush().await?;

        match self.lines.next_line().await? {
            Some(line) => Ok(line.trim().to_string()),
            None => Err(AppError::InputClosed),
        }
    }

    async fn confirm(&mut self, prompt: &str) -> Result<bool, AppError> {
        Ok(self.ask(prompt).await?.eq_ignore_ascii_case("y"))
    }
}

async fn register(
    service: &UserService,
    input: &mut Prompter,
    prompts: &CliPrompts,
) -> Result<User, AppError> {
    let username = input.ask(&prompts.username).await?;
    let password = input.ask(&prompts.password).await?;
    let role: Role = input.ask(&prompts.role).await?.parse()?;

    let user = service.create_user(&username, &password, role)?;
    println!("User created successfully.");
    Ok(user)
}

async fn login(
    service: &UserService,
    input: &mut Prompter,
    prompts: &CliPrompts,
) -> Result<User, AppError> {
    let username = input.ask(&prompts.username).await?;
    let password = input.ask(&prompts.password).await?;
    service.login(&username, &password)
}

async fn chat(
    mut session: ChatSession,
    input: &mut Prompter,
    prompts: &CliPrompts,
) -> Result<(), AppError> {
    println!("{} has joined the chat.", session.username());

    loop {
        let message = input.ask(&prompts.message).await?;
        if let Err(e) = session.send(message) {
            warn!("Message dropped: {}", e);
        }

        if input.confirm(&prompts.leave_chat).await? {
            let name = session.username().to_string();
            match session.leave() {
                Ok(()) => {
                    println!("{} has left the chat.", name);
                    return Ok(());
                }
                Err((unsent, e)) => {
                    warn!("Leave not delivered, try again: {}", e);
                    session = unsent;
                }
            }
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), AppError> {
    // Initialize logging with environment filter
    // Use RUST_LOG env var to control log level
    // e.g., RUST_LOG=debug or RUST_LOG=chat_registry=trace
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("chat_registry=info")),
        )
        .init();

    // Config file from command line, defaults otherwise
    let config = match env::args().nth(1) {
        Some(path) => {
            info!("Loading config from {}", path);
            Config::load(&path)?
        }
        None => Config::default(),
    };

    let sink = open_sink(config.report_format, config.report_path.as_deref()).await?;
    let (handle, dispatcher) = spawn_dispatcher(&config.dispatcher, sink)?;
    info!("Room dispatcher running");

    let service = UserService::new(
        Arc::new(InMemoryUserRepository::new()),
        PasswordHasher::new(&config.hashing)?,
        config.accounts.clone(),
    )?;

    let mut input = Prompter::new();

    register(&service, &mut input, &config.prompts).await?;
    let user = login(&service, &mut input, &config.prompts).await?;

    let session = ChatSession::join(user.username, handle.clone())?;
    chat(session, &mut input, &config.prompts).await?;

    // Dropping the last handle lets the dispatcher finish its reports
    drop(handle);
    match dispatcher.await {
        Ok(membership) => info!("Room closed with {} member(s)", membership.len()),
        Err(e) => warn!("Room dispatcher task failed: {}", e),
    }

    Ok(())
}

use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "sylphie",
    about = "Chat with a webhook endpoint from the terminal"
)]
pub struct CliArgs {
    /// Command word: `set-url <URL>` or `test`.
    #[arg(index = 1)]
    pub command: Option<String>,
    #[arg(index = 2)]
    pub value: Option<String>,
    /// Webhook endpoint, overriding the saved configuration for this run.
    #[arg(long)]
    pub url: Option<String>,
    /// Request timeout in milliseconds.
    #[arg(long)]
    pub timeout_ms: Option<u64>,
    /// Identifier sent as `userId` with every message.
    #[arg(long)]
    pub user_id: Option<String>,
    #[arg(long, short = 'c')]
    pub config: Option<PathBuf>,
    /// Send a single prompt and exit instead of starting the REPL.
    #[arg(long)]
    pub prompt: Option<String>,
    /// Probe the endpoint with a synthetic message and exit.
    #[arg(long)]
    pub test: bool,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum CommandKind {
    SetUrl,
    Test,
}

impl CommandKind {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.to_lowercase().as_str() {
            "set-url" => Some(Self::SetUrl),
            "test" => Some(Self::Test),
            _ => None,
        }
    }
}

impl CliArgs {
    pub fn command_kind(&self) -> Option<CommandKind> {
        self.command.as_deref().and_then(CommandKind::parse)
    }
}

use std::io::{self, BufRead, Write};
use std::sync::Arc;

use anyhow::{anyhow, bail};
use clap::Parser;

use sylphie::config::{load_settings, save_settings, SettingsUpdate};
use sylphie::{ChatRole, ConversationController, WebhookClient};

use crate::args::{CliArgs, CommandKind};
use crate::logging::init_logging;

pub async fn run() -> anyhow::Result<()> {
    let args = CliArgs::parse();
    let mut loaded = load_settings(args.config.clone())?;
    init_logging(&loaded.settings.logging, &loaded.paths)?;

    if args.command_kind() == Some(CommandKind::SetUrl) {
        let url = args
            .value
            .clone()
            .ok_or_else(|| anyhow!("usage: sylphie set-url <URL>"))?;
        loaded.settings.apply(SettingsUpdate {
            url: Some(url),
            ..Default::default()
        });
        save_settings(&loaded.settings, &loaded.paths)?;
        println!("Configuration saved");
        return Ok(());
    }

    // Flags override the saved settings for this run only.
    loaded.settings.apply(SettingsUpdate {
        url: args.url.clone(),
        timeout_ms: args.timeout_ms,
        user_id: args.user_id.clone(),
    });

    let endpoint = loaded.settings.webhook.endpoint().ok_or_else(|| {
        anyhow!("no webhook URL configured; run `sylphie set-url <URL>` or pass --url")
    })?;
    let client = WebhookClient::new(endpoint)?;
    let controller = ConversationController::new(Arc::new(client));

    if args.test || args.command_kind() == Some(CommandKind::Test) {
        return run_test(&controller).await;
    }
    if let Some(prompt) = args.prompt {
        controller.send_message(&prompt).await;
        print_last_reply(&controller)?;
        return Ok(());
    }
    run_repl(&controller).await
}

async fn run_test(controller: &ConversationController) -> anyhow::Result<()> {
    if controller.test_connection().await {
        println!("Connection successful");
        Ok(())
    } else {
        bail!("Connection failed. Check your webhook URL.")
    }
}

async fn run_repl(controller: &ConversationController) -> anyhow::Result<()> {
    println!("SYLPHIE — type a message, or /clear, /test, /dump, /quit");
    let stdin = io::stdin();
    let mut stdout = io::stdout();
    loop {
        write!(stdout, "> ")?;
        stdout.flush()?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }
        match line.trim() {
            "" => continue,
            "/quit" | "/exit" => break,
            "/clear" => {
                controller.clear();
                println!("Conversation cleared");
            }
            "/test" => {
                if controller.test_connection().await {
                    println!("Connection successful");
                } else {
                    println!("Connection failed. Check your webhook URL.");
                }
            }
            "/dump" => println!("{}", controller.debug_dump()),
            text => {
                controller.send_message(text).await;
                print_last_reply(controller)?;
            }
        }
    }
    Ok(())
}

fn print_last_reply(controller: &ConversationController) -> anyhow::Result<()> {
    let messages = controller.messages();
    if let Some(reply) = messages.iter().rev().find(|m| m.role == ChatRole::Assistant) {
        let mut stdout = io::stdout();
        writeln!(stdout, "{}", reply.text)?;
        stdout.flush()?;
    }
    Ok(())
}

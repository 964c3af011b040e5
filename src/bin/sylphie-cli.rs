#[path = "sylphie-cli/app.rs"]
mod app;
#[path = "sylphie-cli/args.rs"]
mod args;
#[path = "sylphie-cli/logging.rs"]
mod logging;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    app::run().await
}

#[path = "chatbook-cli/app/mod.rs"]
mod app;
#[path = "chatbook-cli/args.rs"]
mod args;
#[path = "chatbook-cli/config/mod.rs"]
mod config;
#[path = "chatbook-cli/logging.rs"]
mod logging;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    app::run().await
}

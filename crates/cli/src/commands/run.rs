//! `docbot run` — chat with the bot from the terminal.

use std::sync::Arc;

use docbot_agent::DocBot;
use docbot_channels::CliChannel;
use docbot_core::channel::Channel;
use tracing::info;

use super::setup;

pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config = setup::load_config()?;
    let pipeline = setup::build_pipeline(&config).await?;

    let name = config.identity.assistant_name.clone();
    let channel = Arc::new(CliChannel::new().with_assistant_name(&name));
    let inbound = channel.start().await.map_err(|e| format!("Channel error: {e}"))?;

    println!();
    println!("  {name} — Interactive Mode");
    println!();
    println!("  Provider:  {}", config.default_provider);
    println!("  Model:     {}", config.default_model);
    println!("  Docs:      {}", config.knowledge.docs_dir.as_deref().unwrap_or("(none)"));
    println!();
    println!("  Type your question and press Enter. Try {}help.", config.bot.command_prefix);
    println!("  Type 'exit' or Ctrl+D to quit.");
    println!();

    let bot = Arc::new(DocBot::new(name, channel.clone(), pipeline, config.bot.clone()));
    info!("DocBot ready");

    let outcome = bot.run(inbound).await;
    channel.stop().await.ok();
    outcome.map_err(|e| format!("Bot stopped: {e}"))?;

    println!("  Goodbye!");
    Ok(())
}

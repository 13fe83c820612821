//! `docbot ask` — answer one question and print it.

use docbot_agent::post_process;
use docbot_core::chunk::split_text;
use docbot_core::pipeline::{Pipeline, PipelineInput};

use super::setup;

pub async fn run(question: &str) -> Result<(), Box<dyn std::error::Error>> {
    let config = setup::load_config()?;
    let pipeline = setup::build_pipeline(&config).await?;

    eprint!("  Thinking...");
    let raw = pipeline.invoke(PipelineInput { question, history: &[] }).await;
    eprint!("\r              \r");

    let answer = post_process(&raw?);
    if answer.is_empty() {
        eprintln!("  (no answer)");
        return Ok(());
    }

    for chunk in split_text(&answer, config.bot.max_message_bytes)? {
        println!("{chunk}");
    }
    Ok(())
}

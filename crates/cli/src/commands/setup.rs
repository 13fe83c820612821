//! Startup wiring shared by `run` and `ask`.

use std::path::Path;
use std::sync::Arc;

use docbot_agent::{ContextAssembler, RagPipeline};
use docbot_config::AppConfig;
use docbot_core::provider::Provider;
use docbot_core::retriever::Retriever;
use docbot_knowledge::{EmbeddingIndex, NoopRetriever, load_markdown_dir};
use tracing::{info, warn};

/// Load and validate the config. Fails when no API key can be found.
pub fn load_config() -> Result<AppConfig, Box<dyn std::error::Error>> {
    let config = AppConfig::load().map_err(|e| format!("Failed to load config: {e}"))?;

    if !config.has_api_key() && config.default_provider != "ollama" {
        eprintln!();
        eprintln!("  ERROR: No API key configured for '{}'!", config.default_provider);
        eprintln!();
        eprintln!("  Set one of these environment variables:");
        eprintln!("    DOCBOT_API_KEY   (generic)");
        eprintln!("    OPENAI_API_KEY   (OpenAI)");
        eprintln!("    MISTRAL_API_KEY  (Mistral)");
        eprintln!();
        eprintln!("  Or add it to your config file:");
        eprintln!("    {}", AppConfig::config_dir().join("config.toml").display());
        eprintln!();
        return Err("No API key found. See above for setup instructions.".into());
    }

    Ok(config)
}

/// Build the provider, index the docs and assemble the RAG pipeline.
///
/// Any failure here is fatal to startup.
pub async fn build_pipeline(
    config: &AppConfig,
) -> Result<Arc<RagPipeline>, Box<dyn std::error::Error>> {
    let router = docbot_providers::build_from_config(config);
    let provider = router.default().ok_or("No default provider configured")?;

    let retriever = build_retriever(config, provider.clone()).await?;

    let model = config
        .providers
        .get(&config.default_provider)
        .and_then(|p| p.default_model.clone())
        .unwrap_or_else(|| config.default_model.clone());

    let pipeline = RagPipeline::new(provider, retriever, &model)
        .with_temperature(config.default_temperature)
        .with_max_tokens(config.default_max_tokens)
        .with_top_k(config.knowledge.top_k)
        .with_assembler(ContextAssembler::from_identity(&config.identity));

    info!(
        provider = %config.default_provider,
        model = %model,
        "RAG pipeline ready"
    );
    Ok(Arc::new(pipeline))
}

async fn build_retriever(
    config: &AppConfig,
    provider: Arc<dyn Provider>,
) -> Result<Arc<dyn Retriever>, Box<dyn std::error::Error>> {
    let Some(docs_dir) = &config.knowledge.docs_dir else {
        warn!("No knowledge.docs_dir configured, answering without documentation");
        return Ok(Arc::new(NoopRetriever));
    };

    let knowledge = &config.knowledge;
    let documents = load_markdown_dir(
        Path::new(docs_dir),
        knowledge.chunk_size,
        knowledge.chunk_overlap,
    )
    .map_err(|e| format!("Failed to load documentation: {e}"))?;

    let index = EmbeddingIndex::new(&knowledge.index_name, provider, &config.embedding_model)
        .with_min_score(knowledge.min_score);
    let count = index
        .add_documents(documents)
        .await
        .map_err(|e| format!("Failed to index documentation: {e}"))?;

    info!(
        index = %knowledge.index_name,
        passages = count,
        dir = %docs_dir,
        "Documentation indexed"
    );
    Ok(Arc::new(index))
}

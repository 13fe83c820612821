//! Provider router — builds the configured LLM provider.
//!
//! Every named provider in `[providers.*]` is created, the default provider is
//! ensured to exist, and when `fallback_providers` is set the default is
//! wrapped in a [`FallbackProvider`] chain.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use docbot_config::AppConfig;
use docbot_core::provider::Provider;

use crate::fallback::FallbackProvider;
use crate::openai_compat::OpenAiCompatProvider;

/// Named providers plus the default one.
pub struct ProviderRouter {
    providers: HashMap<String, Arc<dyn Provider>>,
    default_provider: String,
}

impl ProviderRouter {
    /// Create a new router with a default provider.
    pub fn new(default_provider: impl Into<String>) -> Self {
        Self {
            providers: HashMap::new(),
            default_provider: default_provider.into(),
        }
    }

    /// Register a provider.
    pub fn register(&mut self, name: impl Into<String>, provider: Arc<dyn Provider>) {
        self.providers.insert(name.into(), provider);
    }

    /// Get the default provider.
    pub fn default(&self) -> Option<Arc<dyn Provider>> {
        self.providers.get(&self.default_provider).cloned()
    }

    /// Get a specific provider by name.
    pub fn get(&self, name: &str) -> Option<Arc<dyn Provider>> {
        self.providers.get(name).cloned()
    }

    /// List all registered provider names.
    pub fn list(&self) -> Vec<&str> {
        self.providers.keys().map(|s| s.as_str()).collect()
    }
}

/// Build providers from configuration.
pub fn build_from_config(config: &AppConfig) -> ProviderRouter {
    let mut router = ProviderRouter::new(&config.default_provider);

    let mut names: Vec<&String> = config.providers.keys().collect();
    names.push(&config.default_provider);
    names.extend(config.fallback_providers.iter());

    for name in names {
        if router.get(name).is_none() {
            router.register(name.clone(), build_provider(config, name));
        }
    }

    if !config.fallback_providers.is_empty() {
        let timeout = Duration::from_secs(config.provider_timeout_secs);
        let mut chain = FallbackProvider::new(format!("{}+fallback", config.default_provider));
        let ordered =
            std::iter::once(&config.default_provider).chain(config.fallback_providers.iter());
        for name in ordered {
            if let Some(provider) = router.get(name) {
                chain = chain.add(provider, timeout);
            }
        }
        router.register(config.default_provider.clone(), Arc::new(chain));
    }

    router
}

fn build_provider(config: &AppConfig, name: &str) -> Arc<dyn Provider> {
    let provider_config = config.providers.get(name);

    let api_key = provider_config
        .and_then(|p| p.api_key.clone())
        .or_else(|| config.api_key.clone())
        .unwrap_or_default();

    let base_url = provider_config
        .and_then(|p| p.api_url.clone())
        .unwrap_or_else(|| default_base_url(name));

    Arc::new(OpenAiCompatProvider::new(name, base_url, api_key))
}

/// Get the default base URL for well-known providers.
fn default_base_url(provider_name: &str) -> String {
    match provider_name {
        "openai" => "https://api.openai.com/v1".into(),
        "mistral" => "https://api.mistral.ai/v1".into(),
        "ollama" => "http://localhost:11434/v1".into(),
        "openrouter" => "https://openrouter.ai/api/v1".into(),
        "groq" => "https://api.groq.com/openai/v1".into(),
        "vllm" => "http://localhost:8000/v1".into(),
        "llamacpp" | "llama.cpp" => "http://localhost:8080/v1".into(),
        _ => format!("https://{provider_name}.api.example.com/v1"),
    }
}

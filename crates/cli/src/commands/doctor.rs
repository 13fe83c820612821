//! `docbot doctor` — Diagnose configuration.

use std::path::Path;

use docbot_config::AppConfig;

pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    println!("🩺 DocBot Doctor — Diagnostics");
    println!("==============================\n");

    let mut issues = 0;

    let config_path = AppConfig::config_dir().join("config.toml");
    if !config_path.exists() {
        println!("  ⚠️  No config file — defaults in use (run `docbot onboard`)");
        issues += 1;
    }

    let config = match AppConfig::load() {
        Ok(config) => {
            println!("  ✅ Configuration valid");
            config
        }
        Err(e) => {
            println!("  ❌ Configuration invalid: {e}");
            println!("\n  ⚠️  Fix the configuration before running other checks.");
            return Ok(());
        }
    };

    println!("  ✅ Provider: {} ({})", config.default_provider, config.default_model);

    if config.has_api_key() {
        println!("  ✅ API key configured");
    } else if config.default_provider == "ollama" {
        println!("  ✅ No API key needed for a local ollama");
    } else {
        println!("  ⚠️  No API key configured — set DOCBOT_API_KEY or add api_key to config.toml");
        issues += 1;
    }

    match &config.knowledge.docs_dir {
        Some(dir) if Path::new(dir).is_dir() => println!("  ✅ Docs directory: {dir}"),
        Some(dir) => {
            println!("  ❌ Docs directory not found: {dir}");
            issues += 1;
        }
        None => {
            println!("  ⚠️  No knowledge.docs_dir — answers will not use documentation");
            issues += 1;
        }
    }

    println!();
    if issues == 0 {
        println!("  🎉 All checks passed!");
    } else {
        println!("  ⚠️  {issues} issue(s) found. See above for details.");
    }

    Ok(())
}

//! List policy presets command.

use anyhow::{Context, Result};
use signal_engine::PolicyRegistry;

pub async fn run() -> Result<()> {
    let registry = PolicyRegistry::new();

    println!("Available Policies");
    println!("═══════════════════════════════════════════════════════════");
    println!();

    for info in registry.list() {
        let config = toml::to_string_pretty(&info.config)
            .with_context(|| format!("Failed to render preset {}", info.name))?;

        println!("  {} ", info.name);
        println!("  ───────────────────────────────────────────────────────");
        println!("  {}", info.description);
        println!("  Needs at least {} candles", info.config.min_candles());
        println!();
        for line in config.lines() {
            println!("    {}", line);
        }
        println!();
    }

    println!("Set scanner.preset, or an override's preset, to select one.");
    println!();
    println!("Policy names: {}", registry.names().join(", "));

    Ok(())
}

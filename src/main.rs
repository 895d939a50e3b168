// Only compile UI module when TUI feature is enabled
#[cfg(feature = "tui")]
mod ui;

use anyhow::{Context, Result};
use std::env;
use std::path::Path;

use fusion_catalog::{fetch_catalog, load_from_payload, LoadedCatalog, DEFAULT_API_URL};

fn main() -> Result<()> {
    let args: Vec<String> = env::args().collect();

    if args.len() > 1 && args[1] == "fetch" {
        // Fetch mode: load and print the report
        run_fetch(args.get(2).map(String::as_str))?;
    } else {
        // UI mode (default)
        run_ui_mode(args.get(1).map(String::as_str))?;
    }

    Ok(())
}

/// Load the catalog from a URL, or from a local JSON file when the source
/// names an existing path (offline use, test fixtures).
fn load_catalog(source: Option<&str>) -> Result<LoadedCatalog> {
    let source = source.unwrap_or(DEFAULT_API_URL);

    if Path::new(source).exists() {
        let body = std::fs::read_to_string(source)
            .with_context(|| format!("Failed to read file: {}", source))?;
        let payload = serde_json::from_str(&body)
            .with_context(|| format!("File is not valid JSON: {}", source))?;
        return load_from_payload(&payload)
            .with_context(|| format!("Failed to load catalog from {}", source));
    }

    fetch_catalog(source).with_context(|| format!("Failed to load catalog from {}", source))
}

fn run_fetch(source: Option<&str>) -> Result<()> {
    println!("☀️  Fusion Companies Catalog - Fetch");
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");

    println!("\n🌐 Loading catalog...");
    let loaded = load_catalog(source)?;
    println!("✓ {}", loaded.report.summary());

    for issue in &loaded.report.issues {
        eprintln!("  ⚠ [{}] {}: {}", issue.record, issue.field, issue.message);
    }

    let view = loaded.catalog.view();
    let summary = fusion_catalog::summarize(&view);

    println!("\n📊 Catalog summary");
    println!("✓ Companies:      {}", summary.count);
    println!(
        "✓ Total funding:  {}",
        fusion_catalog::format_usd_billions(summary.total_funding_usd)
    );
    println!("✓ Avg employees:  {:.0}", summary.mean_employees);
    println!("✓ Avg output:     {:.0} MWe", summary.mean_output_mwe);

    println!("\n🔋 Fuel sources");
    for entry in fusion_catalog::distribution(&view, fusion_catalog::CategoricalField::FuelSource)
    {
        println!("✓ {:<12} {}", entry.value, entry.count);
    }

    Ok(())
}

#[cfg(feature = "tui")]
fn run_ui_mode(source: Option<&str>) -> Result<()> {
    println!("☀️  Loading fusion companies data...\n");

    let loaded = load_catalog(source)?;
    println!("✓ {}", loaded.report.summary());
    println!("Starting UI... (Press 'q' to quit)\n");

    let mut app = ui::App::new(loaded.catalog, loaded.report);
    ui::run_ui(&mut app)?;

    println!("\n✅ UI closed");

    Ok(())
}

#[cfg(not(feature = "tui"))]
fn run_ui_mode(_source: Option<&str>) -> Result<()> {
    eprintln!("❌ TUI mode not available!");
    eprintln!("   Rebuild with: cargo build --features tui");
    eprintln!("   Or use the API server: cargo run --bin fusion-catalog-server --features server");
    std::process::exit(1);
}

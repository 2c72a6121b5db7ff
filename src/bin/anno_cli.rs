//! Command-line front end for the annotation engine.
//!
//! Loads an annotation collection from a JSON file and runs one operation
//! on it: summary statistics, fuzzy search, validation, or export to
//! another format. All file I/O lives here; the engine itself never
//! touches the filesystem.

use std::fs;
use std::path::{Path, PathBuf};

use anno::config::EngineConfig;
use anno::engine::Engine;

fn usage() -> String {
    [
        "Usage: anno-cli <command> [args]",
        "",
        "Commands:",
        "  stats  <file.json>                 Print collection statistics",
        "  search <file.json> <query>         Fuzzy-search annotation texts",
        "  check  <file.json>                 Validate every annotation",
        "  export <file.json> <format> [out]  Convert to json, csv, or training",
    ]
    .join("\n")
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    let config = EngineConfig::load_from_default_path().unwrap_or_default();
    env_logger::Builder::from_default_env()
        .filter_level(config.preferences.log_level.to_level_filter())
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    if let Err(message) = run(&config, &args) {
        eprintln!("{}", message);
        std::process::exit(1);
    }
}

// This binary is native-only - on WASM we just provide a dummy main
#[cfg(target_arch = "wasm32")]
fn main() {}

fn run(config: &EngineConfig, args: &[String]) -> Result<(), String> {
    match args {
        [command, file] if command == "stats" => stats(config, file),
        [command, file, query] if command == "search" => search(config, file, query),
        [command, file] if command == "check" => check(config, file),
        [command, file, format] if command == "export" => export(config, file, format, None),
        [command, file, format, out] if command == "export" => {
            export(config, file, format, Some(out))
        }
        _ => Err(usage()),
    }
}

/// Resolve an input path, falling back to the configured import folder
/// when the path does not exist as given.
fn resolve_input(config: &EngineConfig, path: &str) -> PathBuf {
    let direct = PathBuf::from(path);
    let folder = &config.preferences.import_folder;
    if direct.exists() || folder.is_empty() {
        return direct;
    }
    Path::new(folder).join(path)
}

/// Load a collection file into a fresh engine.
///
/// Invalid elements are skipped with a warning, matching the engine's
/// partial-acceptance import.
fn load_engine(config: &EngineConfig, path: &str) -> Result<Engine, String> {
    let path = resolve_input(config, path);
    let payload = fs::read_to_string(&path)
        .map_err(|e| format!("Cannot read {}: {}", path.display(), e))?;
    let mut engine = Engine::with_config(config);
    let report = engine
        .import_json(&payload)
        .map_err(|e| format!("Cannot load {}: {}", path.display(), e))?;
    if report.skipped > 0 {
        eprintln!("Warning: {}", report.summary());
    }
    Ok(engine)
}

fn stats(config: &EngineConfig, file: &str) -> Result<(), String> {
    let engine = load_engine(config, file)?;
    let stats = engine.stats();
    println!("Total annotations: {}", stats.total);
    println!("With text:         {}", stats.with_text);
    println!("Average length:    {:.1} chars", stats.avg_text_length);
    println!("Created today:     {}", stats.created_today);
    Ok(())
}

fn search(config: &EngineConfig, file: &str, query: &str) -> Result<(), String> {
    let engine = load_engine(config, file)?;
    let hits = engine.search_hits(query);
    if hits.is_empty() {
        println!("No matches for \"{}\"", query);
        return Ok(());
    }
    let annotations = engine.annotations();
    for hit in &hits {
        let annotation = &annotations[hit.index];
        println!("{:.3}  {}  {}", hit.score, annotation.id, annotation.text);
    }
    println!("{} matches", hits.len());
    Ok(())
}

fn check(config: &EngineConfig, file: &str) -> Result<(), String> {
    let path = resolve_input(config, file);
    let payload = fs::read_to_string(&path)
        .map_err(|e| format!("Cannot read {}: {}", path.display(), e))?;
    let mut engine = Engine::with_config(config);
    let report = engine
        .import_json(&payload)
        .map_err(|e| format!("Cannot load {}: {}", path.display(), e))?;
    println!("{} valid", report.loaded);
    if report.skipped == 0 {
        return Ok(());
    }
    for (index, errors) in &report.rejected {
        for error in errors {
            println!("  [{}] {}", index, error);
        }
    }
    Err(report.summary())
}

fn export(
    config: &EngineConfig,
    file: &str,
    format: &str,
    out: Option<&String>,
) -> Result<(), String> {
    let mut engine = load_engine(config, file)?;
    let payload = engine.export(format).map_err(|e| {
        format!(
            "{} (available formats: {})",
            e,
            engine.format_ids().join(", ")
        )
    })?;
    let out_path = match out {
        Some(path) => PathBuf::from(path),
        None => {
            let name = engine
                .export_filename(format)
                .unwrap_or_else(|| format!("annotations.{}", format));
            Path::new(&config.preferences.export_folder).join(name)
        }
    };
    fs::write(&out_path, payload)
        .map_err(|e| format!("Cannot write {}: {}", out_path.display(), e))?;
    println!(
        "Exported {} annotations to {}",
        engine.len(),
        out_path.display()
    );
    Ok(())
}

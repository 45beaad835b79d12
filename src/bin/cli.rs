use std::path::PathBuf;
use std::process;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};

use kaizen::config::Config;
use kaizen::error::KaizenError;
use kaizen::output::{self, OutputFormat};
use kaizen::store::memory::MemoryStore;
use kaizen::{RuleRegistry, ScanEngine, ScanMode};

#[derive(Parser)]
#[command(
    name = "kaizen",
    about = "Data-quality lint engine for knowledge graphs and item banks",
    version,
    author
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a lint scan over an item bank export
    Scan {
        /// Path to the item bank (JSON collections export)
        items: PathBuf,

        /// Institution (tenant) to scan
        #[arg(long, short = 'i')]
        institution: String,

        /// Scan mode (full, delta)
        #[arg(long, short = 'm', default_value = "full")]
        mode: String,

        /// Lower bound for delta scans (RFC 3339 timestamp)
        #[arg(long)]
        since: Option<String>,

        /// Config file path
        #[arg(long, short = 'c')]
        config: Option<PathBuf>,

        /// Output format (console, json)
        #[arg(long, short = 'f', default_value = "console")]
        format: String,

        /// Write output to file instead of stdout
        #[arg(long, short = 'o')]
        output: Option<PathBuf>,
    },

    /// List all known rules with their effective configuration
    ListRules {
        /// Config file path
        #[arg(long, short = 'c')]
        config: Option<PathBuf>,

        /// Output format (table, json)
        #[arg(long, short = 'f', default_value = "table")]
        format: String,
    },

    /// Generate a starter .kaizen.toml config file
    Init {
        /// Overwrite existing config file
        #[arg(long)]
        force: bool,
    },
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Scan {
            items,
            institution,
            mode,
            since,
            config,
            format,
            output,
        } => cmd_scan(items, institution, mode, since, config, format, output),
        Commands::ListRules { config, format } => cmd_list_rules(config, format),
        Commands::Init { force } => cmd_init(force),
    };

    match result {
        Ok(exit_code) => process::exit(exit_code),
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(e.exit_code());
        }
    }
}

fn cmd_scan(
    items: PathBuf,
    institution: String,
    mode_str: String,
    since_str: Option<String>,
    config: Option<PathBuf>,
    format_str: String,
    output_path: Option<PathBuf>,
) -> Result<i32, KaizenError> {
    let format = OutputFormat::from_str_lenient(&format_str).unwrap_or_else(|| {
        eprintln!("Warning: unknown format '{}', using console", format_str);
        OutputFormat::Console
    });

    let mode = ScanMode::from_str_lenient(&mode_str)
        .ok_or_else(|| KaizenError::Config(format!("invalid mode '{mode_str}', expected full or delta")))?;

    if mode == ScanMode::Delta && since_str.is_none() {
        return Err(KaizenError::Config(
            "delta mode requires a --since timestamp".into(),
        ));
    }

    let since: Option<DateTime<Utc>> = match since_str {
        Some(s) => Some(
            s.parse()
                .map_err(|e| KaizenError::Config(format!("invalid --since timestamp: {e}")))?,
        ),
        None => None,
    };

    let config_path = config.unwrap_or_else(|| PathBuf::from(".kaizen.toml"));
    let config = Config::load(&config_path)?;

    let store = MemoryStore::from_json_file(&items)?;

    let engine = ScanEngine::new(Arc::new(RuleRegistry::with_builtin_rules()));
    let report = engine.run_scan(Arc::new(store), &config, &institution, mode, since)?;

    let rendered = output::render(&report, format)?;
    match output_path {
        Some(out) => std::fs::write(&out, &rendered)?,
        None => print!("{}", rendered),
    }

    // Exit code: 0 = clean or advisory findings, 1 = critical findings
    Ok(if report.critical_count > 0 { 1 } else { 0 })
}

fn cmd_list_rules(config: Option<PathBuf>, format_str: String) -> Result<i32, KaizenError> {
    let config_path = config.unwrap_or_else(|| PathBuf::from(".kaizen.toml"));
    let config = Config::load(&config_path)?;

    let registry = RuleRegistry::with_builtin_rules();
    let catalog = registry.catalog(&config.rules);

    match format_str.as_str() {
        "json" => {
            let json = serde_json::to_string_pretty(&catalog)?;
            println!("{}", json);
        }
        _ => {
            println!(
                "{:<22} {:<22} {:<10} {:<8} THRESHOLD",
                "ID", "NAME", "SEVERITY", "ENABLED"
            );
            println!("{}", "-".repeat(78));
            for entry in &catalog {
                let severity = entry
                    .severity_override
                    .unwrap_or(entry.default_severity)
                    .to_string();
                println!(
                    "{:<22} {:<22} {:<10} {:<8} {}",
                    entry.rule_id,
                    entry.name,
                    severity,
                    if entry.enabled { "yes" } else { "no" },
                    entry
                        .threshold
                        .map(|t| t.to_string())
                        .unwrap_or_else(|| "-".into()),
                );
            }
        }
    }

    Ok(0)
}

fn cmd_init(force: bool) -> Result<i32, KaizenError> {
    let path = PathBuf::from(".kaizen.toml");

    if path.exists() && !force {
        eprintln!(".kaizen.toml already exists. Use --force to overwrite.");
        return Ok(1);
    }

    std::fs::write(&path, Config::starter_toml())?;
    println!("Created .kaizen.toml");

    Ok(0)
}

//! HLSL header generator CLI

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use shader_type_gen::Config;
use shader_type_gen::config::CONFIG_FILE;

#[derive(Parser)]
#[command(name = "shader-type-gen")]
#[command(about = "Generate HLSL headers from annotated Rust structs", long_about = None)]
#[command(version)]
struct Cli {
    /// Path to the configuration file
    #[arg(short, long, global = true, default_value = CONFIG_FILE)]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate headers for all #[generate_hlsl] structs
    Generate {
        #[command(flatten)]
        sources: SourceArgs,
    },

    /// Check that headers are in sync with the sources
    Check {
        #[command(flatten)]
        sources: SourceArgs,
    },

    /// Generate from a JSON array of structure descriptions
    Json {
        /// Input JSON file
        input: PathBuf,

        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

/// Overrides for the configured sources
#[derive(Args)]
struct SourceArgs {
    /// Source directory or file to scan (repeatable, replaces config sources)
    #[arg(short, long)]
    source: Vec<PathBuf>,

    /// Output file extension (default: from config)
    #[arg(short, long)]
    extension: Option<String>,
}

impl SourceArgs {
    fn apply(self, config: &mut Config) {
        if !self.source.is_empty() {
            config.sources = self.source;
        }
        if let Some(extension) = self.extension {
            config.extension = extension;
        }
    }
}

fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let cli = Cli::parse();
    let mut config = Config::load(&cli.config)?;

    match cli.command {
        Commands::Generate { sources } => {
            sources.apply(&mut config);
            println!("Generating HLSL headers...");
            let report = shader_type_gen::generate(&config)?;
            if !report.failures.is_empty() {
                anyhow::bail!(
                    "{} struct(s) failed to generate; {} header(s) written",
                    report.failures.len(),
                    report.written.len()
                );
            }
            println!("✓ Done! {} header(s) written", report.written.len());
        }
        Commands::Check { sources } => {
            sources.apply(&mut config);
            println!("Checking HLSL headers are in sync...");
            if !shader_type_gen::check(&config)? {
                anyhow::bail!("Headers are out of sync. Run 'shader-type-gen generate' to regenerate.");
            }
            println!("\n✓ All headers are in sync!");
        }
        Commands::Json { input, output } => {
            let result = shader_type_gen::generate_from_json(&input)?;
            for failure in &result.failures {
                for message in failure.messages() {
                    tracing::error!("{}", message);
                }
            }

            match output {
                Some(path) => {
                    std::fs::write(&path, &result.text)
                        .with_context(|| format!("Failed to write {}", path.display()))?;
                    tracing::info!(
                        "Generated {} ({} structs)",
                        path.display(),
                        result.generated
                    );
                }
                None => print!("{}", result.text),
            }

            if !result.failures.is_empty() {
                anyhow::bail!("{} struct(s) failed to generate", result.failures.len());
            }
        }
    }

    Ok(())
}

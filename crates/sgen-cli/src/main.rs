use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use clap_complete::Shell;
use log::debug;

use sgen_core::config::{self, CONFIG_FILE_NAME, SgenConfig};
use sgen_core::ir::SchemaKind;
use sgen_core::parse::{self, spec::OpenApiSpec};
use sgen_core::{CodeGenerator, GeneratedFile};
use sgen_es::IndexTemplateGenerator;
use sgen_go::GoTypesGenerator;

#[derive(Parser)]
#[command(
    name = "sgen",
    about = "Go types and search index templates from OpenAPI 3.x schemas",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate the configured artifacts from an OpenAPI document
    Generate {
        /// Path to the OpenAPI document (YAML or JSON)
        #[arg(short, long)]
        input: Option<PathBuf>,
    },

    /// Check that a document parses and resolves
    Validate {
        /// Path to the OpenAPI document
        #[arg(short, long)]
        input: PathBuf,
    },

    /// Print the resolved types and index templates of a document
    Inspect {
        /// Path to the OpenAPI document
        #[arg(short, long)]
        input: PathBuf,

        /// Output format
        #[arg(long, default_value = "yaml")]
        format: InspectFormat,
    },

    /// Initialize a new sgen configuration
    Init {
        /// Overwrite an existing config file
        #[arg(long)]
        force: bool,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        shell: Shell,
    },
}

#[derive(Clone, ValueEnum)]
enum InspectFormat {
    Yaml,
    Json,
}

fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Generate { input } => cmd_generate(input),

        Commands::Validate { input } => cmd_validate(input),

        Commands::Inspect { input, format } => cmd_inspect(input, format),

        Commands::Init { force } => cmd_init(force),

        Commands::Completions { shell } => {
            let mut cmd = <Cli as clap::CommandFactory>::command();
            clap_complete::generate(shell, &mut cmd, "sgen", &mut std::io::stdout());
            Ok(())
        }
    }
}

/// Try to load the project config file from the current directory.
fn try_load_config() -> Result<Option<SgenConfig>> {
    let config_path = PathBuf::from(CONFIG_FILE_NAME);
    config::load_config(&config_path).map_err(|e| anyhow::anyhow!(e))
}

fn load_spec(path: &Path) -> Result<OpenApiSpec> {
    let content =
        fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))?;

    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("yaml");

    let parsed = match ext {
        "json" => parse::from_json(&content)?,
        _ => parse::from_yaml(&content)?,
    };
    debug!(
        "parsed {} ({} paths, {} schemas)",
        path.display(),
        parsed.paths.len(),
        parsed.sorted_schemas().len()
    );
    Ok(parsed)
}

/// Write generated files, creating parent directories as needed.
fn write_files(files: &[GeneratedFile]) -> Result<()> {
    for file in files {
        let path = Path::new(&file.path);
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .with_context(|| format!("failed to create directory {}", parent.display()))?;
        }
        fs::write(path, &file.content)
            .with_context(|| format!("failed to write {}", path.display()))?;
        eprintln!("  wrote {}", path.display());
    }
    Ok(())
}

/// Try to run gofmt on generated Go sources.
fn try_run_gofmt(files: &[GeneratedFile]) {
    for file in files.iter().filter(|f| f.path.ends_with(".go")) {
        match Command::new("gofmt").args(["-w", &file.path]).output() {
            Ok(result) if result.status.success() => {
                eprintln!("  formatted {} with gofmt", file.path);
            }
            Ok(_) => {
                eprintln!(
                    "  warning: gofmt had issues with {} (non-zero exit)",
                    file.path
                );
            }
            Err(_) => {
                eprintln!("  note: gofmt not found, run `gofmt -w {}` to format", file.path);
                return;
            }
        }
    }
}

fn cmd_generate(input: Option<PathBuf>) -> Result<()> {
    let cfg = try_load_config()?.unwrap_or_default();
    let input = input.unwrap_or_else(|| PathBuf::from(&cfg.input));
    let spec = load_spec(&input)?;

    if !cfg.go.enabled && !cfg.es.enabled {
        eprintln!("No generators enabled. Enable `go` or `es` in {CONFIG_FILE_NAME}.");
        return Ok(());
    }

    if cfg.go.enabled {
        eprintln!("Generating Go types → {}", cfg.go.output);
        let files = GoTypesGenerator
            .generate(&spec, &cfg.go)
            .map_err(|e| anyhow::anyhow!(e))?;
        write_files(&files)?;
        try_run_gofmt(&files);
    }

    if cfg.es.enabled {
        eprintln!("Generating index templates → {}", cfg.es.output);
        let files = IndexTemplateGenerator
            .generate(&spec, &cfg.es)
            .map_err(|e| anyhow::anyhow!(e))?;
        write_files(&files)?;
    }

    eprintln!("\nGenerated files should not be edited manually; changes will be overwritten.");
    Ok(())
}

fn cmd_validate(input: PathBuf) -> Result<()> {
    let spec = load_spec(&input)?;

    eprintln!("Valid OpenAPI {} document: {}", spec.openapi, spec.info.title);
    eprintln!("  Version: {}", spec.info.version);
    eprintln!("  Paths: {}", spec.paths.len());
    eprintln!("  Schemas: {}", spec.sorted_schemas().len());

    // Resolve both artifacts so every reference and format is checked.
    let types = GoTypesGenerator::collect_types(&spec, true)?;
    eprintln!("  Types: {}", types.len());
    let templates = IndexTemplateGenerator::collect_templates(&spec, None)?;
    eprintln!("  Index templates: {}", templates.len());

    eprintln!("Validation successful.");
    Ok(())
}

fn cmd_inspect(input: PathBuf, format: InspectFormat) -> Result<()> {
    let cfg = try_load_config()?.unwrap_or_default();
    let spec = load_spec(&input)?;

    let summary = build_inspect_summary(&spec, &cfg)?;

    match format {
        InspectFormat::Yaml => {
            let yaml = serde_yaml_ng::to_string(&summary)?;
            print!("{}", yaml);
        }
        InspectFormat::Json => {
            let json = serde_json::to_string_pretty(&summary)?;
            println!("{}", json);
        }
    }

    Ok(())
}

fn kind_name(kind: SchemaKind) -> &'static str {
    match kind {
        SchemaKind::Any => "any",
        SchemaKind::OpenMap => "open_map",
        SchemaKind::Scalar => "scalar",
        SchemaKind::Array => "array",
        SchemaKind::Structured => "struct",
        SchemaKind::Reference => "reference",
    }
}

fn build_inspect_summary(spec: &OpenApiSpec, cfg: &SgenConfig) -> Result<serde_json::Value> {
    let types: Vec<serde_json::Value> = GoTypesGenerator::collect_types(spec, cfg.go.operation_types)?
        .iter()
        .map(|t| {
            serde_json::json!({
                "name": t.name,
                "json_name": t.json_name,
                "kind": kind_name(t.schema.kind),
                "fields": t.schema.properties.len(),
                "open": t.schema.has_additional_properties(),
            })
        })
        .collect();

    let templates: Vec<serde_json::Value> =
        IndexTemplateGenerator::collect_templates(spec, cfg.es.marker_tag.as_deref())?
            .into_iter()
            .map(|(name, mappings)| {
                serde_json::json!({
                    "name": name,
                    "mappings": mappings,
                })
            })
            .collect();

    Ok(serde_json::json!({
        "info": {
            "title": spec.info.title,
            "version": spec.info.version,
        },
        "types": types,
        "index_templates": templates,
    }))
}

fn cmd_init(force: bool) -> Result<()> {
    let config_path = PathBuf::from(CONFIG_FILE_NAME);

    if config_path.exists() && !force {
        anyhow::bail!(
            "{} already exists. Use --force to overwrite.",
            config_path.display()
        );
    }

    fs::write(&config_path, config::default_config_content())
        .with_context(|| format!("failed to write {}", config_path.display()))?;
    eprintln!("Created {}", config_path.display());
    Ok(())
}

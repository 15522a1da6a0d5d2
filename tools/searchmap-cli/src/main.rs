//! Command-line front end for searchmap
//!
//! Usage:
//!   searchmap compile defs.json User            # Print the mapping of one schema
//!   searchmap compile defs.json User --pretty   # Same, indented
//!   searchmap validate defs.json                # Check every schema in a file
//!   searchmap explain defs.json User            # Show how each property's type was chosen
//!
//! Log verbosity follows `RUST_LOG` (default `warn`); logs go to stderr.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use searchmap::mapping::inference::resolve;
use searchmap::schema::ValidatorConfig;
use searchmap::{MapperConfig, MappingBuilder, SchemaParser, SchemaRegistry, SchemaValidator};

#[derive(Parser)]
#[command(name = "searchmap")]
#[command(about = "Compile entity schema definitions into search index mappings")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print the mapping document of one schema
    Compile {
        #[command(flatten)]
        target: Target,

        /// Skip schema graph validation
        #[arg(long)]
        no_validate: bool,

        /// Do not map root id properties to keyword
        #[arg(long)]
        no_id_keyword: bool,

        /// Indent the output
        #[arg(long)]
        pretty: bool,

        #[command(flatten)]
        limits: Limits,
    },
    /// Validate every schema of a definitions file
    Validate {
        /// Schema definitions file (JSON)
        definitions: PathBuf,

        #[command(flatten)]
        limits: Limits,
    },
    /// List each property of a schema with its resolved field type
    Explain {
        #[command(flatten)]
        target: Target,
    },
}

#[derive(Args)]
struct Target {
    /// Schema definitions file (JSON)
    definitions: PathBuf,

    /// Name of the schema to use
    schema: String,
}

#[derive(Args)]
struct Limits {
    /// Maximum object nesting depth
    #[arg(long, default_value_t = ValidatorConfig::default().max_nesting_depth)]
    max_depth: usize,
}

impl Limits {
    fn validator_config(&self) -> ValidatorConfig {
        ValidatorConfig {
            max_nesting_depth: self.max_depth,
            ..Default::default()
        }
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::Compile {
            target,
            no_validate,
            no_id_keyword,
            pretty,
            limits,
        } => {
            let registry = load_registry(&target.definitions)?;
            let config = MapperConfig {
                validate: !no_validate,
                id_as_keyword: !no_id_keyword,
                validator: limits.validator_config(),
            };

            let document = MappingBuilder::new(&registry)
                .with_config(config)
                .build_mapping(&target.schema)
                .with_context(|| format!("Failed to compile schema '{}'", target.schema))?;

            let output = if pretty {
                document.to_json_pretty()?
            } else {
                document.to_json_string()?
            };
            println!("{}", output);
        }
        Command::Validate {
            definitions,
            limits,
        } => {
            let registry = load_registry(&definitions)?;
            SchemaValidator::with_config(limits.validator_config())
                .validate(&registry)
                .with_context(|| format!("Invalid definitions in {}", definitions.display()))?;
            println!("{} schema(s) valid", registry.len());
        }
        Command::Explain { target } => {
            let registry = load_registry(&target.definitions)?;
            explain(&registry, &target.schema)?;
        }
    }

    Ok(())
}

fn load_registry(path: &Path) -> Result<SchemaRegistry> {
    let input = fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let registry = SchemaParser::new()
        .parse_str(&input)
        .with_context(|| format!("Failed to parse {}", path.display()))?;

    info!(path = %path.display(), schemas = registry.len(), "Loaded schema definitions");
    Ok(registry)
}

fn explain(registry: &SchemaRegistry, name: &str) -> Result<()> {
    let schema = registry
        .get(name)
        .with_context(|| format!("Unknown schema '{}'", name))?;

    println!("{} (index: {})", schema.name, schema.index_name);
    for property in &schema.properties {
        let resolution = resolve(property);
        let mut notes = Vec::new();
        if property.is_transient() {
            notes.push("transient".to_string());
        }
        if property.is_id() {
            notes.push("id".to_string());
        }
        if let Some(parent) = &property.parent_type {
            notes.push(format!("parent of {}", parent));
        }
        if let Some(nested) = property.shape.schema_ref() {
            notes.push(format!("-> {}", nested));
        }
        if !property.ignore_fields.is_empty() {
            notes.push(format!("ignores [{}]", property.ignore_fields.join(", ")));
        }

        println!(
            "  {:<24} {:<18} {:<10} {}",
            property.emitted_name(),
            resolution.field_type,
            resolution.source,
            notes.join(", ")
        );
    }

    Ok(())
}

//! Command line entry point: compiles stored field groups against a base schema and prints
//! the resulting SDL.

use std::io::IsTerminal;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use anyhow::Result;
use anyhow::anyhow;
use clap::Parser;
use graphql_field_groups::Configuration;
use graphql_field_groups::TypeCompiler;
use graphql_field_groups::TypeRegistry;
use graphql_field_groups::configuration::generate_config_schema;
use graphql_field_groups::host::memory::MemoryConfigProvider;
use tracing_subscriber::EnvFilter;

/// Options for the field group compiler
#[derive(Parser, Debug)]
#[command(name = "field-groups", about = "Compiles field groups into a GraphQL schema")]
struct Opt {
    /// Log level (off|error|warn|info|debug|trace).
    #[arg(long = "log", default_value = "info", env = "FIELD_GROUPS_LOG")]
    log_level: String,

    /// Base schema the field group types are added to.
    #[arg(short, long = "schema", env = "FIELD_GROUPS_SCHEMA_PATH")]
    schema_path: Option<PathBuf>,

    /// Stored field groups and values, as JSON.
    #[arg(short, long = "field-groups", env = "FIELD_GROUPS_PATH")]
    field_groups_path: Option<PathBuf>,

    /// Compiler configuration, as YAML.
    #[arg(short, long = "config", env = "FIELD_GROUPS_CONFIG_PATH")]
    config_path: Option<PathBuf>,

    /// Validates the composed schema before printing it.
    #[arg(long)]
    validate: bool,

    /// Prints the configuration schema and exits.
    #[arg(long)]
    print_config_schema: bool,
}

fn main() -> Result<()> {
    let opt = Opt::parse();

    let env_filter = std::env::var("RUST_LOG").ok().unwrap_or(opt.log_level.clone());
    let builder = tracing_subscriber::fmt::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(EnvFilter::try_new(&env_filter).context("could not parse log")?);
    if std::io::stderr().is_terminal() {
        builder.init();
    } else {
        builder.json().init();
    }

    if opt.print_config_schema {
        let schema = generate_config_schema();
        println!("{}", serde_json::to_string_pretty(&schema)?);
        return Ok(());
    }

    let configuration = match &opt.config_path {
        Some(path) => {
            let raw = std::fs::read_to_string(path)
                .with_context(|| format!("could not read configuration {}", path.display()))?;
            Configuration::from_yaml(&raw)?
        }
        None => Configuration::default(),
    };

    let schema_path = opt
        .schema_path
        .as_ref()
        .ok_or_else(|| anyhow!("a base schema must be set using '--schema'"))?;
    let sdl = std::fs::read_to_string(schema_path)
        .with_context(|| format!("could not read schema {}", schema_path.display()))?;
    let mut registry = TypeRegistry::from_sdl(&sdl)?;

    let provider = match &opt.field_groups_path {
        Some(path) => {
            let raw = std::fs::read_to_string(path)
                .with_context(|| format!("could not read field groups {}", path.display()))?;
            MemoryConfigProvider::from_json(&raw).context("could not parse field groups")?
        }
        None => MemoryConfigProvider::default(),
    };

    let compiler = TypeCompiler::new(configuration, Arc::new(provider));
    let report = compiler.compile_all(&mut registry)?;
    report.warn_skipped();
    if opt.validate {
        registry.validate()?;
    }
    println!("{}", registry.to_sdl());
    Ok(())
}

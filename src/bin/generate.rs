//! Entity Code Generator CLI
//!
//! Resolves Navajo entity documents and writes datamodel, logic and service
//! sources for one target language.

use std::path::PathBuf;

use anyhow::{bail, Context};
use clap::{Args, Parser, Subcommand, ValueEnum};
use entity_schemas::codegen::names::package_from;
use entity_schemas::codegen::{generate, write_output, GenerateOptions, Language};
use entity_schemas::config::{GeneratorConfig, SourceKind};
use entity_schemas::document::{discover_paths, DocumentSource, FilesystemSource, RpcSource};
use entity_schemas::version::check_requirement;
use entity_schemas::EntitySet;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "entity-codegen")]
#[command(about = "Generate client code from Navajo entity definitions")]
#[command(version)]
struct Cli {
    /// Configuration file layered over entities.toml
    #[arg(long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate Java datamodel, logic and Retrofit service classes
    Java(GenerateArgs),
    /// Generate Kotlin datamodel and service classes
    Kotlin(GenerateArgs),
    /// Generate Swift Codable classes and Alamofire services
    Swift(GenerateArgs),
    /// Generate TypeScript interfaces
    Typescript(GenerateArgs),
    /// Print the resolved entity model as JSON
    Inspect {
        #[command(flatten)]
        source: SourceArgs,

        /// Entity paths to resolve (default: every document under the input)
        paths: Vec<String>,
    },
}

#[derive(Args)]
struct GenerateArgs {
    #[command(flatten)]
    source: SourceArgs,

    /// Output directory
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Overwrite hand-editable logic files
    #[arg(short, long)]
    force: bool,

    /// Debug logging and source annotations in generated files
    #[arg(short, long)]
    debug: bool,

    /// Abort unless this tool satisfies the given version (x.y.z)
    #[arg(short, long)]
    requirement: Option<String>,
}

#[derive(Args)]
struct SourceArgs {
    /// Directory containing the entity documents
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// Where entity definitions are read from
    #[arg(long, value_enum)]
    source: Option<SourceArg>,

    #[arg(long)]
    username: Option<String>,

    #[arg(long)]
    password: Option<String>,

    /// Navajo Generic endpoint
    #[arg(long)]
    url: Option<String>,
}

#[derive(Clone, Copy, ValueEnum)]
enum SourceArg {
    Filesystem,
    Rpc,
}

fn main() {
    let cli = Cli::parse();

    let debug = matches!(
        &cli.command,
        Commands::Java(a) | Commands::Kotlin(a) | Commands::Swift(a) | Commands::Typescript(a) if a.debug
    );
    let filter = if debug {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run(cli) {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let mut config = GeneratorConfig::load_from(cli.config.as_deref())
        .context("failed to load configuration")?;

    match cli.command {
        Commands::Java(args) => run_generate(&mut config, args, Language::Java),
        Commands::Kotlin(args) => run_generate(&mut config, args, Language::Kotlin),
        Commands::Swift(args) => run_generate(&mut config, args, Language::Swift),
        Commands::Typescript(args) => run_generate(&mut config, args, Language::TypeScript),
        Commands::Inspect { source, paths } => {
            apply_source_args(&mut config, source);
            let set = resolve(&config, paths)?;
            println!("{}", serde_json::to_string_pretty(&set)?);
            Ok(())
        }
    }
}

fn run_generate(config: &mut GeneratorConfig, args: GenerateArgs, language: Language) -> anyhow::Result<()> {
    if let Some(required) = &args.requirement {
        check_requirement(required)?;
    }

    apply_source_args(config, args.source);
    if let Some(output) = args.output {
        config.output.directory = output;
    }
    config.output.force |= args.force;
    config.output.debug |= args.debug;

    let set = resolve(config, Vec::new())?;

    let options = GenerateOptions {
        base_package: package_from(&config.output.directory, "com"),
        debug: config.output.debug,
    };
    let output = generate(&set, language, &options);
    let summary = write_output(&config.output.directory, &output, config.output.force)?;

    println!(
        "Generated {} files for {} entities in {} ({} existing logic files kept)",
        summary.written,
        set.len(),
        config.output.directory.display(),
        summary.skipped
    );
    Ok(())
}

fn apply_source_args(config: &mut GeneratorConfig, args: SourceArgs) {
    if let Some(input) = args.input {
        config.input.root = input;
    }
    if let Some(source) = args.source {
        config.source.kind = match source {
            SourceArg::Filesystem => SourceKind::Filesystem,
            SourceArg::Rpc => SourceKind::Rpc,
        };
    }
    if let Some(username) = args.username {
        config.source.username = username;
    }
    if let Some(password) = args.password {
        config.source.password = password;
    }
    if let Some(url) = args.url {
        config.source.url = url;
    }
}

/// Resolve `paths`, or every document under the input root when empty
fn resolve(config: &GeneratorConfig, paths: Vec<String>) -> anyhow::Result<EntitySet> {
    let root = &config.input.root;
    if !root.is_dir() {
        bail!("input directory {} does not exist", root.display());
    }

    let requested = if paths.is_empty() {
        discover_paths(root, &config.load_config())?
    } else {
        paths
    };
    tracing::info!(count = requested.len(), "requested entities");

    let mut source: Box<dyn DocumentSource> = match config.source.kind {
        SourceKind::Filesystem => Box::new(FilesystemSource::new(root.clone())),
        SourceKind::Rpc => Box::new(RpcSource::new(
            config.source.url.clone(),
            config.source.username.clone(),
            config.source.password.clone(),
            config.source.application.clone(),
        )),
    };

    let set = entity_schemas::resolve(&requested, source.as_mut())
        .with_context(|| format!("failed to resolve entities under {}", root.display()))?;
    Ok(set)
}

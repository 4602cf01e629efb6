//! Forgepoint CLI
//!
//! Command dispatch only; everything observable lives in the library.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use log::{LevelFilter, error, info};

use forgepoint::config::{CONFIG_FILE_NAME, Config, DEFAULT_CONFIG_TEXT, OutputFormat};
use forgepoint::corpus::lint_corpus;
use forgepoint::format::render;
use forgepoint::scan::{self, ExcludeSet};
use forgepoint::schema::SchemaRegistry;
use forgepoint::template;

#[derive(Parser)]
#[command(name = "forgepoint", version, about = "Linter for Forgepoint document corpora")]
struct Cli {
    /// Configuration file (default: ./.forgepoint.toml when present).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Raise log verbosity.
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Lint a document corpus.
    Lint {
        /// Files or directories to lint.
        #[arg(default_value = ".")]
        paths: Vec<PathBuf>,

        /// Output format.
        #[arg(long, value_enum)]
        format: Option<OutputFormat>,

        /// Exit non-zero when warnings are present.
        #[arg(long)]
        fail_on_warnings: bool,

        /// Disable duplicate id detection.
        #[arg(long)]
        no_check_ids: bool,

        /// Disable reference extraction and resolution.
        #[arg(long)]
        no_check_refs: bool,

        /// Extra schema file or directory, replacing the built-in catalogue.
        #[arg(long)]
        schema_path: Option<PathBuf>,

        /// Extra exclusion patterns, added to the configured set.
        #[arg(long)]
        exclude: Vec<String>,
    },

    /// Lint a single file with verbose text output.
    Check {
        file: PathBuf,

        /// Exit non-zero when warnings are present.
        #[arg(long)]
        fail_on_warnings: bool,
    },

    /// Scaffold a new document from its type schema.
    Create {
        /// Document type name, e.g. `story` or `adr`.
        doc_type: String,

        /// Document id (lowercase alphanumerics and hyphens).
        id: String,

        #[arg(long)]
        title: Option<String>,

        #[arg(long)]
        author: Option<String>,

        /// Target file (default: `<id>.adoc`).
        #[arg(long)]
        output: Option<PathBuf>,
    },

    /// List the known document types by lifecycle category.
    ListTypes,

    /// Write a default `.forgepoint.toml` to the working directory.
    Init,

    /// Show the resolved configuration.
    Config,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    env_logger::Builder::from_default_env()
        .filter_level(if cli.verbose {
            LevelFilter::Debug
        } else {
            LevelFilter::Warn
        })
        .init();

    match run(cli) {
        Ok(code) => code,
        Err(err) => {
            error!("{err:#}");
            ExitCode::from(2)
        }
    }
}

fn run(cli: Cli) -> Result<ExitCode> {
    let config = Config::load(cli.config.as_deref())?;

    match cli.command {
        Command::Lint {
            paths,
            format,
            fail_on_warnings,
            no_check_ids,
            no_check_refs,
            schema_path,
            exclude,
        } => {
            let mut config = config;
            if no_check_ids {
                config.rules.check_id_uniqueness = false;
            }
            if no_check_refs {
                config.rules.validate_references = false;
            }
            if let Some(path) = schema_path {
                config.schema_path = Some(path);
            }
            config.exclude.extend(exclude);
            let format = format.unwrap_or(config.output.format);
            let verbose = cli.verbose || config.output.verbose;

            let report = lint_paths(&paths, &config)?;
            print!("{}", render(&report, format, verbose)?);
            Ok(exit_for(report.is_clean(fail_on_warnings)))
        }

        Command::Check {
            file,
            fail_on_warnings,
        } => {
            if !file.is_file() {
                bail!("{} is not a file", file.display());
            }
            let report = lint_paths(std::slice::from_ref(&file), &config)?;
            print!("{}", render(&report, OutputFormat::Text, true)?);
            Ok(exit_for(report.is_clean(fail_on_warnings)))
        }

        Command::Create {
            doc_type,
            id,
            title,
            author,
            output,
        } => {
            let schemas = load_schemas(&config)?;
            let Some(schema) = schemas.schema_for(&doc_type) else {
                let known: Vec<&str> = schemas.types().map(|s| s.name.as_str()).collect();
                bail!("unknown document type '{doc_type}'; known types: {}", known.join(", "));
            };
            if !forgepoint::registry::is_valid_id(&id) {
                bail!("id '{id}' must be lowercase alphanumerics and hyphens");
            }
            let target = output.unwrap_or_else(|| PathBuf::from(format!("{id}.adoc")));
            if target.exists() {
                bail!("{} already exists", target.display());
            }
            let text = template::scaffold(schema, &id, title.as_deref(), author.as_deref());
            std::fs::write(&target, text)
                .with_context(|| format!("writing {}", target.display()))?;
            println!("created {}", target.display());
            Ok(ExitCode::SUCCESS)
        }

        Command::ListTypes => {
            let schemas = load_schemas(&config)?;
            for category in forgepoint::schema::Category::ALL {
                println!("{}:", category.as_str());
                for schema in schemas.types().filter(|s| s.category == category) {
                    match &schema.description {
                        Some(desc) => println!("  {:<22} {} - {desc}", schema.name, schema.display),
                        None => println!("  {:<22} {}", schema.name, schema.display),
                    }
                }
            }
            Ok(ExitCode::SUCCESS)
        }

        Command::Init => {
            let target = Path::new(CONFIG_FILE_NAME);
            if target.exists() {
                bail!("{CONFIG_FILE_NAME} already exists");
            }
            std::fs::write(target, DEFAULT_CONFIG_TEXT)
                .with_context(|| format!("writing {CONFIG_FILE_NAME}"))?;
            println!("created {CONFIG_FILE_NAME}");
            Ok(ExitCode::SUCCESS)
        }

        Command::Config => {
            print!("{}", config.to_toml());
            Ok(ExitCode::SUCCESS)
        }
    }
}

fn load_schemas(config: &Config) -> Result<SchemaRegistry> {
    match &config.schema_path {
        Some(path) => SchemaRegistry::from_path(path),
        None => Ok(SchemaRegistry::embedded()),
    }
}

fn lint_paths(paths: &[PathBuf], config: &Config) -> Result<forgepoint::RunReport> {
    let schemas = load_schemas(config)?;
    let excludes = ExcludeSet::compile(&config.exclude)?;
    let discovered = scan::discover(paths, &excludes)?;
    info!("linting {} files", discovered.len());
    let files = scan::read_sources(&discovered)?;
    Ok(lint_corpus(&files, &schemas, &config.rules))
}

fn exit_for(clean: bool) -> ExitCode {
    if clean {
        ExitCode::SUCCESS
    } else {
        ExitCode::from(1)
    }
}

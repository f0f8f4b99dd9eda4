use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use clap_complete::Shell;
use log::LevelFilter;

use apisplit_core::config::{self, ApisplitConfig, CONFIG_FILE_NAME};
use apisplit_core::fsutil::{self, RetryPolicy};
use apisplit_core::model::Document;
use apisplit_core::registry::COMPONENT_FAMILIES;
use apisplit_core::{
    BundleOptions, Bundler, Format, PathEntry, ReadResult, Report, SpecVersion, SplitOptions,
    Splitter, Status, codec, locate_root,
};

#[derive(Parser)]
#[command(
    name = "apisplit",
    about = "Split OpenAPI documents into files and bundle them back",
    version
)]
struct Cli {
    /// Increase log output (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Split a document into a root file plus one file per path and component
    Split {
        /// Document to split (defaults to `input` from the config)
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// Output directory (defaults to `output` from the config)
        #[arg(short, long)]
        output: Option<PathBuf>,

        #[arg(long)]
        spec_version: Option<SpecVersion>,

        /// Format of the written files
        #[arg(long)]
        format: Option<Format>,
    },

    /// Bundle a split directory back into one document
    #[command(alias = "build")]
    Bundle {
        /// Root file or split directory (defaults to `output` from the config)
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// Write the bundled document here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,

        #[arg(long)]
        spec_version: Option<SpecVersion>,

        /// Format of the split files and of the bundled document
        #[arg(long)]
        format: Option<Format>,
    },

    /// Rewrite a single-file document in another format
    Convert {
        #[arg(short, long)]
        input: PathBuf,

        #[arg(short, long)]
        output: PathBuf,

        /// Target format (defaults to the output file's extension)
        #[arg(long)]
        format: Option<Format>,

        #[arg(long)]
        spec_version: Option<SpecVersion>,
    },

    /// Parse a document and report what it contains
    Validate {
        #[arg(short, long)]
        input: PathBuf,

        #[arg(long)]
        spec_version: Option<SpecVersion>,

        /// Print the summary as JSON
        #[arg(long)]
        json: bool,
    },

    /// Initialize a new apisplit configuration
    Init {
        /// Overwrite existing files
        #[arg(long)]
        force: bool,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        shell: Shell,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logger(cli.verbose);

    match cli.command {
        Commands::Split {
            input,
            output,
            spec_version,
            format,
        } => cmd_split(input, output, spec_version, format),

        Commands::Bundle {
            input,
            output,
            spec_version,
            format,
        } => cmd_bundle(input, output, spec_version, format),

        Commands::Convert {
            input,
            output,
            format,
            spec_version,
        } => cmd_convert(input, output, format, spec_version),

        Commands::Validate {
            input,
            spec_version,
            json,
        } => cmd_validate(input, spec_version, json),

        Commands::Init { force } => cmd_init(force),

        Commands::Completions { shell } => {
            let mut cmd = <Cli as clap::CommandFactory>::command();
            clap_complete::generate(shell, &mut cmd, "apisplit", &mut std::io::stdout());
            Ok(())
        }
    }
}

/// `RUST_LOG` wins over `-v`.
fn init_logger(verbose: u8) {
    let level = match verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        _ => LevelFilter::Debug,
    };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .init();
}

/// Try to load the project config file from the current directory.
fn try_load_config() -> Result<Option<ApisplitConfig>> {
    let config_path = PathBuf::from(CONFIG_FILE_NAME);
    config::load_config(&config_path).map_err(|e| anyhow::anyhow!(e))
}

/// Read a document, printing its diagnostics and failing on errors.
fn read_document(path: &Path, version: SpecVersion, fallback: Format) -> Result<Document> {
    let format = Format::from_path(path).unwrap_or(fallback);
    let read = codec::read_file(path, version, format)?;
    print_diagnostics(path, &read);
    if read.has_errors() {
        anyhow::bail!(
            "{} has {} error(s)",
            path.display(),
            read.errors().count()
        );
    }
    Ok(read.document)
}

fn print_diagnostics(path: &Path, read: &ReadResult) {
    for diagnostic in &read.diagnostics {
        eprintln!("  {}: {diagnostic}", path.display());
    }
}

fn print_report(report: &impl Report) {
    for issue in report.skipped() {
        eprintln!("  skipped {} {:?}: {}", issue.kind, issue.key, issue.error);
    }
    for warning in report.warnings() {
        eprintln!("  warning: {warning}");
    }
    if report.status() == Status::SuccessWithWarnings {
        eprintln!(
            "Finished with {} skipped item(s) and {} warning(s).",
            report.skipped().len(),
            report.warnings().len()
        );
    }
}

fn cmd_split(
    input: Option<PathBuf>,
    output: Option<PathBuf>,
    spec_version: Option<SpecVersion>,
    format: Option<Format>,
) -> Result<()> {
    let cfg = try_load_config()?.unwrap_or_default();
    let input = input.unwrap_or_else(|| PathBuf::from(&cfg.input));
    let output = output.unwrap_or_else(|| PathBuf::from(&cfg.output));
    let version = spec_version.unwrap_or(cfg.spec_version);
    let format = format.unwrap_or(cfg.format);

    let document = read_document(&input, version, cfg.format)?;
    eprintln!("Splitting {} → {}", input.display(), output.display());

    let splitter = Splitter::new(SplitOptions {
        version,
        format,
        retry: cfg.split.retry_policy(),
        ..SplitOptions::default()
    });
    let report = splitter
        .split(&document, &output)
        .with_context(|| format!("failed to split {}", input.display()))?;

    print_report(&report);
    eprintln!(
        "Wrote {} files plus {} in {:.2?}",
        report.written.len(),
        report.root_file.display(),
        report.elapsed
    );
    Ok(())
}

fn cmd_bundle(
    input: Option<PathBuf>,
    output: Option<PathBuf>,
    spec_version: Option<SpecVersion>,
    format: Option<Format>,
) -> Result<()> {
    let cfg = try_load_config()?.unwrap_or_default();
    let input = input.unwrap_or_else(|| PathBuf::from(&cfg.output));
    let version = spec_version.unwrap_or(cfg.spec_version);
    let format = format.unwrap_or(cfg.format);

    let root_file = locate_root(&input, format)?;
    let bundler = Bundler::new(BundleOptions {
        version,
        format,
        on_duplicate: cfg.bundle.on_duplicate,
        ..BundleOptions::default()
    });
    let outcome = bundler
        .bundle_file(&root_file)
        .with_context(|| format!("failed to bundle {}", root_file.display()))?;
    print_report(&outcome);

    let output_format = output
        .as_deref()
        .and_then(Format::from_path)
        .or_else(|| Format::from_path(&root_file))
        .unwrap_or(format);
    let content = codec::serialize_document(&outcome.document, version, output_format)?;
    match output {
        Some(path) => {
            fsutil::write_atomic(&path, content.as_bytes(), RetryPolicy::default())?;
            eprintln!(
                "Bundled {} files into {} in {:.2?}",
                outcome.report.loaded_files.len(),
                path.display(),
                outcome.report.elapsed
            );
        }
        None => {
            std::io::stdout()
                .write_all(content.as_bytes())
                .context("failed to write to stdout")?;
        }
    }
    Ok(())
}

fn cmd_convert(
    input: PathBuf,
    output: PathBuf,
    format: Option<Format>,
    spec_version: Option<SpecVersion>,
) -> Result<()> {
    let cfg = try_load_config()?.unwrap_or_default();
    let version = spec_version.unwrap_or(cfg.spec_version);
    let document = read_document(&input, version, cfg.format)?;

    let format = format
        .or_else(|| Format::from_path(&output))
        .unwrap_or(cfg.format);
    let content = codec::serialize_document(&document, version, format)?;
    fsutil::write_atomic(&output, content.as_bytes(), RetryPolicy::default())?;
    eprintln!("Wrote {} as {format}", output.display());
    Ok(())
}

fn cmd_validate(input: PathBuf, spec_version: Option<SpecVersion>, json: bool) -> Result<()> {
    let cfg = try_load_config()?.unwrap_or_default();
    let version = spec_version.unwrap_or(cfg.spec_version);
    let document = read_document(&input, version, cfg.format)?;

    let operations: usize = document
        .paths
        .values()
        .filter_map(|entry| match entry {
            PathEntry::Item(item) => Some(item.operations().count()),
            PathEntry::Stub(_) => None,
        })
        .sum();
    let mut families = serde_json::Map::new();
    for kind in COMPONENT_FAMILIES {
        let count = document.components.family(kind)?.len();
        if count > 0 {
            families.insert(kind.to_string(), count.into());
        }
    }

    if json {
        let summary = serde_json::json!({
            "title": document.info.as_ref().map(|info| info.title.as_str()),
            "version": document.declared_version(),
            "paths": document.paths.len(),
            "operations": operations,
            "components": families,
            "stubs": document.stub_count(),
        });
        println!("{}", serde_json::to_string_pretty(&summary)?);
        return Ok(());
    }

    eprintln!(
        "Valid OpenAPI {} document: {}",
        document.declared_version().unwrap_or("?"),
        document
            .info
            .as_ref()
            .map(|info| info.title.as_str())
            .unwrap_or("(untitled)")
    );
    eprintln!("  Paths: {}", document.paths.len());
    eprintln!("  Operations: {operations}");
    for (kind, count) in &families {
        eprintln!("  {kind}: {count}");
    }
    if document.stub_count() > 0 {
        eprintln!("  Reference stubs: {}", document.stub_count());
    }
    eprintln!("Validation successful.");
    Ok(())
}

fn cmd_init(force: bool) -> Result<()> {
    let config_path = PathBuf::from(CONFIG_FILE_NAME);

    if config_path.exists() && !force {
        anyhow::bail!(
            "{} already exists. Use --force to overwrite.",
            config_path.display()
        );
    }

    fs::write(&config_path, config::default_config_content())?;
    eprintln!("Created {}", config_path.display());
    Ok(())
}

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use clap_complete::Shell;

use oaf_core::config::{self, CONFIG_FILE_NAME, FixConfig};
use oaf_core::parse::{self, spec::Document};
use oaf_core::refs::{CollectScope, RefCollector};
use oaf_core::transform::{FixOptions, FixResult, Fixer, GenericNamingStrategy};

#[derive(Parser)]
#[command(
    name = "oaf",
    about = "Repair the reference graph of Swagger 2.0 / OpenAPI 3.x documents",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Rename generic-style schemas, rewrite their references and prune unused ones
    Fix {
        /// Path to the API description (YAML or JSON)
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// Write the fixed document here instead of stdout
        #[arg(short, long, conflicts_with = "in_place")]
        output: Option<PathBuf>,

        /// Rewrite the input file itself
        #[arg(long)]
        in_place: bool,

        /// How generic-style names are flattened
        #[arg(long)]
        strategy: Option<StrategyArg>,

        /// Keep type parameter casing as written
        #[arg(long)]
        preserve_casing: bool,

        /// Skip renaming generic-style schema names
        #[arg(long)]
        no_rename: bool,

        /// Skip pruning unreferenced schemas
        #[arg(long)]
        no_prune: bool,

        /// Also remove path items that have no operations
        #[arg(long)]
        prune_empty_paths: bool,

        /// Report what would change without writing anything
        #[arg(long)]
        dry_run: bool,

        /// Output format (defaults to the destination's extension)
        #[arg(long)]
        format: Option<OutputFormat>,
    },

    /// Print every reference found in a document
    Refs {
        /// Path to the API description
        #[arg(short, long)]
        input: PathBuf,

        /// Only references that keep schemas alive (operations and non-schema components)
        #[arg(long)]
        entry_points: bool,

        /// Output format
        #[arg(long, default_value = "yaml")]
        format: OutputFormat,
    },

    /// Initialize a new oaf configuration
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

#[derive(Clone, Copy, ValueEnum)]
enum OutputFormat {
    Yaml,
    Json,
}

#[derive(Clone, Copy, ValueEnum)]
enum StrategyArg {
    Underscore,
    Of,
    For,
    Flattened,
    Dot,
}

impl From<StrategyArg> for GenericNamingStrategy {
    fn from(arg: StrategyArg) -> Self {
        match arg {
            StrategyArg::Underscore => GenericNamingStrategy::Underscore,
            StrategyArg::Of => GenericNamingStrategy::Of,
            StrategyArg::For => GenericNamingStrategy::For,
            StrategyArg::Flattened => GenericNamingStrategy::Flattened,
            StrategyArg::Dot => GenericNamingStrategy::Dot,
        }
    }
}

/// `fix` flags, gathered so they can be layered over the config file.
struct FixArgs {
    input: Option<PathBuf>,
    output: Option<PathBuf>,
    in_place: bool,
    strategy: Option<StrategyArg>,
    preserve_casing: bool,
    no_rename: bool,
    no_prune: bool,
    prune_empty_paths: bool,
    dry_run: bool,
    format: Option<OutputFormat>,
}

/// Where the fixed document goes.
enum Destination {
    Stdout,
    File(PathBuf),
}

fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Fix {
            input,
            output,
            in_place,
            strategy,
            preserve_casing,
            no_rename,
            no_prune,
            prune_empty_paths,
            dry_run,
            format,
        } => cmd_fix(FixArgs {
            input,
            output,
            in_place,
            strategy,
            preserve_casing,
            no_rename,
            no_prune,
            prune_empty_paths,
            dry_run,
            format,
        }),

        Commands::Refs {
            input,
            entry_points,
            format,
        } => cmd_refs(input, entry_points, format),

        Commands::Init { force } => cmd_init(force),

        Commands::Completions { shell } => {
            let mut cmd = <Cli as clap::CommandFactory>::command();
            clap_complete::generate(shell, &mut cmd, "oaf", &mut std::io::stdout());
            Ok(())
        }
    }
}

/// Try to load the project config file from the current directory.
fn try_load_config() -> Result<Option<FixConfig>> {
    let config_path = PathBuf::from(CONFIG_FILE_NAME);
    Ok(config::load_config(&config_path)?)
}

fn load_document(path: &Path) -> Result<Document> {
    let content =
        fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))?;
    let ext = path.extension().and_then(|e| e.to_str());
    parse::from_str_detect(&content, ext)
        .with_context(|| format!("failed to parse {}", path.display()))
}

fn render(doc: &Document, format: OutputFormat) -> Result<String> {
    Ok(match format {
        OutputFormat::Yaml => doc.to_yaml()?,
        OutputFormat::Json => {
            let mut json = doc.to_json()?;
            json.push('\n');
            json
        }
    })
}

fn format_for(path: &Path) -> OutputFormat {
    match path.extension().and_then(|e| e.to_str()) {
        Some(ext) if ext.eq_ignore_ascii_case("json") => OutputFormat::Json,
        _ => OutputFormat::Yaml,
    }
}

fn report(result: &FixResult) {
    for fix in &result.fixes {
        eprintln!("  {fix}");
    }
    eprintln!("Applied {} fix(es).", result.count());
}

fn cmd_fix(args: FixArgs) -> Result<()> {
    let mut cfg = try_load_config()?.unwrap_or_default();

    // Flags win over the config file.
    if args.in_place {
        cfg.in_place = true;
        cfg.output = None;
    } else if let Some(output) = &args.output {
        cfg.in_place = false;
        cfg.output = Some(output.display().to_string());
    }
    cfg.validate()?;

    let mut options = FixOptions::from(&cfg);
    if let Some(strategy) = args.strategy {
        options.naming.strategy = strategy.into();
    }
    options.naming.preserve_casing |= args.preserve_casing;
    options.rename_generic_schemas &= !args.no_rename;
    options.prune_unused_schemas &= !args.no_prune;
    options.prune_empty_paths |= args.prune_empty_paths;

    let input = args.input.unwrap_or_else(|| PathBuf::from(&cfg.input));
    let fixer = Fixer::new(options);

    let (fixed, result, destination) = if cfg.in_place {
        let mut doc = load_document(&input)?;
        let result = fixer
            .fix_in_place(&mut doc)
            .with_context(|| format!("failed to fix {}", input.display()))?;
        (doc, result, Destination::File(input.clone()))
    } else {
        let doc = load_document(&input)?;
        let (fixed, result) = fixer
            .fix(&doc)
            .with_context(|| format!("failed to fix {}", input.display()))?;
        let destination = match &cfg.output {
            Some(output) => Destination::File(PathBuf::from(output)),
            None => Destination::Stdout,
        };
        (fixed, result, destination)
    };

    eprintln!("Fixing {} ({})", input.display(), fixed.variant());
    report(&result);

    if args.dry_run {
        eprintln!("Dry run, nothing written.");
        return Ok(());
    }

    match destination {
        Destination::Stdout => {
            let format = args.format.unwrap_or_else(|| format_for(&input));
            print!("{}", render(&fixed, format)?);
        }
        Destination::File(path) => {
            if cfg.in_place && result.is_empty() {
                eprintln!("{} is already clean.", path.display());
                return Ok(());
            }
            let format = args.format.unwrap_or_else(|| format_for(&path));
            fs::write(&path, render(&fixed, format)?)
                .with_context(|| format!("failed to write {}", path.display()))?;
            eprintln!("  wrote {}", path.display());
        }
    }
    Ok(())
}

fn cmd_refs(input: PathBuf, entry_points: bool, format: OutputFormat) -> Result<()> {
    let doc = load_document(&input)?;
    let scope = if entry_points {
        CollectScope::EntryPoints
    } else {
        CollectScope::Full
    };
    let index = RefCollector::collect(&doc, scope);

    match format {
        OutputFormat::Yaml => {
            let yaml = serde_yaml_ng::to_string(&index)?;
            print!("{}", yaml);
        }
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(&index)?;
            println!("{}", json);
        }
    }

    log::info!(
        "{} distinct pointer(s) in {}",
        index.len(),
        input.display()
    );
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

    fs::write(&config_path, config::default_config_content())
        .with_context(|| format!("failed to write {}", config_path.display()))?;
    eprintln!("Created {}", config_path.display());
    Ok(())
}

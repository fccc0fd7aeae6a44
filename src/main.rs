use clap::{Parser, Subcommand};
use docpack::{bundle, config, output, rules::RuleSet};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "docpack")]
#[command(about = "Rule-driven asset bundler for documentation trees")]
#[command(long_about = "\
Rule-driven asset bundler for documentation trees

Every file under the source directory is matched against an ordered rule
table. The first matching rule picks the pipeline:

  \\.css$                       inline-style-injection    collect-text → inject-style
  \\.(eot|ttf|woff(2)?|svg|…)$  opaque-resource-emission  emit-resource
  \\.md$                        document-transformation   parse-markdown → … → serialize-to-markup

Files that match no rule are passed through untouched.

Configuration layers (later wins, arrays append):
  built-in defaults → local overrides → docpack.toml (in the source dir, or --config)

Run 'docpack gen-config' to generate a documented docpack.toml.")]
#[command(version)]
struct Cli {
    /// Source directory
    #[arg(long, default_value = "docs", global = true)]
    source: PathBuf,

    /// Output directory
    #[arg(long, default_value = "dist", global = true)]
    output: PathBuf,

    /// Config file (defaults to <source>/docpack.toml when present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Show which pipeline handles each path
    Resolve {
        #[arg(required = true)]
        paths: Vec<String>,
    },
    /// Run every pipeline and write the output directory
    Build,
    /// Run every pipeline in memory without writing anything
    Check,
    /// Print the effective merged configuration
    ShowConfig,
    /// Print a stock docpack.toml with all options documented
    GenConfig,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match &cli.command {
        Command::Resolve { paths } => {
            let config = load_config(&cli)?;
            let rules = RuleSet::from_config(&config)?;
            for path in paths {
                output::print_resolve(path, rules.resolve(path));
            }
        }
        Command::Build => {
            let config = load_config(&cli)?;
            println!(
                "==> Building {} → {}",
                cli.source.display(),
                cli.output.display()
            );
            let report = bundle::bundle(&cli.source, &cli.output, &config)?;
            output::print_build_report(&report);
            println!("==> Build complete: {}", cli.output.display());
        }
        Command::Check => {
            let config = load_config(&cli)?;
            println!("==> Checking {}", cli.source.display());
            let report = bundle::check(&cli.source, &config)?;
            output::print_build_report(&report);
            println!("==> Content is valid");
        }
        Command::ShowConfig => {
            let config = load_config(&cli)?;
            print!("{}", config::to_toml_string(&config)?);
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}

/// Effective config: `--config` if given, else `<source>/docpack.toml` if present.
fn load_config(cli: &Cli) -> Result<config::BuildConfig, config::ConfigError> {
    let user = match &cli.config {
        Some(path) => Some(config::load_config_file(path)?),
        None => config::load_raw_config(&cli.source)?,
    };
    config::effective_config(user)
}

/// Log to stderr so reports on stdout stay clean. `RUST_LOG` wins over `-v`.
fn init_tracing(verbose: u8) {
    use tracing_subscriber::{EnvFilter, fmt};

    let filter = match verbose {
        0 => "docpack=info",
        1 => "docpack=debug",
        _ => "docpack=trace",
    };
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));
    fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

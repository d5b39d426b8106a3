use clap::{Parser, Subcommand};
use docweave::{config, manifest, output, pipeline};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "docweave")]
#[command(about = "Navigation and link-integrity builder for documentation sites")]
#[command(long_about = "\
Navigation and link-integrity builder for documentation sites

Scans docs and blog content, builds the sidebars of every locale, checks
every internal link, and writes a site manifest for the renderer.

Site structure:

  site/
  ├── docweave.toml                # Site config (optional)
  ├── sidebars.toml                # Sidebar layout (optional, else generated)
  ├── docs/
  │   ├── intro.md                 # → docs/intro
  │   └── 02-guides/               # Number prefix = sidebar position
  │       ├── _category_.yml       # Category label, position, collapsed
  │       ├── index.md             # Category landing page
  │       └── setup.md             # → docs/guides/setup
  ├── blog/
  │   └── 2024-05-01-launch.md     # → blog/launch, dated 2024-05-01
  └── i18n/
      └── fr/docs/intro.md         # French translation of docs/intro

Link policies (on_broken_links, on_broken_markdown_links):
  ignore  drop broken links from the report
  warn    report them, build succeeds
  error   report them, build fails

Run 'docweave gen-config' to generate a documented docweave.toml.")]
#[command(version)]
struct Cli {
    /// Site root directory
    #[arg(long, default_value = ".", global = true)]
    root: PathBuf,

    /// Config file (default: <root>/docweave.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Output directory for manifest.json
    #[arg(long, default_value = "build", global = true)]
    out: PathBuf,

    /// Debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the full pipeline and write the site manifest
    Build,
    /// Run the full pipeline without writing anything
    Check,
    /// List discovered content per locale
    Scan,
    /// Print a stock docweave.toml with all options documented
    GenConfig,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Command::Build => {
            let site = pipeline::Site::load(&cli.root, cli.config.as_deref())?;
            println!("==> Building {}", cli.root.display());
            let outcome = run_reporting(&site)?;
            if let Some(manifest) = &outcome.manifest {
                output::print_navigation(&manifest.parts.navigation);
                let path = manifest::write_manifest(manifest, &cli.out)?;
                println!("==> Manifest: {}", path.display());
            }
            output::print_summary(&outcome);
            ensure_succeeded(&outcome)?;
        }
        Command::Check => {
            let site = pipeline::Site::load(&cli.root, cli.config.as_deref())?;
            println!("==> Checking {}", cli.root.display());
            let outcome = run_reporting(&site)?;
            output::print_summary(&outcome);
            ensure_succeeded(&outcome)?;
        }
        Command::Scan => {
            let site = pipeline::Site::load(&cli.root, cli.config.as_deref())?;
            let inventory = pipeline::scan(&site)?;
            let resolved = pipeline::resolve_locales(&site, &inventory)?;
            output::print_scan_output(&inventory, &resolved);
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}

/// `docweave=info`, or `docweave=debug` with `-v`. `RUST_LOG` wins when set.
fn init_logging(verbose: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if verbose {
            EnvFilter::new("docweave=debug")
        } else {
            EnvFilter::new("docweave=info")
        }
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr)
        .init();
}

/// Run the pipeline; on a fatal error print the findings collected so far.
fn run_reporting(site: &pipeline::Site) -> Result<pipeline::BuildOutcome, Box<dyn std::error::Error>> {
    pipeline::run(site).map_err(|e| {
        if let Some(findings) = e.findings() {
            output::print_findings(findings);
        }
        e.into()
    })
}

fn ensure_succeeded(outcome: &pipeline::BuildOutcome) -> Result<(), Box<dyn std::error::Error>> {
    if outcome.succeeded() {
        Ok(())
    } else {
        Err(format!(
            "build failed with {} error(s)",
            outcome.findings.count(docweave::diagnostics::Severity::Error)
        )
        .into())
    }
}

mod filters;

use anyhow::Context;
use clap::{Parser, Subcommand};
use locus_core::{
    ConfigLoader, FilterValue, Format, LocusConfig, MatchMode, SelectorRegistry, builtin,
};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "locus", version, about = "Compile selectors into CSS or XPath queries")]
struct Args {
    #[command(subcommand)]
    command: Command,

    /// Config file (defaults to ./locus.yaml, then ~/.locus/config.yaml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Command {
    /// List registered selector kinds
    List,
    /// Compile a selector to a query expression
    Compile {
        /// Selector kind, e.g. field or link_or_button
        selector: String,
        /// Primary locator value
        locator: Option<String>,
        /// Output format (css or xpath)
        #[arg(long)]
        format: Option<Format>,
        /// Filter as key=value; repeatable
        #[arg(long = "filter", value_parser = filters::parse_filter)]
        filters: Vec<(String, FilterValue)>,
        /// Treat the locator as a regular expression
        #[arg(long)]
        pattern: bool,
        /// Match aria-label attributes
        #[arg(long)]
        aria_label: bool,
        /// Treat role="button" elements as buttons
        #[arg(long)]
        aria_role: bool,
        /// Test id attribute, e.g. data-testid
        #[arg(long)]
        test_id: Option<String>,
        /// Render text comparisons as substring matches
        #[arg(long)]
        fuzzy: bool,
    },
}

fn load_config(path: Option<&PathBuf>) -> anyhow::Result<LocusConfig> {
    match path {
        Some(path) => ConfigLoader::load_from(path)
            .with_context(|| format!("failed to load config from {}", path.display())),
        None => ConfigLoader::load_default().context("failed to load config"),
    }
}

fn list(registry: &SelectorRegistry) -> anyhow::Result<()> {
    for name in registry.names() {
        let definition = registry.lookup(&name)?;
        let format = definition
            .default_format()
            .map(|f| f.to_string())
            .unwrap_or_else(|| "-".to_string());
        println!(
            "{:<16} {:<6} {}",
            name,
            format,
            definition.description().unwrap_or_default()
        );
    }
    Ok(())
}

fn main() -> anyhow::Result<()> {
    // Logs and warnings go to stderr; stdout carries only the expression
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let config = load_config(args.config.as_ref())?;
    tracing::debug!(?config, "configuration loaded");

    let registry = locus_core::global();
    builtin::install(registry);

    match args.command {
        Command::List => list(registry),
        Command::Compile {
            selector,
            locator,
            format,
            filters,
            pattern,
            aria_label,
            aria_role,
            test_id,
            fuzzy,
        } => {
            let mut selector_config = config.selectors;
            selector_config.enable_aria_label |= aria_label;
            selector_config.enable_aria_role |= aria_role;
            if test_id.is_some() {
                selector_config.test_id = test_id;
            }

            let locator = locator
                .map(|l| filters::parse_locator(&l, pattern))
                .transpose()
                .context("invalid locator pattern")?;
            let options = filters::filter_options(filters);

            let mut instance =
                registry.selector(&selector, selector_config, format.or(config.default_format))?;
            let expression = instance.compile(locator.as_ref(), &options)?;

            for error in instance.errors() {
                eprintln!("filter error: {error}");
            }

            let Some(expression) = expression else {
                anyhow::bail!("selector :{selector} has no format");
            };
            let mode = if fuzzy { MatchMode::Fuzzy } else { MatchMode::Exact };
            println!("{}", expression.render(mode));
            Ok(())
        }
    }
}

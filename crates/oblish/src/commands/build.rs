//! `oblish build` command implementation.

use std::path::PathBuf;

use clap::Args;
use oblish_config::{CliSettings, Config};
use oblish_site::{BuildReport, SiteBuilder};

use crate::error::CliError;
use crate::output::Output;

/// Arguments for the build command.
#[derive(Args)]
pub(crate) struct BuildArgs {
    /// Vault directory to build.
    #[arg(short, long, env = "OBLISH_VAULT", default_value = ".")]
    vault: PathBuf,

    /// Path to configuration file (default: <vault>/.oblish/config.toml).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Output directory (overrides config, default: public).
    #[arg(short, long)]
    destination: Option<PathBuf>,

    /// Enable verbose output (log each build phase).
    #[arg(short = 'V', long)]
    pub verbose: bool,
}

impl BuildArgs {
    /// Execute the build command.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration loading or any fatal build phase fails.
    pub(crate) fn execute(self, output: &Output) -> Result<(), CliError> {
        let cli_settings = CliSettings {
            destination: self.destination,
        };
        let config = Config::load(self.config.as_deref(), &self.vault, Some(&cli_settings))?;

        output.info(&format!("Vault: {}", config.vault_dir.display()));
        output.info(&format!("Output: {}", config.destination.display()));

        let report = SiteBuilder::new(&config).build()?;

        print_warnings(output, &report);
        output.success(&format!(
            "Built {} pages from {} notes ({} placeholders, {} tags) to {}",
            report.pages,
            report.notes,
            report.placeholders,
            report.tags,
            config.destination.display()
        ));
        Ok(())
    }
}

fn print_warnings(output: &Output, report: &BuildReport) {
    if report.assets.failed > 0 {
        output.warning(&format!(
            "{} file(s) could not be copied",
            report.assets.failed
        ));
    }
    for duplicate in &report.duplicates {
        output.warning(&format!(
            "Skipped {}: note \"{}\" already defined by {}",
            duplicate.skipped.display(),
            duplicate.title,
            duplicate.kept.display()
        ));
    }
    for collision in &report.slug_collisions {
        let titles = collision.titles.join(", ");
        match collision.reserved {
            Some(page) => output.warning(&format!(
                "Overwritten by the {page}: {titles} (slug \"{}\")",
                collision.slug
            )),
            None => output.warning(&format!(
                "Notes share the slug \"{}\": {titles}",
                collision.slug
            )),
        }
    }
}

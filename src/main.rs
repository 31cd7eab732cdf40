mod app;
mod color;
mod state;
mod ui;

use std::path::PathBuf;

use anyhow::{anyhow, bail, Result};
use clap::Parser;
use eframe::egui;

use app::SpotfitApp;
use spotfit::{pipeline, report, RunConfig};
use state::AppState;

#[derive(Parser)]
#[command(name = "spotfit")]
#[command(about = "Score unocculted spot contamination models against a transmission spectrum")]
#[command(version)]
struct Args {
    /// Run configuration (JSON)
    config: Option<PathBuf>,

    /// Print the fit report and exit without opening the viewer
    #[arg(long)]
    headless: bool,

    /// Write the aligned model curves to this CSV (overrides the config)
    #[arg(long, value_name = "PATH")]
    export: Option<PathBuf>,
}

/// Reject flag combinations that only make sense with a configuration file.
fn check_args(args: &Args) -> Result<()> {
    if args.config.is_none() {
        if args.headless {
            bail!("--headless needs a configuration file");
        }
        if args.export.is_some() {
            bail!("--export needs a configuration file");
        }
    }
    Ok(())
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();
    check_args(&args)?;

    let mut state = AppState::default();

    if let Some(path) = &args.config {
        let mut config = RunConfig::load(path)?;
        if args.export.is_some() {
            config.export = args.export.clone();
        }
        let (observed, outcomes) = pipeline::run(&config)?;
        print!("{}", report::summary(&outcomes));
        if let Some(export) = &config.export {
            report::export_curves(export, &outcomes)?;
        }
        state.set_run(config, observed, outcomes);
    }

    if args.headless {
        return Ok(());
    }

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1200.0, 800.0])
            .with_min_inner_size([600.0, 400.0]),
        ..Default::default()
    };

    eframe::run_native(
        "spotfit – stellar contamination models",
        options,
        Box::new(|_cc| Ok(Box::new(SpotfitApp::new(state)))),
    )
    .map_err(|e| anyhow!("viewer failed: {e}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(argv: &[&str]) -> Args {
        Args::try_parse_from(argv).unwrap()
    }

    #[test]
    fn test_export_without_config_rejected() {
        let err = check_args(&parse(&["spotfit", "--export", "x.csv"])).unwrap_err();
        assert!(err.to_string().contains("--export"));
    }

    #[test]
    fn test_headless_without_config_rejected() {
        assert!(check_args(&parse(&["spotfit", "--headless"])).is_err());
    }

    #[test]
    fn test_flags_with_config_accepted() {
        let args = parse(&["spotfit", "run.json", "--headless", "--export", "x.csv"]);
        assert!(check_args(&args).is_ok());
        assert!(check_args(&parse(&["spotfit"])).is_ok());
    }
}

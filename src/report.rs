use std::fmt::Write as _;
use std::path::Path;

use anyhow::{Context, Result};

use crate::pipeline::ScenarioOutcome;

// ---------------------------------------------------------------------------
// Text summary
// ---------------------------------------------------------------------------

/// Human-readable verdicts, grouped by variability level in config order.
pub fn summary(outcomes: &[ScenarioOutcome]) -> String {
    let mut out = String::new();
    let mut labels: Vec<&str> = Vec::new();
    for o in outcomes {
        let label = o.scenario.variability.label.as_str();
        if !labels.contains(&label) {
            labels.push(label);
        }
    }

    for label in labels {
        let _ = writeln!(out, "Statistics for '{label}' variability:");
        for o in outcomes.iter().filter(|o| o.scenario.variability.label == label) {
            let temp = o.scenario.spot_temperature;
            match &o.result {
                Ok(r) => {
                    let f = &r.fit;
                    let _ = writeln!(
                        out,
                        "  {temp} K spots: chi2v = {:.4}  (good fit is between {:.4} and {:.4}) → {}",
                        f.chi2v,
                        f.lower,
                        f.upper,
                        if f.good_fit {
                            "good fit"
                        } else {
                            "rule this model out"
                        }
                    );
                }
                Err(e) => {
                    let _ = writeln!(out, "  {temp} K spots: failed: {e:#}");
                }
            }
        }
        out.push('\n');
    }
    out
}

// ---------------------------------------------------------------------------
// CSV export of the aligned model curves
// ---------------------------------------------------------------------------

/// Write one row per coarse-grid wavelength with one column per successful
/// scenario, named `<temperature>K_<label>`.
pub fn export_curves(path: &Path, outcomes: &[ScenarioOutcome]) -> Result<()> {
    let curves: Vec<_> = outcomes
        .iter()
        .filter_map(|o| o.result.as_ref().ok().map(|r| (&o.scenario, r)))
        .collect();
    let Some((_, first)) = curves.first() else {
        log::warn!("No successful scenarios, nothing exported to {}", path.display());
        return Ok(());
    };

    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("creating {}", path.display()))?;

    let mut header = vec!["wavelength".to_string()];
    header.extend(
        curves
            .iter()
            .map(|(s, _)| format!("{}K_{}", s.spot_temperature, s.variability.label)),
    );
    writer.write_record(&header).context("writing CSV header")?;

    for (i, w) in first.aligned.wavelengths().iter().enumerate() {
        let mut row = vec![w.to_string()];
        row.extend(curves.iter().map(|(_, r)| r.aligned.flux()[i].to_string()));
        writer.write_record(&row).context("writing CSV row")?;
    }
    writer.flush().context("flushing CSV")?;

    log::info!("Exported {} model curves to {}", curves.len(), path.display());
    Ok(())
}

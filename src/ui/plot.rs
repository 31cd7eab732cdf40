use eframe::egui::{Color32, Ui};
use egui_plot::{HLine, Line, LineStyle, Plot, PlotPoints, Points};

use crate::state::AppState;

// ---------------------------------------------------------------------------
// Comparison plot (central panel)
// ---------------------------------------------------------------------------

const DATA_COLOR: Color32 = Color32::from_rgb(0, 0, 128);

/// Observed depths with error bars, overlaid with every visible aligned model.
pub fn comparison_plot(ui: &mut Ui, state: &AppState) {
    let observed = match &state.observed {
        Some(obs) => obs,
        None => {
            ui.centered_and_justified(|ui: &mut Ui| {
                ui.heading("Open a run configuration  (File → Open…)");
            });
            return;
        }
    };

    // Largest amplitude drawn solid, smaller ones dashed/dotted.
    let mut amplitudes: Vec<f64> = state
        .config
        .iter()
        .flat_map(|c| c.variability.iter().map(|v| v.delta_f))
        .collect();
    amplitudes.sort_by(|a, b| b.total_cmp(a));
    let line_style = |delta_f: f64| match amplitudes.iter().position(|&a| a == delta_f) {
        Some(0) | None => LineStyle::Solid,
        Some(1) => LineStyle::dotted_dense(),
        Some(_) => LineStyle::dashed_loose(),
    };

    let flat_depth = state.config.as_ref().and_then(|c| c.flat_depth);

    Plot::new("comparison_plot")
        .legend(egui_plot::Legend::default())
        .x_axis_label("Wavelength (µm)")
        .y_axis_label("Transit depth (ppm)")
        .allow_boxed_zoom(true)
        .allow_drag(true)
        .allow_scroll(true)
        .allow_zoom(true)
        .show(ui, |plot_ui| {
            // ---- Observed data ----
            for i in 0..observed.len() {
                let (x, y) = (observed.wvl()[i], observed.depth()[i]);
                let (xe, ye) = (observed.wvl_width()[i], observed.err()[i]);
                plot_ui.line(Line::new(vec![[x, y - ye], [x, y + ye]]).color(DATA_COLOR));
                plot_ui.line(Line::new(vec![[x - xe, y], [x + xe, y]]).color(DATA_COLOR));
            }
            let points: PlotPoints = observed
                .wvl()
                .iter()
                .zip(observed.depth())
                .map(|(&x, &y)| [x, y])
                .collect();
            plot_ui.points(
                Points::new(points)
                    .name("observed")
                    .color(DATA_COLOR)
                    .radius(3.0),
            );

            // ---- Models ----
            for &idx in &state.visible_indices {
                let outcome = &state.outcomes[idx];
                let Ok(result) = &outcome.result else {
                    continue;
                };
                let scenario = &outcome.scenario;

                let color = state
                    .color_map
                    .as_ref()
                    .map(|cm| cm.color_for(scenario.spot_temperature))
                    .unwrap_or(Color32::LIGHT_BLUE);

                let points: PlotPoints = result
                    .aligned
                    .wavelengths()
                    .iter()
                    .zip(result.aligned.flux())
                    .map(|(&x, &y)| [x, y])
                    .collect();

                let name = format!(
                    "T_spot = {} K, {}",
                    scenario.spot_temperature, scenario.variability
                );
                plot_ui.line(
                    Line::new(points)
                        .name(&name)
                        .color(color.gamma_multiply(0.7))
                        .style(line_style(scenario.variability.delta_f))
                        .width(1.5),
                );
            }

            if let Some(depth) = flat_depth {
                plot_ui.hline(
                    HLine::new(depth)
                        .name("flat")
                        .color(Color32::GRAY)
                        .style(LineStyle::dashed_dense()),
                );
            }
        });
}

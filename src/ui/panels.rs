use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};
use egui_extras::{Column, TableBuilder};

use crate::state::AppState;

// ---------------------------------------------------------------------------
// Left side panel – scenario filters and fit table
// ---------------------------------------------------------------------------

/// Render the left panel.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Scenarios");
    ui.separator();

    if state.outcomes.is_empty() {
        ui.label("No run loaded.");
        return;
    }

    // Clone what we need so we can mutate state inside the loop.
    let temperatures: Vec<_> = state
        .outcomes
        .iter()
        .map(|o| o.scenario.spot_temperature)
        .collect::<std::collections::BTreeSet<_>>()
        .into_iter()
        .collect();
    let mut levels: Vec<String> = Vec::new();
    for o in &state.outcomes {
        if !levels.contains(&o.scenario.variability.label) {
            levels.push(o.scenario.variability.label.clone());
        }
    }

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            egui::CollapsingHeader::new(RichText::new("Spot temperature").strong())
                .default_open(true)
                .show(ui, |ui: &mut Ui| {
                    for &t in &temperatures {
                        let mut text = RichText::new(format!("{t} K"));
                        if let Some(cm) = &state.color_map {
                            text = text.color(cm.color_for(t));
                        }
                        let mut checked = state.filter.temperatures.contains(&t);
                        if ui.checkbox(&mut checked, text).changed() {
                            state.toggle_temperature(t);
                        }
                    }
                });

            egui::CollapsingHeader::new(RichText::new("Variability").strong())
                .default_open(true)
                .show(ui, |ui: &mut Ui| {
                    for label in &levels {
                        let mut checked = state.filter.levels.contains(label);
                        if ui.checkbox(&mut checked, label.as_str()).changed() {
                            state.toggle_level(label);
                        }
                    }
                });

            ui.separator();
            ui.strong("Fit results");
            fit_table(ui, state);
        });
}

fn fit_table(ui: &mut Ui, state: &AppState) {
    TableBuilder::new(ui)
        .striped(true)
        .vscroll(false)
        .column(Column::auto())
        .column(Column::auto())
        .column(Column::auto())
        .column(Column::remainder())
        .header(20.0, |mut header| {
            for title in ["T_spot", "level", "chi2v", "verdict"] {
                header.col(|ui| {
                    ui.strong(title);
                });
            }
        })
        .body(|mut body| {
            for outcome in &state.outcomes {
                body.row(18.0, |mut row| {
                    row.col(|ui| {
                        ui.label(format!("{} K", outcome.scenario.spot_temperature));
                    });
                    row.col(|ui| {
                        ui.label(outcome.scenario.variability.label.as_str());
                    });
                    match &outcome.result {
                        Ok(r) => {
                            row.col(|ui| {
                                ui.label(format!("{:.3}", r.fit.chi2v))
                                    .on_hover_text(format!(
                                        "good fit between {:.3} and {:.3}",
                                        r.fit.lower, r.fit.upper
                                    ));
                            });
                            row.col(|ui| {
                                if r.fit.good_fit {
                                    ui.colored_label(Color32::DARK_GREEN, "good");
                                } else {
                                    ui.colored_label(Color32::DARK_RED, "ruled out");
                                }
                            });
                        }
                        Err(e) => {
                            row.col(|ui| {
                                ui.label("–");
                            });
                            row.col(|ui| {
                                ui.colored_label(Color32::RED, "failed")
                                    .on_hover_text(format!("{e:#}"));
                            });
                        }
                    }
                });
            }
        });
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Open…").clicked() {
                open_config_dialog(state);
                ui.close_menu();
            }
            if ui
                .add_enabled(!state.outcomes.is_empty(), egui::Button::new("Export curves…"))
                .clicked()
            {
                export_dialog(state);
                ui.close_menu();
            }
        });

        ui.separator();

        if let Some(config) = &state.config {
            ui.label(format!(
                "T_phot = {} K, {} scenarios, {} good fits",
                config.photosphere.temperature,
                state.outcomes.len(),
                state.good_fits()
            ));
        }

        if let Some(msg) = &state.status_message {
            ui.separator();
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });
}

// ---------------------------------------------------------------------------
// File dialogs
// ---------------------------------------------------------------------------

pub fn open_config_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Open run configuration")
        .add_filter("JSON", &["json"])
        .pick_file();

    if let Some(path) = file {
        state.open_config(&path);
    }
}

pub fn export_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Export model curves")
        .set_file_name("stellar_contamination_models.csv")
        .add_filter("CSV", &["csv"])
        .save_file();

    if let Some(path) = file {
        if let Err(e) = spotfit::report::export_curves(&path, &state.outcomes) {
            log::error!("Export failed: {e:#}");
            state.status_message = Some(format!("Error: {e:#}"));
        }
    }
}

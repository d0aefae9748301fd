use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};
use egui_extras::{Column, TableBuilder};

use crate::data::bundle::FEATURE_COUNT;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Left side panel – sample selection and inspection widgets
// ---------------------------------------------------------------------------

/// Render the left sample panel.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Sample");
    ui.separator();

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            // ---- Sample picker ----
            let range = state.selection.valid_range();
            let mut idx = state.selection.current();

            ui.label(format!(
                "Sample #{idx} of {}",
                state.selection.len()
            ));
            let slider = ui.add(
                egui::Slider::new(&mut idx, range.start..=range.end - 1)
                    .integer()
                    .text("index"),
            );
            if slider.changed() {
                state.select_sample(idx);
            }

            ui.horizontal(|ui: &mut Ui| {
                if ui.button("Random sample").clicked() {
                    state.select_random_sample();
                }
            });

            ui.add_space(8.0);
            ui.separator();

            // ---- Prediction trigger ----
            if ui
                .button(RichText::new("Run prediction").strong())
                .clicked()
            {
                state.run_prediction();
            }
            if let Some(report) = &state.report {
                ui.small(format!(
                    "Last run: sample #{}",
                    report.sample_index
                ));
            }

            ui.add_space(8.0);
            ui.separator();

            // ---- Model & preprocessing summary ----
            egui::CollapsingHeader::new(RichText::new("Model & preprocessing").strong())
                .default_open(false)
                .show(ui, |ui: &mut Ui| {
                    ui.label(state.bundle.model.describe());
                    ui.label(state.bundle.scaler.describe());
                    ui.label(state.bundle.imputer.describe());
                    ui.small(
                        "Transforms were applied upstream; stored features \
                         are already in model units.",
                    );
                });

            // ---- Per-sample feature table ----
            egui::CollapsingHeader::new(RichText::new("Feature values").strong())
                .default_open(false)
                .show(ui, |ui: &mut Ui| {
                    feature_table(ui, state);
                });

            // ---- Explainer ----
            egui::CollapsingHeader::new("What does this data represent?")
                .default_open(false)
                .show(ui, |ui: &mut Ui| {
                    ui.label(
                        "Each CT slice is described by 384 directional readings. \
                         The bone readings measure where denser material (skull, \
                         spine) appears around the slice; the air readings measure \
                         where air shows up (sinuses, lungs).",
                    );
                    ui.add_space(4.0);
                    ui.label(
                        "From that pattern the model estimates where along the \
                         body the slice was taken: 0 is the top of the head, \
                         180 the soles of the feet.",
                    );
                });
        });
}

fn feature_table(ui: &mut Ui, state: &AppState) {
    let sample = match state.bundle.sample(state.selection.current()) {
        Ok(s) => s,
        Err(e) => {
            ui.label(RichText::new(e.to_string()).color(Color32::RED));
            return;
        }
    };

    TableBuilder::new(ui)
        .striped(true)
        .column(Column::auto().at_least(80.0))
        .column(Column::remainder())
        .max_scroll_height(240.0)
        .header(18.0, |mut header| {
            header.col(|ui| {
                ui.strong("feature");
            });
            header.col(|ui| {
                ui.strong("value");
            });
        })
        .body(|body| {
            body.rows(16.0, FEATURE_COUNT, |mut row| {
                let i = row.index();
                row.col(|ui| {
                    ui.label(&state.bundle.feature_names[i]);
                });
                row.col(|ui| {
                    ui.label(format!("{:.4}", sample.features[i]));
                });
            });
        });
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Open bundle…").clicked() {
                open_bundle_dialog(state);
                ui.close_menu();
            }
        });

        ui.separator();

        ui.label(format!(
            "{} samples · {} features",
            state.bundle.len(),
            state.bundle.feature_names.len()
        ));

        ui.separator();

        if let Some(msg) = &state.status_message {
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });
}

// ---------------------------------------------------------------------------
// Bundle dialog
// ---------------------------------------------------------------------------

/// Point the running session at a different artifact directory. A failed
/// load keeps the current bundle and surfaces the error in the top bar.
pub fn open_bundle_dialog(state: &mut AppState) {
    let folder = rfd::FileDialog::new()
        .set_title("Open artifact bundle")
        .pick_folder();

    if let Some(dir) = folder {
        match crate::data::loader::load_bundle(&dir) {
            Ok(bundle) => {
                state.set_bundle(bundle);
            }
            Err(e) => {
                log::error!("failed to load bundle: {e}");
                state.status_message = Some(format!("Error: {e}"));
            }
        }
    }
}

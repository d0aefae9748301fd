use eframe::egui::{self, Color32, RichText, Ui};
use egui_plot::{Bar, BarChart, Legend, Plot};

use crate::data::bundle::AXIAL_RANGE;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Central panel: feature histogram + prediction report
// ---------------------------------------------------------------------------

pub fn central_panel(ui: &mut Ui, state: &AppState) {
    // Reserve room below the chart for the report block.
    let report_height = if state.report.is_some() { 150.0 } else { 40.0 };
    let plot_height = (ui.available_height() - report_height).max(160.0);

    feature_histogram(ui, state, plot_height);
    report_section(ui, state);
}

/// Bar histogram of the selected sample's directional features. Both
/// segments keep their global bin positions (bone 0..=240, air 241..=383)
/// so the series sit side by side on one axis instead of overlapping.
fn feature_histogram(ui: &mut Ui, state: &AppState, height: f32) {
    let segments = match state.bundle.segments(state.selection.current()) {
        Ok(s) => s,
        Err(e) => {
            ui.label(RichText::new(e.to_string()).color(Color32::RED));
            return;
        }
    };

    let bone: Vec<Bar> = segments
        .bone_bars()
        .map(|(pos, value)| Bar::new(pos as f64, value).width(1.0))
        .collect();
    let air: Vec<Bar> = segments
        .air_bars()
        .map(|(pos, value)| Bar::new(pos as f64, value).width(1.0))
        .collect();

    Plot::new("feature_histogram")
        .legend(Legend::default())
        .x_axis_label("Direction bin (spread around the slice)")
        .y_axis_label("Feature value")
        .height(height)
        .allow_boxed_zoom(true)
        .allow_drag(true)
        .allow_scroll(true)
        .allow_zoom(true)
        .show(ui, |plot_ui| {
            plot_ui.bar_chart(
                BarChart::new(bone)
                    .name("Bone (density)")
                    .color(state.palette.bone),
            );
            plot_ui.bar_chart(
                BarChart::new(air)
                    .name("Air (presence)")
                    .color(state.palette.air),
            );
        });
}

fn report_section(ui: &mut Ui, state: &AppState) {
    ui.add_space(6.0);

    let Some(report) = &state.report else {
        ui.label("Pick a sample and run the prediction to see the model's estimate.");
        return;
    };

    ui.separator();
    ui.columns(3, |cols: &mut [Ui]| {
        metric_tile(&mut cols[0], "Predicted position", report.predicted);
        metric_tile(&mut cols[1], "Actual position", report.actual);
        metric_tile(&mut cols[2], "Absolute error", report.absolute_error);
    });

    ui.add_space(6.0);
    ui.strong("Estimated position along the body");
    ui.add(
        egui::ProgressBar::new(report.gauge_fraction as f32)
            .fill(state.palette.gauge)
            .text(format!(
                "{:.1} / {AXIAL_RANGE:.0}  (head → feet)",
                report.predicted
            )),
    );
}

fn metric_tile(ui: &mut Ui, label: &str, value: f64) {
    ui.vertical_centered(|ui: &mut Ui| {
        ui.label(label);
        ui.label(RichText::new(format!("{value:.2}")).size(22.0).strong());
    });
}

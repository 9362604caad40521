use std::path::Path;

use anyhow::{Context, Result};
use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};
use telemarketing_analysis::prelude::*;

use crate::state::{AppState, ChartKind};

// ---------------------------------------------------------------------------
// Left side panel – filter form
// ---------------------------------------------------------------------------

/// Render the left filter panel. Edits only take effect on "Apply".
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Filters");
    ui.separator();

    if state.session.is_none() {
        ui.label("No dataset loaded.");
        return;
    }

    let mut submitted = false;

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            let form = &mut state.form;

            // ---- Chart type ----
            ui.strong("Chart type");
            ui.horizontal(|ui: &mut Ui| {
                ui.radio_value(&mut form.chart_kind, ChartKind::Bars, "Bars");
                ui.radio_value(&mut form.chart_kind, ChartKind::Pie, "Pie");
            });
            ui.separator();

            // ---- Age range ----
            ui.strong("Age");
            let (lo, hi) = form.age_bounds;
            ui.horizontal(|ui: &mut Ui| {
                ui.label("from");
                ui.add(
                    egui::DragValue::new(&mut form.age_range.0)
                        .range(lo..=hi)
                        .speed(1.0),
                );
                ui.label("to");
                ui.add(
                    egui::DragValue::new(&mut form.age_range.1)
                        .range(lo..=hi)
                        .speed(1.0),
                );
            });
            ui.separator();

            // ---- Per-column multi-selects (collapsible) ----
            for picks in &mut form.columns {
                let header_text = if picks.all {
                    format!("{}  (all)", picks.column)
                } else {
                    format!(
                        "{}  ({}/{})",
                        picks.column,
                        picks.picked.len(),
                        picks.options.len()
                    )
                };

                egui::CollapsingHeader::new(RichText::new(header_text).strong())
                    .id_salt(&picks.column)
                    .default_open(false)
                    .show(ui, |ui: &mut Ui| {
                        ui.checkbox(&mut picks.all, "all");
                        ui.add_enabled_ui(!picks.all, |ui: &mut Ui| {
                            for val in &picks.options {
                                let mut checked = picks.picked.contains(val);
                                if ui.checkbox(&mut checked, val.to_string()).changed() {
                                    if checked {
                                        picks.picked.insert(val.clone());
                                    } else {
                                        picks.picked.remove(val);
                                    }
                                }
                            }
                        });
                    });
            }

            ui.add_space(8.0);
            submitted = ui.button("Apply").clicked();
        });

    if submitted {
        state.apply_filters();
    }
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Open…").clicked() {
                open_file_dialog(state);
                ui.close_menu();
            }
        });

        ui.separator();

        if let Some(session) = &state.session {
            ui.label(format!(
                "{} rows loaded, {} after filters",
                session.raw().len(),
                session.analysis().filtered.len()
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

pub fn open_file_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Open bank marketing data")
        .add_filter("Supported files", &["csv", "xlsx"])
        .add_filter("CSV (; separated)", &["csv"])
        .add_filter("Excel workbook", &["xlsx"])
        .pick_file();

    if let Some(path) = file {
        if let Err(e) = open_session(state, &path) {
            log::error!("Failed to load file: {e:#}");
            state.status_message = Some(format!("Error: {e:#}"));
        }
    }
}

fn open_session(state: &mut AppState, path: &Path) -> Result<()> {
    let bytes = std::fs::read(path).with_context(|| format!("reading {}", path.display()))?;
    state
        .open_upload(&bytes)
        .with_context(|| format!("loading {}", path.display()))
}

/// Ask for a destination and write one proportion table there.
pub fn save_download(state: &mut AppState, kind: SummaryKind) {
    let Some(session) = state.session.as_mut() else {
        return;
    };
    let download = match session.download(kind, ExportFormat::Xlsx) {
        Ok(d) => d,
        Err(e) => {
            log::error!("Failed to export: {e}");
            state.status_message = Some(format!("Error: {e}"));
            return;
        }
    };

    let target = rfd::FileDialog::new()
        .set_title("Save proportions")
        .set_file_name(&download.file_name)
        .add_filter("Excel workbook", &["xlsx"])
        .save_file();

    if let Some(path) = target {
        if let Err(e) = write_download(&path, &download) {
            log::error!("Failed to save download: {e:#}");
            state.status_message = Some(format!("Error: {e:#}"));
        }
    }
}

fn write_download(path: &Path, download: &Download) -> Result<()> {
    std::fs::write(path, &download.payload.bytes)
        .with_context(|| format!("writing {}", path.display()))?;
    log::info!("Saved {} to {}", download.file_name, path.display());
    Ok(())
}

use eframe::egui::{self, Ui};
use egui_extras::{Column, TableBuilder};
use telemarketing_analysis::prelude::{ProportionSummary, Table};

const ROW_HEIGHT: f32 = 18.0;

/// Scrollable preview of the first `max_rows` rows of a table.
pub fn table_preview(ui: &mut Ui, id: &str, table: &Table, max_rows: usize) {
    let preview = table.head(max_rows);
    let columns = preview.columns();

    ui.push_id(id, |ui: &mut Ui| {
        egui::ScrollArea::horizontal().show(ui, |ui: &mut Ui| {
            TableBuilder::new(ui)
                .striped(true)
                .max_scroll_height(320.0)
                .columns(Column::auto().at_least(48.0), columns.len())
                .header(ROW_HEIGHT + 2.0, |mut header| {
                    for name in columns {
                        header.col(|ui: &mut Ui| {
                            ui.strong(name);
                        });
                    }
                })
                .body(|body| {
                    body.rows(ROW_HEIGHT, preview.len(), |mut row| {
                        let cells = &preview.rows()[row.index()];
                        for cell in cells {
                            row.col(|ui: &mut Ui| {
                                ui.label(cell.to_string());
                            });
                        }
                    });
                });
        });
    });
    ui.label(format!("showing {} of {} rows", preview.len(), table.len()));
}

/// Two-column grid of category and percentage.
pub fn proportion_table(ui: &mut Ui, id: &str, summary: &ProportionSummary) {
    egui::Grid::new(id)
        .striped(true)
        .num_columns(2)
        .show(ui, |ui: &mut Ui| {
            ui.strong(&summary.column);
            ui.strong("%");
            ui.end_row();
            for (label, percent) in summary.display_rows() {
                ui.label(label);
                ui.label(percent);
                ui.end_row();
            }
        });
}

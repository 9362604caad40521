use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};
use telemarketing_analysis::prelude::SummaryKind;

use crate::state::AppState;
use crate::ui::{panels, plot, tables};

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

#[derive(Default)]
pub struct TelemarketingApp {
    pub state: AppState,
}

impl eframe::App for TelemarketingApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // ---- Top panel: menu bar ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            panels::top_bar(ui, &mut self.state);
        });

        // ---- Left side panel: filter form ----
        egui::SidePanel::left("filter_panel")
            .default_width(240.0)
            .resizable(true)
            .show(ctx, |ui| {
                panels::side_panel(ui, &mut self.state);
            });

        // ---- Central panel: tables, proportions, charts ----
        egui::CentralPanel::default().show(ctx, |ui| {
            ScrollArea::vertical()
                .auto_shrink([false, false])
                .show(ui, |ui: &mut Ui| central(ui, &mut self.state));
        });
    }
}

fn central(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Telemarketing analysis");
    ui.separator();

    let Some(session) = &state.session else {
        ui.label("Open a `.csv` file (separated by `;`) or an `.xlsx` workbook  (File → Open…)");
        return;
    };
    let preview_rows = session.config().preview_rows;

    ui.heading("Before filters");
    tables::table_preview(ui, "raw_preview", session.raw(), preview_rows);
    ui.add_space(12.0);

    ui.heading("After filters");
    let analysis = session.analysis();
    if analysis.filtered.is_empty() {
        ui.label(
            RichText::new("No rows match the applied filters. Adjust the filters and try again.")
                .color(Color32::from_rgb(200, 120, 0)),
        );
    } else {
        tables::table_preview(ui, "filtered_preview", &analysis.filtered, preview_rows);
    }
    ui.add_space(12.0);
    ui.separator();

    ui.heading(format!(
        "Acceptance proportion ({})",
        session.config().target_column
    ));
    if analysis.proportions.fallback {
        ui.label(
            "Showing the original proportions because the filtered rows have no target values.",
        );
    }

    let mut download = None;
    ui.columns(2, |cols: &mut [Ui]| {
        cols[0].strong("Original proportions");
        tables::proportion_table(&mut cols[0], "raw_proportions", &analysis.proportions.raw);
        if cols[0].button("📥 Download").clicked() {
            download = Some(SummaryKind::Raw);
        }

        cols[1].strong("Filtered proportions");
        tables::proportion_table(
            &mut cols[1],
            "filtered_proportions",
            &analysis.proportions.filtered,
        );
        if cols[1].button("📥 Download").clicked() {
            download = Some(SummaryKind::Filtered);
        }
    });
    ui.add_space(12.0);

    plot::proportion_charts(ui, state);

    if let Some(kind) = download {
        panels::save_download(state, kind);
    }
}

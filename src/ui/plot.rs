use std::f32::consts::TAU;

use eframe::egui::{Align2, Color32, FontId, Pos2, Sense, Shape, Stroke, Ui, Vec2};
use egui_plot::{Bar, BarChart, Legend, Plot, PlotPoint, Text};
use telemarketing_analysis::prelude::ProportionSummary;

use crate::color::ColorMap;
use crate::state::{AppState, ChartKind};

const CHART_HEIGHT: f32 = 260.0;

// ---------------------------------------------------------------------------
// Raw vs. filtered comparison (central panel)
// ---------------------------------------------------------------------------

/// Render the raw and filtered proportions side by side.
pub fn proportion_charts(ui: &mut Ui, state: &AppState) {
    let Some(session) = &state.session else {
        return;
    };
    let proportions = &session.analysis().proportions;
    let colors = state.color_map.as_ref();

    ui.columns(2, |cols: &mut [Ui]| {
        chart(
            &mut cols[0],
            "raw_chart",
            "Raw data",
            &proportions.raw,
            state.chart_kind,
            colors,
        );
        chart(
            &mut cols[1],
            "filtered_chart",
            "Filtered data",
            &proportions.filtered,
            state.chart_kind,
            colors,
        );
    });
}

fn chart(
    ui: &mut Ui,
    id: &str,
    title: &str,
    summary: &ProportionSummary,
    kind: ChartKind,
    colors: Option<&ColorMap>,
) {
    ui.vertical_centered(|ui: &mut Ui| {
        ui.strong(title);
    });
    let color_of = |i: usize| {
        let (value, _) = &summary.entries[i];
        colors.map_or(Color32::LIGHT_BLUE, |cm| cm.color_for(value))
    };
    match kind {
        ChartKind::Bars => bar_chart(ui, id, summary, color_of),
        ChartKind::Pie => pie_chart(ui, summary, color_of),
    }
}

fn bar_chart(
    ui: &mut Ui,
    id: &str,
    summary: &ProportionSummary,
    color_of: impl Fn(usize) -> Color32,
) {
    Plot::new(id)
        .height(CHART_HEIGHT)
        .legend(Legend::default())
        .y_axis_label("%")
        .include_y(0.0)
        .include_y(110.0)
        .show_x(false)
        .allow_drag(false)
        .allow_zoom(false)
        .allow_scroll(false)
        .allow_boxed_zoom(false)
        .show(ui, |plot_ui| {
            for (i, (value, percent)) in summary.entries.iter().enumerate() {
                let x = i as f64;
                let label = value.to_string();
                let bar = Bar::new(x, *percent).width(0.6).name(&label);
                plot_ui.bar_chart(BarChart::new(vec![bar]).color(color_of(i)).name(&label));
                plot_ui.text(Text::new(
                    PlotPoint::new(x, percent + 4.0),
                    format!("{percent:.2}"),
                ));
            }
        });
}

/// Painter-drawn pie with the percentage on each slice.
fn pie_chart(ui: &mut Ui, summary: &ProportionSummary, color_of: impl Fn(usize) -> Color32) {
    let size = CHART_HEIGHT.min(ui.available_width());
    let (response, painter) = ui.allocate_painter(Vec2::splat(size), Sense::hover());
    let center = response.rect.center();
    let radius = size * 0.42;

    let point_at = |angle: f32, r: f32| -> Pos2 {
        center + Vec2::new(angle.cos(), angle.sin()) * r
    };

    // Slices are drawn as fans of small wedges so every shape stays convex.
    let max_step = TAU / 64.0;
    let mut start = -TAU / 4.0;
    for (i, (value, percent)) in summary.entries.iter().enumerate() {
        let sweep = *percent as f32 / 100.0 * TAU;
        let steps = (sweep / max_step).ceil().max(1.0) as usize;
        let color = color_of(i);
        for s in 0..steps {
            let a0 = start + sweep * s as f32 / steps as f32;
            let a1 = start + sweep * (s + 1) as f32 / steps as f32;
            painter.add(Shape::convex_polygon(
                vec![center, point_at(a0, radius), point_at(a1, radius)],
                color,
                Stroke::NONE,
            ));
        }

        let mid = start + sweep / 2.0;
        painter.text(
            point_at(mid, radius * 0.6),
            Align2::CENTER_CENTER,
            format!("{percent:.2}"),
            FontId::proportional(13.0),
            Color32::BLACK,
        );
        painter.text(
            point_at(mid, radius * 1.12),
            Align2::CENTER_CENTER,
            value.to_string(),
            FontId::proportional(12.0),
            ui.visuals().text_color(),
        );
        start += sweep;
    }

    if summary.entries.is_empty() {
        painter.circle_stroke(center, radius, Stroke::new(1.0, Color32::GRAY));
    }
}

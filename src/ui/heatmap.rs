use eframe::egui::{self, Align2, FontId, Pos2, Rect, Sense, Stroke, Ui, Vec2};

use crate::color::Coolwarm;
use crate::data::correlation::CorrelationMatrix;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Correlation heatmap
// ---------------------------------------------------------------------------

const LABEL_WIDTH: f32 = 64.0;
const LABEL_HEIGHT: f32 = 24.0;
const MAX_CELL: f32 = 64.0;

/// Annotated heatmap of the correlation matrix.
pub fn correlation_section(ui: &mut Ui, state: &AppState) {
    ui.heading("Correlation Matrix of Air Quality");

    let Some(report) = &state.report else {
        return;
    };
    let matrix = &report.correlation;
    if matrix.is_empty() {
        ui.label("No numeric columns.");
        return;
    }

    let n = matrix.len() as f32;
    let cell = ((ui.available_width() - LABEL_WIDTH) / n).clamp(16.0, MAX_CELL);
    let size = Vec2::new(LABEL_WIDTH + cell * n, LABEL_HEIGHT + cell * n);
    let (response, painter) = ui.allocate_painter(size, Sense::hover());
    let origin = response.rect.min;

    let scale = Coolwarm::default();
    let label_font = FontId::proportional(12.0);
    let value_font = FontId::proportional((cell * 0.28).clamp(8.0, 13.0));
    let text_color = ui.visuals().text_color();

    for (i, name) in matrix.columns.iter().enumerate() {
        let offset = i as f32 * cell + cell / 2.0;
        painter.text(
            Pos2::new(origin.x + LABEL_WIDTH + offset, origin.y + LABEL_HEIGHT / 2.0),
            Align2::CENTER_CENTER,
            name,
            label_font.clone(),
            text_color,
        );
        painter.text(
            Pos2::new(origin.x + LABEL_WIDTH - 4.0, origin.y + LABEL_HEIGHT + offset),
            Align2::RIGHT_CENTER,
            name,
            label_font.clone(),
            text_color,
        );
    }

    for row in 0..matrix.len() {
        for col in 0..matrix.len() {
            let value = matrix.get(row, col);
            let min = Pos2::new(
                origin.x + LABEL_WIDTH + col as f32 * cell,
                origin.y + LABEL_HEIGHT + row as f32 * cell,
            );
            let rect = Rect::from_min_size(min, Vec2::splat(cell));
            painter.rect_filled(rect, 0.0, scale.color_for(value));
            painter.rect_stroke(
                rect,
                0.0,
                Stroke::new(0.5, ui.visuals().extreme_bg_color),
                egui::StrokeKind::Inside,
            );
            painter.text(
                rect.center(),
                Align2::CENTER_CENTER,
                annotation(value),
                value_font.clone(),
                scale.text_color_for(value),
            );
        }
    }

    if let Some(pos) = response.hover_pos() {
        if let Some((row, col)) = cell_at(pos, origin, cell, matrix) {
            response.on_hover_text(format!(
                "{} × {}: {}",
                matrix.columns[row],
                matrix.columns[col],
                annotation(matrix.get(row, col))
            ));
        }
    }
}

fn annotation(value: f64) -> String {
    if value.is_nan() {
        "nan".to_string()
    } else {
        format!("{value:.2}")
    }
}

fn cell_at(pos: Pos2, origin: Pos2, cell: f32, matrix: &CorrelationMatrix) -> Option<(usize, usize)> {
    let x = pos.x - origin.x - LABEL_WIDTH;
    let y = pos.y - origin.y - LABEL_HEIGHT;
    if x < 0.0 || y < 0.0 {
        return None;
    }
    let (row, col) = ((y / cell) as usize, (x / cell) as usize);
    (row < matrix.len() && col < matrix.len()).then_some((row, col))
}

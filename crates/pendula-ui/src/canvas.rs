use egui::{Color32, Pos2, Sense, Shape, Stroke, Ui, Vec2};
use pendula_core::glam::DVec2;
use pendula_core::{Primitive, Rgb, Stage, Viewport};

fn color(rgb: Rgb) -> Color32 {
    Color32::from_rgb(rgb.r(), rgb.g(), rgb.b())
}

/// Paint every visible primitive onto a black viewport-sized canvas.
pub(crate) fn paint(ui: &mut Ui, stage: &Stage, viewport: Viewport) {
    let size = Vec2::new(viewport.width as f32, viewport.height as f32);
    let (response, painter) = ui.allocate_painter(size, Sense::hover());
    painter.rect_filled(response.rect, 0.0, Color32::BLACK);

    let origin = response.rect.min;
    let at = |p: &DVec2| -> Pos2 { origin + Vec2::new(p.x as f32, p.y as f32) };

    for primitive in stage.visible() {
        match primitive {
            Primitive::Links {
                pivot,
                first,
                second,
                color: rgb,
                width,
            } => {
                let stroke = Stroke::new(*width, color(*rgb));
                painter.line_segment([at(pivot), at(first)], stroke);
                painter.line_segment([at(first), at(second)], stroke);
            }
            Primitive::Polyline {
                points,
                color: rgb,
                width,
            } if points.len() >= 2 => {
                let points: Vec<Pos2> = points.iter().map(at).collect();
                painter.add(Shape::line(points, Stroke::new(*width, color(*rgb))));
            }
            Primitive::Polyline { .. } => {}
        }
    }
}

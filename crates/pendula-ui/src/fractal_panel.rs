use std::time::Instant;

use egui::{ColorImage, Context, DragValue, TextureHandle, TextureOptions, Ui};
use pendula_core::{DataImage, FractalClient, RenderState};
use pendula_platform::Transport;
use tracing::{error, warn};

/// Mandelbrot controls plus the spinner/image pair.
pub(crate) struct FractalPanel {
    client: FractalClient,
    texture: Option<TextureHandle>,
    texture_generation: u64,
}

impl FractalPanel {
    pub(crate) fn new(client: FractalClient) -> Self {
        Self {
            client,
            texture: None,
            texture_generation: 0,
        }
    }

    pub(crate) fn client_mut(&mut self) -> &mut FractalClient {
        &mut self.client
    }

    pub(crate) fn show<T: Transport + ?Sized>(&mut self, ctx: &Context, ui: &mut Ui, transport: &mut T) {
        self.client.tick(Instant::now());

        let request = &mut self.client.request;
        egui::Grid::new("mandelbrot_bounds").num_columns(2).show(ui, |ui| {
            ui.label("real lower");
            ui.add(DragValue::new(&mut request.real_lower).speed(0.01));
            ui.end_row();
            ui.label("real upper");
            ui.add(DragValue::new(&mut request.real_upper).speed(0.01));
            ui.end_row();
            ui.label("imag lower");
            ui.add(DragValue::new(&mut request.imag_lower).speed(0.01));
            ui.end_row();
            ui.label("imag upper");
            ui.add(DragValue::new(&mut request.imag_upper).speed(0.01));
            ui.end_row();
            ui.label("x res");
            ui.add(DragValue::new(&mut request.x_res).range(1..=8192));
            ui.end_row();
            ui.label("y res");
            ui.add(DragValue::new(&mut request.y_res).range(1..=8192));
            ui.end_row();
            ui.label("iterations");
            ui.add(DragValue::new(&mut request.n_iter).range(1..=100_000));
            ui.end_row();
        });

        if ui.button("Render").clicked() {
            if let Err(e) = self.client.submit(transport, Instant::now()) {
                error!("UI: render request failed: {e}");
            }
        }

        if self.client.spinner_visible() {
            ui.add(egui::Spinner::new());
        } else if let Some(texture) = self.texture(ctx) {
            ui.add(egui::Image::new(&texture).shrink_to_fit());
        } else if let RenderState::Failed(reason) = self.client.state() {
            ui.colored_label(egui::Color32::LIGHT_RED, reason.as_str());
        }
    }

    fn texture(&mut self, ctx: &Context) -> Option<TextureHandle> {
        let image = self.client.image()?;
        if self.texture_generation != self.client.generation() {
            self.texture_generation = self.client.generation();
            self.texture = decode(image).map(|pixels| ctx.load_texture("mandelbrot", pixels, TextureOptions::default()));
        }
        self.texture.clone()
    }
}

fn decode(image: &DataImage) -> Option<ColorImage> {
    match image::load_from_memory(&image.bytes) {
        Ok(decoded) => {
            let rgba = decoded.to_rgba8();
            let size = [rgba.width() as usize, rgba.height() as usize];
            Some(ColorImage::from_rgba_unmultiplied(size, rgba.as_raw()))
        }
        Err(e) => {
            warn!("UI: cannot decode {} image: {e}", image.mime);
            None
        }
    }
}

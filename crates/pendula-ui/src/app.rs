use std::time::Duration;

use egui::{DragValue, Slider};
use pendula_core::{
    ClientConfig, ControlInput, FractalClient, Joint, ServerEvent, SyncLayer, Viewport, MAX_CHAINS, MIN_CHAINS,
};
use pendula_platform::Transport;
use tracing::{error, info, warn};

use crate::canvas;
use crate::fractal_panel::FractalPanel;

/// Inbound events are polled at this rate while nothing else repaints.
const POLL_PERIOD: Duration = Duration::from_millis(16);

pub struct PendulaApp {
    sync: SyncLayer<Box<dyn Transport>>,
    fractal: FractalPanel,
    viewport: Viewport,
    show_fractal: bool,
}

impl PendulaApp {
    pub fn new(config: &ClientConfig, transport: Box<dyn Transport>) -> Self {
        Self {
            sync: SyncLayer::new(config, transport),
            fractal: FractalPanel::new(FractalClient::new(&config.fractal)),
            viewport: config.viewport,
            show_fractal: false,
        }
    }

    fn process_inbound(&mut self) {
        let events = self.sync.transport_mut().drain();
        for event in events {
            match event {
                ServerEvent::Update(state) => {
                    if let Err(e) = self.sync.handle_update(state) {
                        warn!("UI: rejected state update: {e}");
                    }
                }
                ServerEvent::RenderedMandelbrot(image) => {
                    info!("UI: mandelbrot render delivered");
                    self.fractal.client_mut().complete(image);
                }
            }
        }
    }

    /// Read the widgets against the current snapshot; every change becomes
    /// one input.
    fn controls(&self, ui: &mut egui::Ui) -> Vec<ControlInput> {
        let snapshot = *self.sync.snapshot();
        let mut inputs = Vec::new();

        if ui.button(snapshot.button_label()).clicked() {
            inputs.push(ControlInput::TogglePlay);
        }

        let mut trails = snapshot.trail_enabled;
        if ui.checkbox(&mut trails, "Draw trail").changed() {
            inputs.push(ControlInput::SetTrails(trails));
        }

        let mut count = snapshot.chain_count;
        ui.horizontal(|ui| {
            ui.label("Pendula");
            if ui.add(DragValue::new(&mut count).range(MIN_CHAINS..=MAX_CHAINS)).changed() {
                inputs.push(ControlInput::SetChainCount(count));
            }
        });

        ui.separator();
        for (joint, label, base, delta) in [
            (Joint::First, "\u{3b8}\u{2081}", snapshot.base1, snapshot.delta1),
            (Joint::Second, "\u{3b8}\u{2082}", snapshot.base2, snapshot.delta2),
        ] {
            let mut base = base;
            if ui.add(Slider::new(&mut base, 0.0..=360.0).text(label)).changed() {
                inputs.push(ControlInput::SetBase { joint, degrees: base });
            }
            let mut delta = delta;
            ui.horizontal(|ui| {
                ui.label(format!("\u{394}{label}"));
                if ui.add(DragValue::new(&mut delta).speed(0.1).suffix("\u{b0}")).changed() {
                    inputs.push(ControlInput::SetDelta { joint, degrees: delta });
                }
            });
        }

        ui.separator();
        let frame = self
            .sync
            .last_frame()
            .map_or_else(|| "-".to_owned(), |index| index.to_string());
        ui.label(format!("server: {}  frame: {frame}", self.sync.status().label()));
        inputs
    }
}

impl eframe::App for PendulaApp {
    fn update(&mut self, context: &egui::Context, _frame: &mut eframe::Frame) {
        self.process_inbound();

        let mut inputs = Vec::new();
        let mut show_fractal = self.show_fractal;
        egui::SidePanel::left("controls").show(context, |ui| {
            inputs = self.controls(ui);
            ui.separator();
            ui.checkbox(&mut show_fractal, "Mandelbrot");
        });
        self.show_fractal = show_fractal;
        for input in inputs {
            if let Err(e) = self.sync.apply(input) {
                error!("UI: {input:?} failed: {e}");
            }
        }

        egui::CentralPanel::default().show(context, |ui| {
            canvas::paint(ui, self.sync.stage(), self.viewport);
        });

        if self.show_fractal {
            let mut open = true;
            egui::Window::new("Mandelbrot").open(&mut open).show(context, |ui| {
                self.fractal.show(context, ui, self.sync.transport_mut());
            });
            self.show_fractal = open;
        }

        context.request_repaint_after(POLL_PERIOD);
    }
}

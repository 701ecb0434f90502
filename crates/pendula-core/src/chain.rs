//! One double pendulum: angles, derived geometry, trail, and its two stage
//! primitives.

use crate::config::ChainConfig;
use crate::geometry::{endpoints, Endpoints, Viewport};
use crate::palette::{chain_color, Rgb};
use crate::stage::{Primitive, PrimitiveId, Stage};
use crate::trail::TrailBuffer;

#[derive(Debug)]
pub struct Chain {
    index: usize,
    theta1: f64,
    theta2: f64,
    length1: f64,
    length2: f64,
    link_width: f32,
    trail_width: f32,
    viewport: Viewport,
    endpoints: Endpoints,
    trail: TrailBuffer,
    links: PrimitiveId,
    trail_line: PrimitiveId,
}

impl Chain {
    /// Allocates the chain's primitives on `stage`. Nothing is visible until
    /// the first `draw`.
    pub fn new(index: usize, config: &ChainConfig, viewport: Viewport, stage: &mut Stage) -> Self {
        Self {
            index,
            theta1: 0.0,
            theta2: 0.0,
            length1: config.length1,
            length2: config.length2,
            link_width: config.link_width,
            trail_width: config.trail_width,
            viewport,
            endpoints: endpoints(0.0, 0.0, config.length1, config.length2, viewport),
            trail: TrailBuffer::new(),
            links: stage.allocate(),
            trail_line: stage.allocate(),
        }
    }

    /// Set angles and recompute geometry. The far tip joins the trail only
    /// while trails are enabled.
    pub fn update(&mut self, theta1: f64, theta2: f64, trails: bool) {
        self.theta1 = theta1;
        self.theta2 = theta2;
        self.recompute();
        if trails {
            self.trail.push(self.endpoints.second);
        }
    }

    pub fn draw(&mut self, stage: &mut Stage, trails: bool) {
        self.recompute();
        stage.set(
            self.links,
            Primitive::Links {
                pivot: self.viewport.pivot(),
                first: self.endpoints.first,
                second: self.endpoints.second,
                color: Rgb::WHITE,
                width: self.link_width,
            },
        );

        if trails {
            stage.set(
                self.trail_line,
                Primitive::Polyline {
                    points: self.trail.iter().copied().collect(),
                    color: self.color(),
                    width: self.trail_width,
                },
            );
        } else {
            stage.hide(self.trail_line);
            self.trail.clear();
        }
    }

    /// Remove every primitive this chain owns from the stage.
    pub fn destroy(self, stage: &mut Stage) {
        stage.release(self.links);
        stage.release(self.trail_line);
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn angles(&self) -> (f64, f64) {
        (self.theta1, self.theta2)
    }

    pub fn endpoints(&self) -> Endpoints {
        self.endpoints
    }

    pub fn trail(&self) -> &TrailBuffer {
        &self.trail
    }

    pub fn color(&self) -> Rgb {
        chain_color(self.index)
    }

    fn recompute(&mut self) {
        self.endpoints = endpoints(self.theta1, self.theta2, self.length1, self.length2, self.viewport);
    }
}

//! Joint angles to screen-space endpoints.

use glam::DVec2;
use serde::{Deserialize, Serialize};

/// Fixed drawing area. The pivot sits at its center.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            width: 500.0,
            height: 500.0,
        }
    }
}

impl Viewport {
    pub fn pivot(&self) -> DVec2 {
        DVec2::new(self.width / 2.0, self.height / 2.0)
    }
}

/// Far ends of the two links of one chain, in screen space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Endpoints {
    pub first: DVec2,
    pub second: DVec2,
}

/// Angles are measured from the vertical. Computed in a y-up frame centered
/// on the pivot, then flipped to screen space (y down).
pub fn endpoints(theta1: f64, theta2: f64, length1: f64, length2: f64, viewport: Viewport) -> Endpoints {
    let x1 = viewport.width / 2.0 + length1 * theta1.sin();
    let y1 = viewport.height / 2.0 - length1 * theta1.cos();
    let x2 = x1 + length2 * theta2.sin();
    let y2 = y1 - length2 * theta2.cos();

    Endpoints {
        first: DVec2::new(x1, viewport.height - y1),
        second: DVec2::new(x2, viewport.height - y2),
    }
}

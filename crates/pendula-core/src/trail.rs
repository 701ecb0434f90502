//! Bounded history of a chain's far endpoint.

use std::collections::VecDeque;

use glam::DVec2;

/// Hard capacity of every trail.
pub const MAX_TRAIL: usize = 500;

#[derive(Debug, Clone, Default)]
pub struct TrailBuffer {
    points: VecDeque<DVec2>,
}

impl TrailBuffer {
    pub fn new() -> Self {
        Self {
            points: VecDeque::with_capacity(MAX_TRAIL + 1),
        }
    }

    /// Append, evicting the oldest point once over capacity.
    pub fn push(&mut self, point: DVec2) {
        self.points.push_back(point);
        if self.points.len() > MAX_TRAIL {
            self.points.pop_front();
        }
    }

    pub fn clear(&mut self) {
        self.points.clear();
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Oldest first.
    pub fn iter(&self) -> impl Iterator<Item = &DVec2> + '_ {
        self.points.iter()
    }

    pub fn newest(&self) -> Option<DVec2> {
        self.points.back().copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overflow_evicts_oldest_point() {
        let mut trail = TrailBuffer::new();
        for i in 0..=MAX_TRAIL {
            trail.push(DVec2::new(i as f64, 0.0));
        }

        assert_eq!(trail.len(), MAX_TRAIL);
        assert!(trail.iter().all(|p| p.x != 0.0));
        assert_eq!(trail.iter().next().map(|p| p.x), Some(1.0));
        assert_eq!(trail.newest(), Some(DVec2::new(MAX_TRAIL as f64, 0.0)));
    }

    #[test]
    fn clear_empties_buffer() {
        let mut trail = TrailBuffer::new();
        trail.push(DVec2::ONE);
        trail.push(DVec2::ZERO);
        trail.clear();
        assert!(trail.is_empty());
        assert_eq!(trail.newest(), None);
    }
}

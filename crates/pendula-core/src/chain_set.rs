//! Ordered, exclusively owned collection of chains.

use pendula_platform::AngleState;
use tracing::{debug, info};

use crate::chain::Chain;
use crate::config::ChainConfig;
use crate::error::SyncError;
use crate::geometry::Viewport;
use crate::stage::Stage;

pub const MIN_CHAINS: usize = 1;
pub const MAX_CHAINS: usize = 10;

pub fn clamp_chain_count(requested: usize) -> usize {
    requested.clamp(MIN_CHAINS, MAX_CHAINS)
}

/// Fan of `n` angles: `base`, `base + delta`, `base + 2 * delta`, ...
/// Accumulated step by step so chain `i` is exactly chain `i - 1` plus
/// `delta`.
pub fn cascade(base: f64, delta: f64, n: usize) -> Vec<f64> {
    let mut angles = Vec::with_capacity(n);
    let mut current = base;
    for i in 0..n {
        if i > 0 {
            current += delta;
        }
        angles.push(current);
    }
    angles
}

/// Arena of chains indexed by position. `chains[i].index() == i` always.
#[derive(Debug)]
pub struct ChainSet {
    chains: Vec<Chain>,
    config: ChainConfig,
    viewport: Viewport,
}

impl ChainSet {
    pub fn new(config: ChainConfig, viewport: Viewport) -> Self {
        Self {
            chains: Vec::new(),
            config,
            viewport,
        }
    }

    /// Destroy every chain, then build one per entry of `initial` (at most
    /// [`MAX_CHAINS`]) and draw it.
    pub fn rebuild(&mut self, stage: &mut Stage, initial: &AngleState, trails: bool) {
        for chain in self.chains.drain(..) {
            chain.destroy(stage);
        }

        let count = initial.len().min(MAX_CHAINS);
        for index in 0..count {
            let mut chain = Chain::new(index, &self.config, self.viewport, stage);
            if let Some((theta1, theta2)) = initial.get(index) {
                chain.update(theta1, theta2, trails);
            }
            chain.draw(stage, trails);
            self.chains.push(chain);
        }
        info!("rebuilt chain set with {count} chains");
    }

    /// Apply an authoritative state to every live chain. A state shorter than
    /// the live set is rejected before any chain is touched.
    pub fn apply(&mut self, stage: &mut Stage, state: &AngleState, trails: bool) -> Result<(), SyncError> {
        if state.len() < self.chains.len() {
            return Err(SyncError::ShortState {
                chains: self.chains.len(),
                theta_1: state.theta_1.len(),
                theta_2: state.theta_2.len(),
            });
        }
        for (chain, (theta1, theta2)) in self
            .chains
            .iter_mut()
            .zip(state.theta_1.iter().zip(state.theta_2.iter()))
        {
            chain.update(*theta1, *theta2, trails);
            chain.draw(stage, trails);
        }
        debug!("applied state to {} chains", self.chains.len());
        Ok(())
    }

    pub fn redraw(&mut self, stage: &mut Stage, trails: bool) {
        for chain in &mut self.chains {
            chain.draw(stage, trails);
        }
    }

    /// Current angles of every live chain.
    pub fn angles(&self) -> AngleState {
        let (theta_1, theta_2): (Vec<f64>, Vec<f64>) = self.chains.iter().map(Chain::angles).unzip();
        AngleState::new(theta_1, theta_2)
    }

    pub fn len(&self) -> usize {
        self.chains.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chains.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Chain> {
        self.chains.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Chain> + '_ {
        self.chains.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set() -> ChainSet {
        ChainSet::new(ChainConfig::default(), Viewport::default())
    }

    fn uniform(n: usize) -> AngleState {
        AngleState::new(cascade(0.0, 0.1, n), cascade(0.5, 0.1, n))
    }

    #[test]
    fn cascade_steps_by_delta() {
        let angles = cascade(10f64.to_radians(), 5f64.to_radians(), 3);
        let degrees: Vec<f64> = angles.iter().map(|a| a.to_degrees()).collect();
        for (got, want) in degrees.iter().zip([10.0, 15.0, 20.0]) {
            assert!((got - want).abs() < 1e-9, "{got} != {want}");
        }
    }

    #[test]
    fn cascade_of_one_is_the_base() {
        assert_eq!(cascade(0.3, 9.0, 1), vec![0.3]);
        assert!(cascade(0.3, 9.0, 0).is_empty());
    }

    #[test]
    fn chain_count_is_clamped() {
        assert_eq!(clamp_chain_count(15), MAX_CHAINS);
        assert_eq!(clamp_chain_count(0), MIN_CHAINS);
        assert_eq!(clamp_chain_count(4), 4);
    }

    #[test]
    fn rebuild_indexes_chains_by_position() {
        let mut stage = Stage::new();
        let mut chains = set();
        chains.rebuild(&mut stage, &uniform(4), true);

        assert_eq!(chains.len(), 4);
        for (i, chain) in chains.iter().enumerate() {
            assert_eq!(chain.index(), i);
        }
        assert_eq!(chains.angles(), uniform(4));
    }

    #[test]
    fn rebuild_leaves_no_orphaned_primitives() {
        let mut stage = Stage::new();
        let mut chains = set();
        chains.rebuild(&mut stage, &uniform(6), true);
        chains.rebuild(&mut stage, &uniform(2), true);
        assert_eq!(stage.len(), 4);
        chains.rebuild(&mut stage, &uniform(3), false);
        assert_eq!(stage.len(), 6);
        assert_eq!(stage.visible().count(), 3);
    }

    #[test]
    fn short_state_is_rejected_without_side_effects() {
        let mut stage = Stage::new();
        let mut chains = set();
        chains.rebuild(&mut stage, &uniform(3), true);
        let before = chains.angles();

        let short = AngleState::new(vec![1.0, 2.0, 3.0], vec![1.0, 2.0]);
        let err = chains.apply(&mut stage, &short, true).unwrap_err();
        assert!(matches!(
            err,
            SyncError::ShortState {
                chains: 3,
                theta_1: 3,
                theta_2: 2
            }
        ));
        assert_eq!(chains.angles(), before);
    }

    #[test]
    fn longer_state_ignores_extra_entries() {
        let mut stage = Stage::new();
        let mut chains = set();
        chains.rebuild(&mut stage, &uniform(2), true);

        chains
            .apply(&mut stage, &AngleState::new(vec![1.0, 2.0, 3.0], vec![4.0, 5.0, 6.0]), true)
            .unwrap();
        assert_eq!(chains.angles(), AngleState::new(vec![1.0, 2.0], vec![4.0, 5.0]));
        assert_eq!(chains.get(1).map(|c| c.trail().len()), Some(2));
    }
}

//! Control/sync layer: reconciles user input, the play/pause state and
//! inbound simulator state.
//!
//! User input is reduced by [`plan`], a pure function from the current
//! [`ControlSnapshot`] to a [`Transition`]. [`SyncLayer::apply`] then carries
//! the transition out against the chain set and the transport. Inbound state
//! takes a separate path ([`SyncLayer::handle_update`]) that mutates render
//! state and the displayed slider values directly and never emits.

use pendula_platform::{AngleState, ClientEvent, Transport, TransportStatus};
use tracing::{debug, info};

use crate::chain_set::{cascade, clamp_chain_count, ChainSet};
use crate::config::ClientConfig;
use crate::error::SyncError;
use crate::stage::Stage;

/// Wrap degrees into `[0, 360)`.
pub fn normalize_degrees(degrees: f64) -> f64 {
    ((degrees % 360.0) + 360.0) % 360.0
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Joint {
    First,
    Second,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ControlInput {
    TogglePlay,
    SetBase { joint: Joint, degrees: f64 },
    SetDelta { joint: Joint, degrees: f64 },
    /// Raw request; clamped to the supported range.
    SetChainCount(usize),
    SetTrails(bool),
}

/// Every value the controls display. Angles are in degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ControlSnapshot {
    pub base1: f64,
    pub delta1: f64,
    pub base2: f64,
    pub delta2: f64,
    pub playing: bool,
    pub trail_enabled: bool,
    pub chain_count: usize,
}

impl Default for ControlSnapshot {
    fn default() -> Self {
        Self {
            base1: 0.0,
            delta1: 1.0,
            base2: 0.0,
            delta2: 1.0,
            playing: false,
            trail_enabled: true,
            chain_count: 1,
        }
    }
}

impl ControlSnapshot {
    /// Cascaded initial condition for `chain_count` chains, in radians.
    pub fn initial_angles(&self) -> AngleState {
        AngleState::new(
            cascade(self.base1.to_radians(), self.delta1.to_radians(), self.chain_count),
            cascade(self.base2.to_radians(), self.delta2.to_radians(), self.chain_count),
        )
    }

    pub fn button_label(&self) -> &'static str {
        if self.playing {
            "Stop"
        } else {
            "Play"
        }
    }

    fn with_base(mut self, joint: Joint, degrees: f64) -> Self {
        match joint {
            Joint::First => self.base1 = degrees,
            Joint::Second => self.base2 = degrees,
        }
        self
    }

    fn with_delta(mut self, joint: Joint, degrees: f64) -> Self {
        match joint {
            Joint::First => self.delta1 = degrees,
            Joint::Second => self.delta2 = degrees,
        }
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outbound {
    None,
    /// Initial condition gathered from the live chains.
    Play,
    Pause,
    /// Cascaded initial condition of the next snapshot.
    Update,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transition {
    pub next: ControlSnapshot,
    /// Emit a pause before anything else.
    pub pause_first: bool,
    pub rebuild: bool,
    pub redraw: bool,
    pub emit: Outbound,
}

impl Transition {
    fn to(next: ControlSnapshot) -> Self {
        Self {
            next,
            pause_first: false,
            rebuild: false,
            redraw: false,
            emit: Outbound::None,
        }
    }
}

pub fn plan(current: &ControlSnapshot, input: ControlInput) -> Transition {
    match input {
        ControlInput::TogglePlay => {
            let next = ControlSnapshot {
                playing: !current.playing,
                ..*current
            };
            Transition {
                emit: if current.playing { Outbound::Pause } else { Outbound::Play },
                ..Transition::to(next)
            }
        }
        ControlInput::SetBase { joint, degrees } => {
            edit_initial_condition(current, current.with_base(joint, degrees))
        }
        ControlInput::SetDelta { joint, degrees } => {
            edit_initial_condition(current, current.with_delta(joint, degrees))
        }
        ControlInput::SetChainCount(requested) => Transition {
            rebuild: true,
            ..Transition::to(ControlSnapshot {
                chain_count: clamp_chain_count(requested),
                ..*current
            })
        },
        ControlInput::SetTrails(enabled) => Transition {
            redraw: true,
            ..Transition::to(ControlSnapshot {
                trail_enabled: enabled,
                ..*current
            })
        },
    }
}

/// Editing the initial condition always lands paused.
fn edit_initial_condition(current: &ControlSnapshot, edited: ControlSnapshot) -> Transition {
    Transition {
        pause_first: current.playing,
        rebuild: true,
        emit: Outbound::Update,
        ..Transition::to(ControlSnapshot {
            playing: false,
            ..edited
        })
    }
}

/// Owns the chain set, its stage and the transport.
pub struct SyncLayer<T: Transport> {
    snapshot: ControlSnapshot,
    chains: ChainSet,
    stage: Stage,
    transport: T,
    apply_while_paused: bool,
    last_frame: Option<u64>,
}

impl<T: Transport> SyncLayer<T> {
    pub fn new(config: &ClientConfig, transport: T) -> Self {
        let snapshot = ControlSnapshot::default();
        let mut stage = Stage::new();
        let mut chains = ChainSet::new(config.chain.clone(), config.viewport);
        chains.rebuild(&mut stage, &snapshot.initial_angles(), snapshot.trail_enabled);
        Self {
            snapshot,
            chains,
            stage,
            transport,
            apply_while_paused: config.sync.apply_while_paused,
            last_frame: None,
        }
    }

    /// Commit the local transition, then emit. A send failure is returned
    /// but the local state stands.
    pub fn apply(&mut self, input: ControlInput) -> Result<(), SyncError> {
        let transition = plan(&self.snapshot, input);
        self.snapshot = transition.next;

        let trails = self.snapshot.trail_enabled;
        if transition.rebuild {
            self.chains.rebuild(&mut self.stage, &self.snapshot.initial_angles(), trails);
        }
        if transition.redraw {
            self.chains.redraw(&mut self.stage, trails);
        }

        if transition.pause_first {
            info!("initial condition edited while playing, pausing");
            self.transport.emit(ClientEvent::Pause)?;
        }
        match transition.emit {
            Outbound::None => {}
            Outbound::Play => {
                let initial = self.chains.angles();
                info!("play with {} chains", initial.len());
                self.transport.emit(ClientEvent::Play(initial))?;
            }
            Outbound::Pause => {
                info!("pause");
                self.transport.emit(ClientEvent::Pause)?;
            }
            Outbound::Update => {
                self.transport.emit(ClientEvent::Update(self.snapshot.initial_angles()))?;
            }
        }
        Ok(())
    }

    /// Apply authoritative state from the simulator and reflect chain 0 onto
    /// the base sliders.
    pub fn handle_update(&mut self, state: AngleState) -> Result<(), SyncError> {
        if !self.snapshot.playing && !self.apply_while_paused {
            debug!("dropping state update while paused");
            return Ok(());
        }
        self.chains
            .apply(&mut self.stage, &state, self.snapshot.trail_enabled)?;

        if let Some((theta1, theta2)) = state.get(0) {
            self.snapshot.base1 = normalize_degrees(theta1.to_degrees());
            self.snapshot.base2 = normalize_degrees(theta2.to_degrees());
        }
        if state.index.is_some() {
            self.last_frame = state.index;
        }
        Ok(())
    }

    pub fn snapshot(&self) -> &ControlSnapshot {
        &self.snapshot
    }

    pub fn chains(&self) -> &ChainSet {
        &self.chains
    }

    pub fn stage(&self) -> &Stage {
        &self.stage
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    pub fn status(&self) -> TransportStatus {
        self.transport.status()
    }

    /// Index of the last streamed frame that carried one.
    pub fn last_frame(&self) -> Option<u64> {
        self.last_frame
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pendula_platform::ServerEvent;

    #[derive(Default)]
    struct Recorder {
        sent: Vec<ClientEvent>,
    }

    impl Transport for Recorder {
        fn emit(&mut self, event: ClientEvent) -> pendula_platform::Result<()> {
            self.sent.push(event);
            Ok(())
        }

        fn drain(&mut self) -> Vec<ServerEvent> {
            Vec::new()
        }
    }

    fn layer() -> SyncLayer<Recorder> {
        SyncLayer::new(&ClientConfig::default(), Recorder::default())
    }

    fn names(layer: &SyncLayer<Recorder>) -> Vec<&'static str> {
        layer.transport().sent.iter().map(ClientEvent::name).collect()
    }

    #[test]
    fn normalize_wraps_into_one_turn() {
        assert!((normalize_degrees(-10.0) - 350.0).abs() < 1e-9);
        assert!((normalize_degrees(370.0) - 10.0).abs() < 1e-9);
        assert_eq!(normalize_degrees(0.0), 0.0);
        assert!((normalize_degrees(-720.5) - 359.5).abs() < 1e-9);
    }

    #[test]
    fn toggle_alternates_play_and_pause() {
        let paused = ControlSnapshot::default();
        let t = plan(&paused, ControlInput::TogglePlay);
        assert!(t.next.playing);
        assert_eq!(t.emit, Outbound::Play);
        assert_eq!(t.next.button_label(), "Stop");

        let t = plan(&t.next, ControlInput::TogglePlay);
        assert!(!t.next.playing);
        assert_eq!(t.emit, Outbound::Pause);
        assert_eq!(t.next.button_label(), "Play");
    }

    #[test]
    fn slider_edit_while_playing_pauses_first() {
        let playing = ControlSnapshot {
            playing: true,
            ..ControlSnapshot::default()
        };
        let t = plan(
            &playing,
            ControlInput::SetBase {
                joint: Joint::Second,
                degrees: 45.0,
            },
        );
        assert!(t.pause_first);
        assert!(t.rebuild);
        assert!(!t.next.playing);
        assert_eq!(t.next.base2, 45.0);
        assert_eq!(t.emit, Outbound::Update);
    }

    #[test]
    fn chain_count_edit_rebuilds_silently() {
        let t = plan(&ControlSnapshot::default(), ControlInput::SetChainCount(15));
        assert_eq!(t.next.chain_count, 10);
        assert!(t.rebuild);
        assert_eq!(t.emit, Outbound::None);
        assert!(!t.pause_first);
    }

    #[test]
    fn clamped_count_yields_ten_live_chains() {
        let mut layer = layer();
        layer.apply(ControlInput::SetChainCount(15)).unwrap();
        assert_eq!(layer.chains().len(), 10);
        let indices: Vec<usize> = layer.chains().iter().map(|c| c.index()).collect();
        assert_eq!(indices, (0..10).collect::<Vec<_>>());
        assert!(layer.transport().sent.is_empty());
    }

    #[test]
    fn delta_edit_emits_full_cascade() {
        let mut layer = layer();
        layer.apply(ControlInput::SetChainCount(3)).unwrap();
        layer
            .apply(ControlInput::SetBase {
                joint: Joint::First,
                degrees: 10.0,
            })
            .unwrap();
        layer
            .apply(ControlInput::SetDelta {
                joint: Joint::First,
                degrees: 5.0,
            })
            .unwrap();

        match layer.transport().sent.last() {
            Some(ClientEvent::Update(state)) => {
                let degrees: Vec<f64> = state.theta_1.iter().map(|a| a.to_degrees()).collect();
                assert_eq!(degrees.len(), 3);
                for (got, want) in degrees.iter().zip([10.0, 15.0, 20.0]) {
                    assert!((got - want).abs() < 1e-9);
                }
            }
            other => panic!("expected update, got {other:?}"),
        }
        assert_eq!(layer.chains().angles(), layer.snapshot().initial_angles());
    }

    #[test]
    fn implicit_pause_precedes_update() {
        let mut layer = layer();
        layer.apply(ControlInput::TogglePlay).unwrap();
        layer
            .apply(ControlInput::SetDelta {
                joint: Joint::Second,
                degrees: 3.0,
            })
            .unwrap();
        assert_eq!(names(&layer), vec!["play", "pause", "update"]);
        assert!(!layer.snapshot().playing);
    }

    struct Offline;

    impl Transport for Offline {
        fn emit(&mut self, _event: ClientEvent) -> pendula_platform::Result<()> {
            Err(pendula_platform::PlatformError::Closed)
        }

        fn drain(&mut self) -> Vec<ServerEvent> {
            Vec::new()
        }
    }

    #[test]
    fn failed_send_keeps_local_transition() {
        let mut layer = SyncLayer::new(&ClientConfig::default(), Offline);

        let result = layer.apply(ControlInput::TogglePlay);
        assert!(matches!(result, Err(SyncError::Transport(_))));
        assert!(layer.snapshot().playing);

        let result = layer.apply(ControlInput::SetBase {
            joint: Joint::First,
            degrees: 45.0,
        });
        assert!(matches!(result, Err(SyncError::Transport(_))));
        assert!(!layer.snapshot().playing);
        assert_eq!(layer.snapshot().base1, 45.0);
        assert_eq!(layer.snapshot().button_label(), "Play");
        assert_eq!(layer.chains().get(0).map(|c| c.angles()), Some((45f64.to_radians(), 0.0)));
    }

    #[test]
    fn inbound_update_reflects_sliders_without_emitting() {
        let mut layer = layer();
        layer
            .handle_update(AngleState {
                theta_1: vec![(-10f64).to_radians()],
                theta_2: vec![370f64.to_radians()],
                index: Some(7),
            })
            .unwrap();

        assert!((layer.snapshot().base1 - 350.0).abs() < 1e-9);
        assert!((layer.snapshot().base2 - 10.0).abs() < 1e-9);
        assert_eq!(layer.last_frame(), Some(7));
        assert!(layer.transport().sent.is_empty());
    }

    #[test]
    fn short_inbound_state_is_rejected() {
        let mut layer = layer();
        layer.apply(ControlInput::SetChainCount(3)).unwrap();
        let before = *layer.snapshot();
        let result = layer.handle_update(AngleState::new(vec![0.5], vec![0.5]));
        assert!(matches!(result, Err(SyncError::ShortState { chains: 3, .. })));
        assert_eq!(*layer.snapshot(), before);
    }

    #[test]
    fn paused_updates_can_be_dropped() {
        let mut config = ClientConfig::default();
        config.sync.apply_while_paused = false;
        let mut layer = SyncLayer::new(&config, Recorder::default());

        layer.handle_update(AngleState::new(vec![1.0], vec![1.0])).unwrap();
        assert_eq!(layer.chains().angles(), AngleState::new(vec![0.0], vec![0.0]));

        layer.apply(ControlInput::TogglePlay).unwrap();
        layer.handle_update(AngleState::new(vec![1.0], vec![1.0])).unwrap();
        assert_eq!(layer.chains().angles(), AngleState::new(vec![1.0], vec![1.0]));
    }

    #[test]
    fn trail_toggle_discards_history() {
        let mut layer = layer();
        for step in 0..5 {
            let theta = f64::from(step) * 0.1;
            layer.handle_update(AngleState::new(vec![theta], vec![theta])).unwrap();
        }
        assert_eq!(layer.chains().get(0).map(|c| c.trail().len()), Some(6));

        layer.apply(ControlInput::SetTrails(false)).unwrap();
        layer.apply(ControlInput::SetTrails(true)).unwrap();
        assert_eq!(layer.chains().get(0).map(|c| c.trail().len()), Some(0));

        layer.handle_update(AngleState::new(vec![0.9], vec![0.9])).unwrap();
        assert_eq!(layer.chains().get(0).map(|c| c.trail().len()), Some(1));
    }
}

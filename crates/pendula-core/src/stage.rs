//! Display tree: an arena of graphical primitives owned by chains.
//!
//! A chain allocates its slots once, replaces their contents on every draw,
//! hides them when they should not render, and releases them on destroy.
//! Released slots are reused; ids carry a generation so a stale id never
//! touches the new occupant.

use glam::DVec2;

use crate::palette::Rgb;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PrimitiveId {
    slot: u32,
    generation: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Primitive {
    /// Two rigid links: pivot to `first`, `first` to `second`.
    Links {
        pivot: DVec2,
        first: DVec2,
        second: DVec2,
        color: Rgb,
        width: f32,
    },
    /// Connected polyline through `points`, oldest first.
    Polyline {
        points: Vec<DVec2>,
        color: Rgb,
        width: f32,
    },
}

#[derive(Debug, Default)]
struct Slot {
    generation: u32,
    occupied: bool,
    content: Option<Primitive>,
}

#[derive(Debug, Default)]
pub struct Stage {
    slots: Vec<Slot>,
    free: Vec<u32>,
}

impl Stage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reserve a slot. It renders nothing until `set` is called.
    pub fn allocate(&mut self) -> PrimitiveId {
        if let Some(slot) = self.free.pop() {
            let entry = &mut self.slots[slot as usize];
            entry.occupied = true;
            entry.content = None;
            return PrimitiveId {
                slot,
                generation: entry.generation,
            };
        }
        let slot = self.slots.len() as u32;
        self.slots.push(Slot {
            generation: 0,
            occupied: true,
            content: None,
        });
        PrimitiveId { slot, generation: 0 }
    }

    pub fn set(&mut self, id: PrimitiveId, primitive: Primitive) {
        if let Some(entry) = self.entry_mut(id) {
            entry.content = Some(primitive);
        }
    }

    /// Detach from rendering but keep the slot reserved.
    pub fn hide(&mut self, id: PrimitiveId) {
        if let Some(entry) = self.entry_mut(id) {
            entry.content = None;
        }
    }

    pub fn release(&mut self, id: PrimitiveId) {
        if let Some(entry) = self.entry_mut(id) {
            entry.occupied = false;
            entry.content = None;
            entry.generation = entry.generation.wrapping_add(1);
            self.free.push(id.slot);
        }
    }

    pub fn get(&self, id: PrimitiveId) -> Option<&Primitive> {
        self.slots
            .get(id.slot as usize)
            .filter(|entry| entry.occupied && entry.generation == id.generation)
            .and_then(|entry| entry.content.as_ref())
    }

    /// Reserved slots, visible or not.
    pub fn len(&self) -> usize {
        self.slots.iter().filter(|entry| entry.occupied).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Primitives to paint, in slot order.
    pub fn visible(&self) -> impl Iterator<Item = &Primitive> + '_ {
        self.slots
            .iter()
            .filter(|entry| entry.occupied)
            .filter_map(|entry| entry.content.as_ref())
    }

    fn entry_mut(&mut self, id: PrimitiveId) -> Option<&mut Slot> {
        self.slots
            .get_mut(id.slot as usize)
            .filter(|entry| entry.occupied && entry.generation == id.generation)
    }
}

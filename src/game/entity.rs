//! Entity contract and storage
//!
//! Entities are boxed trait objects with *optional* operations: every hook
//! on the trait defaults to a no-op, so a static prop and a full controller
//! satisfy the same contract without any "does this method exist" checks.
//!
//! Ids are generational (index + generation). When a slot is reused the
//! generation increments, so a stale id held by anyone - an enemy's target
//! back-reference, a queued command - resolves to nothing instead of a
//! recycled entity.
//!
//! Mutating the collection from inside an update pass goes through the
//! `CommandQueue`, which the world flushes after the pass. That is what
//! makes "enemy removes itself while the list is being iterated" safe.

use std::any::Any;

use crate::hud::Hud;

use super::world::WorldContext;

/// A unique identifier for a world entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EntityId {
    index: u32,
    generation: u32,
}

impl EntityId {
    /// A null/invalid id, useful for "not yet added" fields.
    pub const NULL: EntityId = EntityId {
        index: u32::MAX,
        generation: 0,
    };

    pub fn is_null(&self) -> bool {
        self.index == u32::MAX
    }

    #[cfg(test)]
    pub(crate) fn for_tests(index: u32, generation: u32) -> Self {
        Self { index, generation }
    }
}

impl Default for EntityId {
    fn default() -> Self {
        EntityId::NULL
    }
}

/// Anything that participates in the per-frame update/render cycle.
///
/// All operations are optional; implement only what the entity needs.
pub trait Entity {
    /// Runs once when the entity joins the world. `id` is the entity's own
    /// handle; this is where renderables get attached.
    fn init(&mut self, id: EntityId, ctx: &mut WorldContext<'_>) {
        let _ = (id, ctx);
    }

    /// Runs every tick while the entity is in the world.
    fn update(&mut self, dt: f32, ctx: &mut WorldContext<'_>) {
        let _ = (dt, ctx);
    }

    /// Damage capability. Entities without one shrug hits off.
    fn take_damage(&mut self, amount: f32, hud: &mut Hud, commands: &mut CommandQueue) {
        let _ = (amount, hud, commands);
    }

    /// Score capability. Awarding points to an entity without one is a
    /// silent no-op.
    fn add_score(&mut self, points: u32, hud: &mut Hud) {
        let _ = (points, hud);
    }

    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

/// Deferred world mutations, applied after the update pass in push order.
#[derive(Debug, Clone, Copy)]
pub enum Command {
    /// Remove an entity plus everything it owns.
    Remove(EntityId),
    /// Invoke the target's score capability, if it has one.
    AwardScore(EntityId, u32),
}

#[derive(Default)]
pub struct CommandQueue {
    queued: Vec<Command>,
}

impl CommandQueue {
    pub fn new() -> Self {
        Self { queued: Vec::new() }
    }

    pub fn remove(&mut self, id: EntityId) {
        self.queued.push(Command::Remove(id));
    }

    pub fn award_score(&mut self, id: EntityId, points: u32) {
        self.queued.push(Command::AwardScore(id, points));
    }

    pub fn len(&self) -> usize {
        self.queued.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queued.is_empty()
    }

    pub(crate) fn drain(&mut self) -> Vec<Command> {
        std::mem::take(&mut self.queued)
    }
}

struct Slot {
    generation: u32,
    occupied: bool,
    /// `None` while the entity is checked out for its own update.
    entry: Option<Box<dyn Entity>>,
}

/// Insertion-ordered collection of entities.
///
/// During an update pass the entity being updated is taken out of its slot
/// and put back afterwards, so it can reach any *other* entity mutably
/// through the context without aliasing itself.
pub struct EntityStore {
    slots: Vec<Slot>,
    order: Vec<EntityId>,
    free: Vec<u32>,
}

impl EntityStore {
    pub fn new() -> Self {
        Self {
            slots: Vec::new(),
            order: Vec::new(),
            free: Vec::new(),
        }
    }

    /// Append an entity, reusing a freed slot if one is available.
    pub fn insert(&mut self, entity: Box<dyn Entity>) -> EntityId {
        let id = if let Some(index) = self.free.pop() {
            let slot = &mut self.slots[index as usize];
            slot.occupied = true;
            slot.entry = Some(entity);
            EntityId {
                index,
                generation: slot.generation,
            }
        } else {
            let index = self.slots.len() as u32;
            self.slots.push(Slot {
                generation: 0,
                occupied: true,
                entry: Some(entity),
            });
            EntityId {
                index,
                generation: 0,
            }
        };
        self.order.push(id);
        id
    }

    fn slot(&self, id: EntityId) -> Option<&Slot> {
        if id.is_null() {
            return None;
        }
        self.slots
            .get(id.index as usize)
            .filter(|s| s.occupied && s.generation == id.generation)
    }

    fn slot_mut(&mut self, id: EntityId) -> Option<&mut Slot> {
        if id.is_null() {
            return None;
        }
        self.slots
            .get_mut(id.index as usize)
            .filter(|s| s.occupied && s.generation == id.generation)
    }

    pub fn contains(&self, id: EntityId) -> bool {
        self.slot(id).is_some()
    }

    /// Check an entity out of its slot for the duration of its update.
    pub(crate) fn take(&mut self, id: EntityId) -> Option<Box<dyn Entity>> {
        self.slot_mut(id).and_then(|s| s.entry.take())
    }

    /// Return a checked-out entity. If the slot died in the meantime the
    /// entity is dropped.
    pub(crate) fn put_back(&mut self, id: EntityId, entity: Box<dyn Entity>) {
        if let Some(slot) = self.slot_mut(id) {
            slot.entry = Some(entity);
        }
    }

    /// Remove by identity. Unknown or stale ids are a silent no-op; returns
    /// whether the entity was a member.
    pub fn remove(&mut self, id: EntityId) -> bool {
        let Some(slot) = self.slot_mut(id) else {
            return false;
        };
        slot.occupied = false;
        slot.entry = None;
        slot.generation += 1;
        self.free.push(id.index);
        self.order.retain(|&e| e != id);
        true
    }

    /// Downcast access to a concrete entity type.
    pub fn get<T: 'static>(&self, id: EntityId) -> Option<&T> {
        self.slot(id)
            .and_then(|s| s.entry.as_ref())
            .and_then(|e| e.as_any().downcast_ref::<T>())
    }

    pub fn get_mut<T: 'static>(&mut self, id: EntityId) -> Option<&mut T> {
        self.slot_mut(id)
            .and_then(|s| s.entry.as_mut())
            .and_then(|e| e.as_any_mut().downcast_mut::<T>())
    }

    pub fn get_dyn_mut(&mut self, id: EntityId) -> Option<&mut dyn Entity> {
        self.slot_mut(id)
            .and_then(|s| s.entry.as_deref_mut().map(|e| e as &mut dyn Entity))
    }

    /// Snapshot of the current membership in insertion order.
    pub fn ids(&self) -> Vec<EntityId> {
        self.order.clone()
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

impl Default for EntityStore {
    fn default() -> Self {
        Self::new()
    }
}

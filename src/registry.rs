/// Entity registry: sole owner of every non-player entity.
///
/// Structural changes (`create`, `remove`) take `&mut self`, so the borrow
/// checker already forbids them while an iterator is alive.  Callers that
/// decide removals during a scan collect ids first and sweep afterwards.

use std::collections::BTreeMap;

use crate::entities::{Entity, EntityId, EntityKind, Position, VisualRef};

#[derive(Debug, Default)]
struct EntityIdAllocator {
    next: u64,
}

impl EntityIdAllocator {
    fn allocate(&mut self) -> EntityId {
        let id = EntityId(self.next);
        self.next = self.next.saturating_add(1);
        id
    }
}

#[derive(Debug, Default)]
pub struct Registry {
    allocator: EntityIdAllocator,
    // Id-ordered so that a seeded run replays identically.
    entities: BTreeMap<EntityId, Entity>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a new entity and return its fresh id.
    pub fn create(
        &mut self,
        position: Position,
        visual: Option<VisualRef>,
        kind: EntityKind,
    ) -> EntityId {
        let id = self.allocator.allocate();
        self.entities.insert(
            id,
            Entity {
                id,
                position,
                visual,
                kind,
            },
        );
        id
    }

    pub fn get(&self, id: EntityId) -> Option<&Entity> {
        self.entities.get(&id)
    }

    pub fn get_mut(&mut self, id: EntityId) -> Option<&mut Entity> {
        self.entities.get_mut(&id)
    }

    /// Idempotent: removing an absent id returns `None` and changes nothing.
    pub fn remove(&mut self, id: EntityId) -> Option<Entity> {
        self.entities.remove(&id)
    }

    /// Sweep phase of mark-and-sweep.  Returns the ids actually removed.
    pub fn remove_all(&mut self, ids: &[EntityId]) -> Vec<EntityId> {
        ids.iter()
            .copied()
            .filter(|id| self.entities.remove(id).is_some())
            .collect()
    }

    pub fn contains(&self, id: EntityId) -> bool {
        self.entities.contains_key(&id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Entity> {
        self.entities.values()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Entity> {
        self.entities.values_mut()
    }

    pub fn count(&self, predicate: impl Fn(&Entity) -> bool) -> usize {
        self.entities.values().filter(|e| predicate(*e)).count()
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }
}

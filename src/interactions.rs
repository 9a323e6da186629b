/// Proximity resolution between the player and registry entities.
///
/// One read-only scan decides everything; removals and explosion damage are
/// applied in a second pass once the scan is over.

use tracing::debug;

use crate::compute::World;
use crate::entities::{EntityId, EntityKind, FrameEvent, Position};

pub fn resolve_interactions(world: &mut World) -> Vec<FrameEvent> {
    let reach = world.config.interaction_reach_px;
    let now_ms = world.now_ms;
    let World {
        registry,
        player,
        anims,
        ..
    } = world;

    let mut events = Vec::new();
    let mut exploded: Vec<(EntityId, Position)> = Vec::new();
    let mut consumed: Vec<EntityId> = Vec::new();
    let mut defeated: Vec<EntityId> = Vec::new();

    for entity in registry.iter() {
        match &entity.kind {
            EntityKind::TemporaryObject(temp) if temp.is_expired(now_ms) => {
                exploded.push((entity.id, entity.position));
            }
            EntityKind::HealthPickup => {
                // Only a pickup that actually heals is consumed.
                if player.position().within_reach(entity.position, reach)
                    && player.health() < player.max_health()
                {
                    player.heal(1);
                    consumed.push(entity.id);
                    events.push(FrameEvent::PlayerHealed {
                        health: player.health(),
                    });
                }
            }
            EntityKind::Enemy(enemy) if enemy.should_be_removed => {
                defeated.push(entity.id);
            }
            _ => {}
        }
    }

    for (id, source) in exploded {
        if registry.remove(id).is_none() {
            continue;
        }
        if player.position().within_reach(source, reach) && player.take_hit(source, anims.as_mut()) {
            debug!(id = id.0, health = player.health(), "player caught in explosion");
            events.push(FrameEvent::PlayerDamaged {
                source,
                health: player.health(),
            });
        }
        events.push(FrameEvent::EntityRemoved { id });
    }

    for id in registry.remove_all(&consumed) {
        debug!(id = id.0, "health pickup consumed");
        events.push(FrameEvent::EntityRemoved { id });
    }

    for id in registry.remove_all(&defeated) {
        events.push(FrameEvent::EntityRemoved { id });
    }

    events
}

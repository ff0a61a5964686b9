//! Spatial Index
//!
//! Per-tick snapshot of every living entity, rebuilt at the start of the
//! tick before any behavior runs. Systems read other entities through the
//! snapshot instead of querying the world directly, so a system that
//! mutates its own entity never aliases another entity's components.
//! Cross-entity writes go through the effect buffer, never the snapshot.

use bevy_ecs::prelude::*;
use glam::Vec3;
use std::collections::HashMap;
use uuid::Uuid;

use crate::components::{
    Companion, Footprint, Look, Menace, OwnedBy, PlayerFlags, Position, StableId,
    Visibility, Vitals,
};

/// Read-only copy of one entity's observable state.
#[derive(Debug, Clone, Copy)]
pub struct EntitySnapshot {
    pub entity: Entity,
    pub id: Uuid,
    pub pos: Vec3,
    pub look: Vec3,
    pub width: f32,
    pub height: f32,
    pub health: f32,
    pub max_health: f32,
    pub alive: bool,
    pub hidden: bool,
    pub invulnerable: bool,
    /// Present for player-controlled entities: (crouching, sprinting).
    pub player: Option<(bool, bool)>,
    pub monster: bool,
    pub menace_target: Option<Uuid>,
    pub is_companion: bool,
    pub owner: Option<Uuid>,
}

impl EntitySnapshot {
    pub fn footprint(&self) -> Footprint {
        Footprint::new(self.width, self.height)
    }

    pub fn health_ratio(&self) -> f32 {
        if self.max_health <= 0.0 {
            0.0
        } else {
            (self.health / self.max_health).clamp(0.0, 1.0)
        }
    }
}

/// Snapshot of the whole world, keyed both by live handle and stable id.
#[derive(Resource, Debug, Default)]
pub struct SpatialIndex {
    entries: Vec<EntitySnapshot>,
    by_entity: HashMap<Entity, usize>,
    by_id: HashMap<Uuid, usize>,
}

impl SpatialIndex {
    pub fn clear(&mut self) {
        self.entries.clear();
        self.by_entity.clear();
        self.by_id.clear();
    }

    pub fn insert(&mut self, snap: EntitySnapshot) {
        let idx = self.entries.len();
        self.by_entity.insert(snap.entity, idx);
        self.by_id.insert(snap.id, idx);
        self.entries.push(snap);
    }

    pub fn get(&self, entity: Entity) -> Option<&EntitySnapshot> {
        self.by_entity.get(&entity).map(|&i| &self.entries[i])
    }

    pub fn get_id(&self, id: Uuid) -> Option<&EntitySnapshot> {
        self.by_id.get(&id).map(|&i| &self.entries[i])
    }

    /// All living entities within `radius` of `center`, excluding `except`.
    /// Iteration order follows insertion order, which follows the query
    /// order of the rebuild system, so results are deterministic.
    pub fn query_nearby(
        &self,
        center: Vec3,
        radius: f32,
        except: Entity,
    ) -> impl Iterator<Item = &EntitySnapshot> {
        let r2 = radius * radius;
        self.entries.iter().filter(move |s| {
            s.entity != except && s.alive && s.pos.distance_squared(center) <= r2
        })
    }

    pub fn iter(&self) -> impl Iterator<Item = &EntitySnapshot> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Rebuilds the snapshot from the live world. Runs first in the tick.
pub fn rebuild_spatial_index(
    mut index: ResMut<SpatialIndex>,
    query: Query<(
        Entity,
        &StableId,
        &Position,
        Option<&Look>,
        &Footprint,
        &Vitals,
        Option<&Visibility>,
        Option<&PlayerFlags>,
        Option<&Menace>,
        Option<&Companion>,
        Option<&OwnedBy>,
    )>,
) {
    index.clear();
    for (entity, id, pos, look, fp, vitals, vis, player, menace, companion, owned) in
        query.iter()
    {
        let vis = vis.copied().unwrap_or_default();
        index.insert(EntitySnapshot {
            entity,
            id: id.0,
            pos: pos.0,
            look: look.map(|l| l.0).unwrap_or(Vec3::Z),
            width: fp.width,
            height: fp.height,
            health: vitals.health,
            max_health: vitals.max_health,
            alive: vitals.alive,
            hidden: vis.hidden,
            invulnerable: vis.invulnerable,
            player: player.map(|p| (p.crouching, p.sprinting)),
            monster: menace.map(|m| m.monster).unwrap_or(false),
            menace_target: menace.and_then(|m| m.target),
            is_companion: companion.is_some(),
            owner: owned.map(|o| o.0),
        });
    }
}

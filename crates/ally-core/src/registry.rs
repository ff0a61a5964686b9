//! Ally Registry
//!
//! Ownership and command bookkeeping for registry-managed creatures. The
//! durable truth lives on the entities themselves ([`OwnedBy`] and
//! [`AllyOrder`] components); the registry resource is a cache rebuilt
//! from those components and kept in sync by the mutation functions here.

use bevy_ecs::prelude::*;
use std::collections::{BTreeSet, HashMap};
use tracing::debug;
use uuid::Uuid;

use ally_events::{AllyCommand, SimEvent};

use crate::behavior::BehaviorSet;
use crate::components::{AllyOrder, OwnedBy, PatrolAnchor, StableId};
use crate::{SimClock, TickEvents};

/// Cached ownership and command tables, keyed by stable id.
#[derive(Resource, Debug, Default)]
pub struct AllyRegistry {
    /// Owner id to the set of allies they own. BTreeSet keeps iteration
    /// deterministic.
    owners: HashMap<Uuid, BTreeSet<Uuid>>,
    owner_of: HashMap<Uuid, Uuid>,
    commands: HashMap<Uuid, AllyCommand>,
}

impl AllyRegistry {
    pub fn owner_of(&self, creature: Uuid) -> Option<Uuid> {
        self.owner_of.get(&creature).copied()
    }

    pub fn command_of(&self, creature: Uuid) -> Option<AllyCommand> {
        self.commands.get(&creature).copied()
    }

    pub fn allies_of(&self, owner: Uuid) -> impl Iterator<Item = Uuid> + '_ {
        self.owners.get(&owner).into_iter().flatten().copied()
    }

    pub fn is_ally(&self, creature: Uuid) -> bool {
        self.owner_of.contains_key(&creature)
    }

    pub fn len(&self) -> usize {
        self.owner_of.len()
    }

    pub fn is_empty(&self) -> bool {
        self.owner_of.is_empty()
    }

    fn insert(&mut self, creature: Uuid, owner: Uuid, command: AllyCommand) {
        if let Some(prev) = self.owner_of.insert(creature, owner) {
            if let Some(set) = self.owners.get_mut(&prev) {
                set.remove(&creature);
            }
        }
        self.owners.entry(owner).or_default().insert(creature);
        self.commands.insert(creature, command);
    }

    fn remove(&mut self, creature: Uuid) -> Option<Uuid> {
        let owner = self.owner_of.remove(&creature)?;
        if let Some(set) = self.owners.get_mut(&owner) {
            set.remove(&creature);
            if set.is_empty() {
                self.owners.remove(&owner);
            }
        }
        self.commands.remove(&creature);
        Some(owner)
    }
}

/// Finds a live entity by its stable id.
pub fn find_by_id(world: &mut World, id: Uuid) -> Option<Entity> {
    let mut query = world.query::<(Entity, &StableId)>();
    query
        .iter(world)
        .find(|(_, sid)| sid.0 == id)
        .map(|(e, _)| e)
}

/// Rebuilds the registry cache from the ownership components. Called on
/// restore and whenever the cache might be stale.
pub fn rebuild_registry(world: &mut World) {
    let mut entries = Vec::new();
    let mut query = world.query::<(&StableId, &OwnedBy, Option<&AllyOrder>)>();
    for (sid, owned, order) in query.iter(world) {
        let command = order.map(|o| o.0).unwrap_or_default();
        entries.push((sid.0, owned.0, command));
    }
    let mut registry = world.resource_mut::<AllyRegistry>();
    registry.owners.clear();
    registry.owner_of.clear();
    registry.commands.clear();
    for (creature, owner, command) in entries {
        registry.insert(creature, owner, command);
    }
}

fn push_event(world: &mut World, event: SimEvent) {
    let tick = world.resource::<SimClock>().tick;
    world.resource_mut::<TickEvents>().push(tick, event);
}

/// Befriends a creature: attaches ownership, a default Follow order, and
/// the command behavior slots. Already-owned creatures are refused; they
/// must be released first.
pub fn add_ally(world: &mut World, creature: Uuid, owner: Uuid) -> bool {
    let Some(entity) = find_by_id(world, creature) else {
        return false;
    };
    if world.get::<OwnedBy>(entity).is_some() {
        debug!(%creature, "befriend refused, already owned");
        return false;
    }
    let command = world
        .get::<AllyOrder>(entity)
        .map(|o| o.0)
        .unwrap_or_default();
    world
        .entity_mut(entity)
        .insert((OwnedBy(owner), AllyOrder(command)));
    if world.get::<BehaviorSet>(entity).is_none() {
        world
            .entity_mut(entity)
            .insert((BehaviorSet::ally(), PatrolAnchor::default()));
    }
    world
        .resource_mut::<AllyRegistry>()
        .insert(creature, owner, command);
    debug!(%creature, %owner, "ally registered");
    push_event(world, SimEvent::Befriended { creature, owner });
    true
}

/// Releases a creature from its owner. The command component is removed
/// with the ownership; an unowned creature has no command.
pub fn remove_ally(world: &mut World, creature: Uuid) -> bool {
    let Some(owner) = world.resource_mut::<AllyRegistry>().remove(creature) else {
        return false;
    };
    if let Some(entity) = find_by_id(world, creature) {
        world.entity_mut(entity).remove::<(OwnedBy, AllyOrder)>();
    }
    debug!(%creature, %owner, "ally released");
    push_event(world, SimEvent::Released { creature, owner });
    true
}

/// Sets an owned creature's command. Returns false for unowned creatures.
pub fn set_command(world: &mut World, creature: Uuid, command: AllyCommand) -> bool {
    if !world.resource::<AllyRegistry>().is_ally(creature) {
        return false;
    }
    let Some(entity) = find_by_id(world, creature) else {
        return false;
    };
    let changed = world
        .get::<AllyOrder>(entity)
        .map(|o| o.0 != command)
        .unwrap_or(true);
    world.entity_mut(entity).insert(AllyOrder(command));
    world
        .resource_mut::<AllyRegistry>()
        .commands
        .insert(creature, command);
    if changed {
        push_event(world, SimEvent::CommandChanged { creature, command });
    }
    true
}

/// Advances an owned creature's command to the next in the fixed cycle.
pub fn cycle_command(world: &mut World, creature: Uuid) -> Option<AllyCommand> {
    let current = world.resource::<AllyRegistry>().command_of(creature)?;
    let next = current.next();
    set_command(world, creature, next).then_some(next)
}

/// The creature's current command, if it is registered.
pub fn command_of(world: &World, creature: Uuid) -> Option<AllyCommand> {
    world.resource::<AllyRegistry>().command_of(creature)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::{Footprint, Position, Vitals};

    fn test_world() -> World {
        let mut world = World::new();
        world.init_resource::<AllyRegistry>();
        world.init_resource::<TickEvents>();
        world.init_resource::<SimClock>();
        world
    }

    fn spawn_creature(world: &mut World) -> Uuid {
        let id = Uuid::new_v4();
        world.spawn((
            StableId(id),
            Position::default(),
            Footprint::new(0.8, 0.8),
            Vitals::new(20.0),
        ));
        id
    }

    #[test]
    fn befriend_then_cycle() {
        let mut world = test_world();
        let creature = spawn_creature(&mut world);
        let owner = Uuid::new_v4();

        assert!(add_ally(&mut world, creature, owner));
        assert_eq!(command_of(&world, creature), Some(AllyCommand::Follow));

        assert_eq!(cycle_command(&mut world, creature), Some(AllyCommand::Stay));
        assert_eq!(
            cycle_command(&mut world, creature),
            Some(AllyCommand::Wander)
        );
        assert_eq!(
            cycle_command(&mut world, creature),
            Some(AllyCommand::Patrol)
        );
        assert_eq!(
            cycle_command(&mut world, creature),
            Some(AllyCommand::Follow)
        );
    }

    #[test]
    fn commands_rejected_for_unowned() {
        let mut world = test_world();
        let creature = spawn_creature(&mut world);
        assert!(!set_command(&mut world, creature, AllyCommand::Stay));
        assert_eq!(cycle_command(&mut world, creature), None);
    }

    #[test]
    fn release_removes_command() {
        let mut world = test_world();
        let creature = spawn_creature(&mut world);
        let owner = Uuid::new_v4();
        add_ally(&mut world, creature, owner);
        assert!(remove_ally(&mut world, creature));
        assert_eq!(command_of(&world, creature), None);
        assert!(!remove_ally(&mut world, creature));
    }

    #[test]
    fn rebuild_restores_cache_from_components() {
        let mut world = test_world();
        let creature = spawn_creature(&mut world);
        let owner = Uuid::new_v4();
        add_ally(&mut world, creature, owner);
        set_command(&mut world, creature, AllyCommand::Patrol);

        // wipe the cache, keep the components
        *world.resource_mut::<AllyRegistry>() = AllyRegistry::default();
        assert!(!world.resource::<AllyRegistry>().is_ally(creature));

        rebuild_registry(&mut world);
        let registry = world.resource::<AllyRegistry>();
        assert_eq!(registry.owner_of(creature), Some(owner));
        assert_eq!(registry.command_of(creature), Some(AllyCommand::Patrol));
    }

    #[test]
    fn befriending_an_owned_creature_is_refused() {
        let mut world = test_world();
        let creature = spawn_creature(&mut world);
        let first = Uuid::new_v4();
        let second = Uuid::new_v4();
        assert!(add_ally(&mut world, creature, first));
        assert!(!add_ally(&mut world, creature, second));
        assert_eq!(
            world.resource::<AllyRegistry>().owner_of(creature),
            Some(first)
        );

        // release, then the new owner may claim it
        assert!(remove_ally(&mut world, creature));
        assert!(add_ally(&mut world, creature, second));
        assert_eq!(
            world.resource::<AllyRegistry>().owner_of(creature),
            Some(second)
        );
    }
}

//! Save/restore round trips and degraded-load behavior.

mod common;

use glam::Vec3;
use uuid::Uuid;

use ally_events::{
    AllyCommand, CarryTag, CompanionSave, CreatureRecord, SimEvent, WorldSave,
};
use ally_core::components::{CaptureState, Companion, PatrolAnchor, Vitals};
use ally_core::{AllyInput, AllyRegistry, Simulation, Tuning};

use common::{run_until, sim};

#[test]
fn companion_record_round_trips() {
    let mut sim = sim(20);
    let owner = sim.spawn_player(Vec3::ZERO);
    let creature = sim.spawn_companion(Vec3::new(3.0, 0.0, 5.0), Some(owner));

    sim.queue_input(AllyInput::Dye { creature, color: 7 });
    sim.queue_input(AllyInput::GiveLife { creature });
    sim.queue_input(AllyInput::SetCommand {
        creature,
        command: AllyCommand::Patrol,
    });
    sim.run_ticks(20);

    let save = sim.save();
    assert_eq!(save.companions.len(), 1);
    let saved = &save.companions[0];
    assert_eq!(saved.id, creature);
    assert_eq!(saved.owner, Some(owner));
    assert_eq!(saved.record.color, 7);
    assert_eq!(saved.record.lives, 4);
    assert_eq!(saved.record.command, AllyCommand::Patrol);
    assert_eq!(saved.record.patrol_center, Some([3, 0, 5]));

    let mut restored = Simulation::from_save(21, Tuning::default(), &save);
    let creature_e = restored.find_entity(creature).unwrap();
    let companion = restored.world().get::<Companion>(creature_e).unwrap();
    assert_eq!(companion.color, 7);
    assert_eq!(companion.lives, 4);
    let anchor = restored.world().get::<PatrolAnchor>(creature_e).unwrap();
    assert_eq!(anchor.center.map(|c| [c.x, c.y, c.z]), Some([3, 0, 5]));

    // ownership cache is rebuilt from the restored components
    let registry = restored.world().resource::<AllyRegistry>();
    assert_eq!(registry.owner_of(creature), Some(owner));
    assert_eq!(registry.command_of(creature), Some(AllyCommand::Patrol));
}

#[test]
fn generic_allies_survive_the_round_trip() {
    let mut sim = sim(22);
    let owner = Uuid::new_v4();
    let ally = sim.spawn_ally(Vec3::new(1.0, 0.0, -4.0), owner);
    sim.queue_input(AllyInput::SetCommand {
        creature: ally,
        command: AllyCommand::Stay,
    });
    sim.run_ticks(5);

    let save = sim.save();
    assert_eq!(save.allies.len(), 1);
    assert_eq!(save.allies[0].owner, owner);
    assert_eq!(save.allies[0].command, AllyCommand::Stay);

    let restored = Simulation::from_save(23, Tuning::default(), &save);
    let registry = restored.world().resource::<AllyRegistry>();
    assert_eq!(registry.owner_of(ally), Some(owner));
    assert_eq!(registry.command_of(ally), Some(AllyCommand::Stay));
}

#[test]
fn stale_captured_reference_is_dropped_on_load() {
    let save = WorldSave {
        tick: 10,
        companions: vec![CompanionSave {
            id: Uuid::new_v4(),
            position: [0.0, 0.0, 0.0],
            health: 20.0,
            max_health: 20.0,
            owner: None,
            record: CreatureRecord {
                carry_state: CarryTag::Held,
                captured_entity_id: Some(Uuid::new_v4()),
                holding_entity_id: Some(Uuid::new_v4()),
                ..Default::default()
            },
        }],
        allies: vec![],
    };

    let mut restored = Simulation::from_save(24, Tuning::default(), &save);
    let creature_e = restored.find_entity(save.companions[0].id).unwrap();
    let capture = restored.world().get::<CaptureState>(creature_e).unwrap();
    assert!(!capture.has_captured());
    assert!(restored
        .world()
        .get::<ally_core::components::CarryState>(creature_e)
        .unwrap()
        .is_none());

    // the creature still runs a normal tick after the degraded load
    restored.tick();
    assert!(restored
        .world()
        .get::<Vitals>(creature_e)
        .unwrap()
        .alive);
}

#[test]
fn dead_save_entries_do_not_resurrect() {
    let mut sim = sim(25);
    let owner = sim.spawn_player(Vec3::ZERO);
    let creature = sim.spawn_companion(Vec3::new(2.0, 0.0, 0.0), Some(owner));
    let creature_e = sim.find_entity(creature).unwrap();
    sim.world_mut()
        .get_mut::<Companion>(creature_e)
        .unwrap()
        .lives = 1;
    sim.queue_input(AllyInput::Damage {
        target: creature,
        amount: 30.0,
    });
    run_until(&mut sim, 2, |e| {
        matches!(e.event, SimEvent::LifeLost { lives_left: 0, .. })
    });

    // captured before the despawn lands; health 0 and no lives left
    let save = sim.save();
    let mut restored = Simulation::from_save(26, Tuning::default(), &save);
    let creature_e = restored.find_entity(creature).unwrap();
    let vitals = restored.world().get::<Vitals>(creature_e).unwrap();
    assert!(!vitals.alive);
}

//! End-to-end behavior scenarios: inhale/capture, the mouth exits,
//! escape mashing, and carry/throw.

mod common;

use glam::Vec3;

use ally_events::SimEvent;
use ally_core::components::{
    CaptureState, CarryState, Companion, CompanionTimers, Footprint, Visibility,
    Vitals,
};
use ally_core::{AllyInput, Simulation, Tuning};

use common::{run_until, sim};

#[test]
fn monster_is_pulled_in_and_captured() {
    let mut sim = sim(1);
    let owner = sim.spawn_player(Vec3::new(0.0, 0.0, -3.0));
    let creature = sim.spawn_companion(Vec3::ZERO, Some(owner));
    let mob = sim.spawn_mob(Vec3::new(2.5, 0.0, 0.0), Footprint::new(0.5, 0.5), 8.0, true);
    sim.drain_events();

    run_until(&mut sim, 300, |e| {
        matches!(e.event, SimEvent::Captured { target, .. } if target == mob)
    });

    let creature_e = sim.find_entity(creature).unwrap();
    let mob_e = sim.find_entity(mob).unwrap();
    let capture = sim.world().get::<CaptureState>(creature_e).unwrap();
    assert_eq!(capture.captured_id(), Some(mob));
    assert!(!sim.world().get::<Companion>(creature_e).unwrap().inhaling);

    let vis = sim.world().get::<Visibility>(mob_e).unwrap();
    assert!(vis.hidden);
    assert!(vis.invulnerable);
}

#[test]
fn captured_monster_is_ground_down_and_swallowed() {
    // rule out the expel roll so the mouth grinds the target all the way
    let mut tuning = Tuning::default();
    tuning.capture.expel_chance = 0.0;
    let mut sim = Simulation::new(2, tuning);
    let owner = sim.spawn_player(Vec3::new(0.0, 0.0, -3.0));
    let creature = sim.spawn_companion(Vec3::ZERO, Some(owner));
    let mob = sim.spawn_mob(Vec3::new(1.5, 0.0, 0.0), Footprint::new(0.5, 0.5), 8.0, true);

    run_until(&mut sim, 300, |e| {
        matches!(e.event, SimEvent::Captured { .. })
    });
    run_until(&mut sim, 300, |e| {
        matches!(e.event, SimEvent::Swallowed { target, .. } if target == mob)
    });

    // the swallowed target is gone and the mouth is empty
    assert!(sim.find_entity(mob).is_none());
    let creature_e = sim.find_entity(creature).unwrap();
    assert!(!sim
        .world()
        .get::<CaptureState>(creature_e)
        .unwrap()
        .has_captured());
}

#[test]
fn weakened_target_is_expelled_unharmed() {
    let mut tuning = Tuning::default();
    tuning.capture.expel_chance = 1.0;
    let mut sim = Simulation::new(3, tuning);

    let creature = sim.spawn_companion(Vec3::ZERO, None);
    let mob = sim.spawn_mob(
        Vec3::new(0.0, 0.0, 0.8),
        Footprint::new(0.5, 0.5),
        100.0,
        false,
    );

    // docile targets are not inhaled autonomously, force the vacuum on
    let creature_e = sim.find_entity(creature).unwrap();
    sim.world_mut()
        .get_mut::<Companion>(creature_e)
        .unwrap()
        .inhaling = true;
    run_until(&mut sim, 50, |e| {
        matches!(e.event, SimEvent::Captured { .. })
    });

    let mob_e = sim.find_entity(mob).unwrap();
    sim.world_mut().get_mut::<Vitals>(mob_e).unwrap().health = 20.0;

    run_until(&mut sim, 10, |e| {
        matches!(e.event, SimEvent::Expelled { target, .. } if target == mob)
    });

    let vis = sim.world().get::<Visibility>(mob_e).unwrap();
    assert!(!vis.hidden);
    assert!(!vis.invulnerable);
    let health_after = sim.world().get::<Vitals>(mob_e).unwrap().health;

    // no residual mouth damage once out
    sim.run_ticks(40);
    assert_eq!(sim.world().get::<Vitals>(mob_e).unwrap().health, health_after);
}

#[test]
fn captured_player_mashes_free_and_gets_pushback() {
    let mut sim = sim(4);
    let creature = sim.spawn_companion(Vec3::ZERO, None);
    let player = sim.spawn_player(Vec3::new(0.0, 0.0, 0.8));

    let creature_e = sim.find_entity(creature).unwrap();
    sim.world_mut()
        .get_mut::<Companion>(creature_e)
        .unwrap()
        .inhaling = true;
    run_until(&mut sim, 50, |e| {
        matches!(e.event, SimEvent::Captured { .. })
    });

    {
        let mut capture = sim
            .world_mut()
            .get_mut::<CaptureState>(creature_e)
            .unwrap();
        let esc = capture
            .captured
            .as_mut()
            .unwrap()
            .escape
            .as_mut()
            .unwrap();
        esc.required = 12;
        esc.presses = 0;
    }

    for _ in 0..12 {
        sim.queue_input(AllyInput::CapturedMash { player });
    }
    let events = run_until(&mut sim, 5, |e| {
        matches!(e.event, SimEvent::Escaped { .. })
    });
    let presses = events
        .iter()
        .find_map(|e| match e.event {
            SimEvent::Escaped { presses, .. } => Some(presses),
            _ => None,
        })
        .unwrap();
    assert_eq!(presses, 12);

    let player_e = sim.find_entity(player).unwrap();
    let vis = sim.world().get::<Visibility>(player_e).unwrap();
    assert!(!vis.hidden);
    assert!(!vis.invulnerable);

    // pushback keeps the creature's behaviors offline for a while; the
    // counter has already ticked once, so 12 locked ticks remain
    let timers = sim.world().get::<CompanionTimers>(creature_e).unwrap();
    assert_eq!(timers.pushback, 12);
}

#[test]
fn captured_player_only_leaves_through_the_mash() {
    let mut sim = sim(9);
    let creature = sim.spawn_companion(Vec3::ZERO, None);
    let player = sim.spawn_player(Vec3::new(0.0, 0.0, 0.8));

    let creature_e = sim.find_entity(creature).unwrap();
    sim.world_mut()
        .get_mut::<Companion>(creature_e)
        .unwrap()
        .inhaling = true;
    run_until(&mut sim, 50, |e| {
        matches!(e.event, SimEvent::Captured { .. })
    });

    // a hostile camped next to the mouth must not trigger the spit exit
    sim.spawn_mob(Vec3::new(3.0, 0.0, 0.0), Footprint::new(0.6, 1.7), 8.0, true);
    let player_e = sim.find_entity(player).unwrap();
    let health_before = sim.world().get::<Vitals>(player_e).unwrap().health;

    sim.run_ticks(50);
    let events = sim.drain_events();
    assert!(events.iter().all(|e| !matches!(
        e.event,
        SimEvent::Spat { .. } | SimEvent::Swallowed { .. } | SimEvent::Expelled { .. }
    )));

    // still in the mouth, untouched by the damage pulse
    assert!(sim.find_entity(player).is_some());
    let capture = sim.world().get::<CaptureState>(creature_e).unwrap();
    assert_eq!(capture.captured_id(), Some(player));
    assert_eq!(
        sim.world().get::<Vitals>(player_e).unwrap().health,
        health_before
    );

    // the mash exit still works
    {
        let mut capture = sim
            .world_mut()
            .get_mut::<CaptureState>(creature_e)
            .unwrap();
        capture
            .captured
            .as_mut()
            .unwrap()
            .escape
            .as_mut()
            .unwrap()
            .required = 2;
    }
    sim.queue_input(AllyInput::CapturedMash { player });
    sim.queue_input(AllyInput::CapturedMash { player });
    run_until(&mut sim, 3, |e| {
        matches!(e.event, SimEvent::Escaped { .. })
    });
}

#[test]
fn posture_toggles_count_once_per_tick() {
    let mut sim = sim(5);
    let creature = sim.spawn_companion(Vec3::ZERO, None);
    let player = sim.spawn_player(Vec3::new(0.0, 0.0, 0.8));

    let creature_e = sim.find_entity(creature).unwrap();
    sim.world_mut()
        .get_mut::<Companion>(creature_e)
        .unwrap()
        .inhaling = true;
    run_until(&mut sim, 50, |e| {
        matches!(e.event, SimEvent::Captured { .. })
    });

    {
        let mut capture = sim
            .world_mut()
            .get_mut::<CaptureState>(creature_e)
            .unwrap();
        capture
            .captured
            .as_mut()
            .unwrap()
            .escape
            .as_mut()
            .unwrap()
            .required = 50;
    }

    // both flags flip in the same tick
    sim.queue_input(AllyInput::SetPosture {
        player,
        crouching: true,
        sprinting: true,
    });
    sim.tick();

    let capture = sim.world().get::<CaptureState>(creature_e).unwrap();
    let presses = capture.captured.unwrap().escape.unwrap().presses;
    assert_eq!(presses, 1);
}

#[test]
fn pickup_during_capture_releases_target_first() {
    let mut sim = sim(6);
    let owner = sim.spawn_player(Vec3::new(0.0, 0.0, -2.0));
    let creature = sim.spawn_companion(Vec3::ZERO, Some(owner));
    let mob = sim.spawn_mob(Vec3::new(1.5, 0.0, 0.0), Footprint::new(0.5, 0.5), 8.0, true);

    run_until(&mut sim, 300, |e| {
        matches!(e.event, SimEvent::Captured { .. })
    });

    sim.queue_input(AllyInput::Pickup {
        creature,
        holder: owner,
    });
    let events = run_until(&mut sim, 2, |e| {
        matches!(e.event, SimEvent::PickedUp { .. })
    });
    assert!(events
        .iter()
        .all(|e| !matches!(e.event, SimEvent::Swallowed { .. })));

    let creature_e = sim.find_entity(creature).unwrap();
    assert!(!sim
        .world()
        .get::<CaptureState>(creature_e)
        .unwrap()
        .has_captured());
    assert!(matches!(
        sim.world().get::<CarryState>(creature_e).unwrap(),
        CarryState::Held { .. }
    ));

    // the former captive is back in the world, targetable again
    let mob_e = sim.find_entity(mob).unwrap();
    let vis = sim.world().get::<Visibility>(mob_e).unwrap();
    assert!(!vis.hidden);
    assert!(!vis.invulnerable);
}

#[test]
fn thrown_creature_strikes_a_bystander() {
    let mut sim = sim(7);
    let owner = sim.spawn_player(Vec3::ZERO);
    let creature = sim.spawn_companion(Vec3::new(2.0, 0.0, 0.0), Some(owner));
    let mob = sim.spawn_mob(
        Vec3::new(-0.3, 0.0, 2.4),
        Footprint::new(0.6, 0.7),
        8.0,
        false,
    );

    sim.queue_input(AllyInput::Pickup {
        creature,
        holder: owner,
    });
    sim.tick();

    sim.queue_input(AllyInput::Throw { creature });
    run_until(&mut sim, 10, |e| {
        matches!(e.event, SimEvent::ThrowHit { target, .. } if target == mob)
    });

    let creature_e = sim.find_entity(creature).unwrap();
    let mob_e = sim.find_entity(mob).unwrap();
    assert_eq!(sim.world().get::<Vitals>(mob_e).unwrap().health, 2.0);
    assert_eq!(sim.world().get::<Vitals>(creature_e).unwrap().health, 18.0);
    assert!(sim
        .world()
        .get::<CarryState>(creature_e)
        .unwrap()
        .is_none());
}

#[test]
fn pickup_mid_flight_is_refused() {
    let mut sim = sim(21);
    let owner = sim.spawn_player(Vec3::ZERO);
    let creature = sim.spawn_companion(Vec3::new(2.0, 0.0, 0.0), Some(owner));

    sim.queue_input(AllyInput::Pickup {
        creature,
        holder: owner,
    });
    sim.tick();
    sim.queue_input(AllyInput::Throw { creature });
    sim.tick();
    sim.drain_events();

    let creature_e = sim.find_entity(creature).unwrap();
    assert!(matches!(
        sim.world().get::<CarryState>(creature_e).unwrap(),
        CarryState::Thrown { .. }
    ));

    // grabbing the creature out of the air would skip impact resolution
    sim.queue_input(AllyInput::Pickup {
        creature,
        holder: owner,
    });
    sim.tick();
    assert!(matches!(
        sim.world().get::<CarryState>(creature_e).unwrap(),
        CarryState::Thrown { .. }
    ));
    let events = sim.drain_events();
    assert!(events
        .iter()
        .all(|e| !matches!(e.event, SimEvent::PickedUp { .. })));
}

#[test]
fn fruitless_inhale_times_out() {
    let mut tuning = Tuning::default();
    tuning.inhale.timeout_ticks = 8;
    let mut sim = Simulation::new(20, tuning);
    let creature = sim.spawn_companion(Vec3::ZERO, None);

    // nothing in range to pull, the vacuum runs dry
    let creature_e = sim.find_entity(creature).unwrap();
    sim.world_mut()
        .get_mut::<Companion>(creature_e)
        .unwrap()
        .inhaling = true;
    sim.run_ticks(12);

    assert!(!sim.world().get::<Companion>(creature_e).unwrap().inhaling);
    assert_eq!(
        sim.world()
            .get::<CompanionTimers>(creature_e)
            .unwrap()
            .inhale_age,
        0
    );
    let events = sim.drain_events();
    assert!(events
        .iter()
        .all(|e| !matches!(e.event, SimEvent::Captured { .. })));
}

#[test]
fn pickup_by_a_stranger_is_refused() {
    let mut sim = sim(8);
    let owner = sim.spawn_player(Vec3::ZERO);
    let stranger = sim.spawn_player(Vec3::new(1.0, 0.0, 0.0));
    let creature = sim.spawn_companion(Vec3::new(2.0, 0.0, 0.0), Some(owner));

    sim.queue_input(AllyInput::Pickup {
        creature,
        holder: stranger,
    });
    sim.tick();

    let creature_e = sim.find_entity(creature).unwrap();
    assert!(sim
        .world()
        .get::<CarryState>(creature_e)
        .unwrap()
        .is_none());
}

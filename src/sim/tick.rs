//! Per-frame simulation tick
//!
//! Advances movement, bandit AI, combat and pickups by one rendered frame.

use glam::Vec2;

use super::events::GameEvent;
use super::physics::PlayerBody;
use super::pickup::ItemKind;
use super::state::{GamePhase, GameState};
use super::weapon::WeaponKind;
use crate::consts::PHYSICS_DT;
use crate::heading_of;

/// Where the player is aiming
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum Aim {
    /// Keep current facing
    #[default]
    None,
    /// Ground point under the cursor
    Point(Vec2),
    /// Ground direction from a joystick (or cursor offset)
    Stick(Vec2),
}

/// Input commands for a single frame
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TickInput {
    /// Attack button pressed
    pub attack: bool,
    pub aim: Aim,
    /// Ground-plane move direction, length 0..1
    pub move_dir: Vec2,
    /// Sprint held (spends stamina while moving)
    pub sprint: bool,
    /// Weapon switch request
    pub switch_to: Option<WeaponKind>,
    /// Manual reload request
    pub reload: bool,
    /// Pause toggle
    pub pause: bool,
}

/// Advance the game by one frame of `dt` seconds
pub fn tick(state: &mut GameState, input: &TickInput, dt: f32) {
    // Handle pause toggle
    if input.pause {
        match state.phase {
            GamePhase::Playing => {
                state.phase = GamePhase::Paused;
                return;
            }
            GamePhase::Paused => {
                state.phase = GamePhase::Playing;
                state.stepper.reset();
            }
            GamePhase::GameOver => {}
        }
    }

    // Don't tick if paused or game over
    match state.phase {
        GamePhase::Paused | GamePhase::GameOver => return,
        GamePhase::Playing => {}
    }

    state.time += dt;
    state.time_ticks += 1;

    // Player movement on the fixed physics step
    let move_dir = if state.combat.is_dead() {
        Vec2::ZERO
    } else {
        input.move_dir
    };
    let moving = move_dir != Vec2::ZERO;
    let speed = if state.stamina.update(dt, input.sprint, moving) {
        state.tuning.player.sprint_speed
    } else {
        state.tuning.player.walk_speed
    };
    state.avatar.steer(move_dir, speed);
    if moving {
        state.avatar.set_facing(heading_of(move_dir));
    }
    for _ in 0..state.stepper.advance(dt) {
        state.avatar.integrate(PHYSICS_DT);
    }

    let player_pos = state.avatar.ground_pos();

    // Bandits; their attacks land on the player before being announced
    let mut events = Vec::new();
    for bandit in &mut state.bandits {
        bandit.update(dt, player_pos, &mut state.rng, &mut events);
        for event in events.drain(..) {
            if let GameEvent::BanditAttack { damage, .. } = &event {
                state.combat.take_damage(*damage, &mut state.bus);
            }
            state.bus.publish(event);
        }
    }

    // Player offense
    state.combat.update(
        dt,
        input,
        &mut state.avatar,
        &mut state.bandits,
        &mut state.bus,
    );

    // Pickups
    if !state.combat.is_dead() {
        let reach = state.tuning.player.pickup_distance;
        for item in &mut state.collectibles {
            if !item.update(player_pos, reach, &mut events) {
                continue;
            }
            match item.item {
                ItemKind::Herb => state.combat.heal(state.tuning.player.herb_heal),
                ItemKind::SaveElixir => state.save_requested = true,
                ItemKind::GoldNugget | ItemKind::Wood => {}
            }
        }
        for event in events.drain(..) {
            state.bus.publish(event);
        }
    }

    if state.combat.is_dead() {
        log::info!("Game over after {:.1}s", state.time);
        state.phase = GamePhase::GameOver;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::bandit::BanditState;
    use crate::sim::events::Topic;
    use glam::Vec3;
    use std::cell::RefCell;
    use std::rc::Rc;

    const DT: f32 = 1.0 / 60.0;

    fn record(state: &mut GameState, topic: Topic) -> Rc<RefCell<Vec<GameEvent>>> {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        state
            .bus
            .subscribe(topic, Box::new(move |e: &GameEvent| sink.borrow_mut().push(e.clone())));
        seen
    }

    #[test]
    fn test_tick_pause() {
        let mut state = GameState::new(12345);

        let input = TickInput {
            pause: true,
            ..Default::default()
        };
        tick(&mut state, &input, DT);
        assert_eq!(state.phase, GamePhase::Paused);

        // Paused ticks change nothing
        let before = state.bandits[0].pos;
        tick(&mut state, &TickInput::default(), 1.0);
        assert_eq!(state.bandits[0].pos, before);
        assert_eq!(state.time_ticks, 0);

        // Unpause
        tick(&mut state, &input, DT);
        assert_eq!(state.phase, GamePhase::Playing);
        assert_eq!(state.time_ticks, 1);
    }

    #[test]
    fn test_walking_moves_and_turns_player() {
        let mut state = GameState::new(1);
        let input = TickInput {
            move_dir: Vec2::new(1.0, 0.0),
            ..Default::default()
        };
        for _ in 0..60 {
            tick(&mut state, &input, DT);
        }
        let pos = state.player_pos();
        assert!((pos.x - 24.0).abs() < 0.5, "{:?}", pos);
        assert!((state.avatar.facing - std::f32::consts::FRAC_PI_2).abs() < 1e-5);
    }

    #[test]
    fn test_sprint_is_faster_and_spends_stamina() {
        let mut state = GameState::new(1);
        let input = TickInput {
            move_dir: Vec2::new(0.0, -1.0),
            sprint: true,
            ..Default::default()
        };
        for _ in 0..60 {
            tick(&mut state, &input, DT);
        }
        let pos = state.player_pos();
        assert!((pos.y + 42.0).abs() < 0.8, "{:?}", pos);
        assert!((state.hud().stamina - 75.0).abs() < 0.1);

        // Resting refills
        for _ in 0..120 {
            tick(&mut state, &TickInput::default(), DT);
        }
        assert_eq!(state.hud().stamina, 100.0);
    }

    #[test]
    fn test_bandit_attack_hits_player() {
        let mut state = GameState::new(5);
        let damaged = record(&mut state, Topic::PlayerDamaged);
        let attacks = record(&mut state, Topic::BanditAttack);

        let home = state.bandits[0].home();
        state.avatar.teleport(Vec3::new(home.x, 1.0, home.y + 1.0));
        state.bandits[0].pos = home;

        for _ in 0..120 {
            tick(&mut state, &TickInput::default(), DT);
        }

        assert!(!attacks.borrow().is_empty());
        assert_eq!(damaged.borrow().len(), attacks.borrow().len());
        assert_eq!(state.combat.hp(), 100 - 12 * attacks.borrow().len() as u32);
    }

    #[test]
    fn test_death_ends_game() {
        let mut state = GameState::new(5);
        let died = record(&mut state, Topic::PlayerDied);
        state.combat.take_damage(95, &mut state.bus);

        let home = state.bandits[0].home();
        state.avatar.teleport(Vec3::new(home.x, 1.0, home.y + 1.0));
        state.bandits[0].pos = home;

        for _ in 0..240 {
            tick(&mut state, &TickInput::default(), DT);
        }
        assert_eq!(state.phase, GamePhase::GameOver);
        assert_eq!(died.borrow().len(), 1);

        let ticks = state.time_ticks;
        tick(&mut state, &TickInput::default(), DT);
        assert_eq!(state.time_ticks, ticks);

        state.respawn();
        tick(&mut state, &TickInput::default(), DT);
        assert_eq!(state.phase, GamePhase::Playing);
    }

    #[test]
    fn test_fists_kill_bandit_and_pay() {
        let mut state = GameState::new(5);
        state.accept_quest("protect-town");

        let home = state.bandits[0].home();
        state.avatar.teleport(Vec3::new(home.x, 1.0, home.y - 1.0));

        // Keep the bandit pinned in front of the player
        let attack = TickInput {
            attack: true,
            aim: Aim::Point(home),
            ..Default::default()
        };
        for _ in 0..600 {
            state.bandits[0].pos = home;
            tick(&mut state, &attack, DT);
            if state.bandits[0].is_dead() {
                break;
            }
        }

        assert!(matches!(state.bandits[0].state(), BanditState::Dead { .. }));
        assert_eq!(state.balance(), 15);
        assert_eq!(state.quests.borrow().active()[0].progress, vec![1]);
    }

    #[test]
    fn test_herb_heals_and_elixir_requests_save() {
        let mut state = GameState::new(5);
        let collected = record(&mut state, Topic::ItemCollected);
        state.combat.take_damage(50, &mut state.bus);

        state.avatar.teleport(Vec3::new(-18.0, 1.0, 15.0));
        tick(&mut state, &TickInput::default(), DT);
        assert_eq!(state.combat.hp(), 75);

        state.avatar.teleport(Vec3::new(5.0, 1.0, 20.0));
        tick(&mut state, &TickInput::default(), DT);
        assert!(state.take_save_request());
        assert!(!state.take_save_request());

        let ids: Vec<String> = collected
            .borrow()
            .iter()
            .filter_map(|e| match e {
                GameEvent::ItemCollected { id, .. } => Some(id.clone()),
                _ => None,
            })
            .collect();
        assert_eq!(ids, vec!["herb-1".to_string(), "elixir-1".to_string()]);
    }

    #[test]
    fn test_collecting_counts_for_quests() {
        let mut state = GameState::new(5);
        state.accept_quest("collect-herbs");
        for pos in [(-18.0, 15.0), (20.0, -5.0), (-30.0, -10.0)] {
            state.avatar.teleport(Vec3::new(pos.0, 1.0, pos.1));
            tick(&mut state, &TickInput::default(), DT);
        }
        assert_eq!(state.balance(), 45);
        assert!(state.quests.borrow().is_completed("collect-herbs"));
    }

    #[test]
    fn test_determinism() {
        // Two states with same seed should produce identical results
        let mut state1 = GameState::new(99999);
        let mut state2 = GameState::new(99999);

        let inputs = [
            TickInput {
                move_dir: Vec2::new(1.0, 0.4),
                ..Default::default()
            },
            TickInput {
                attack: true,
                aim: Aim::Stick(Vec2::new(0.0, 1.0)),
                ..Default::default()
            },
            TickInput::default(),
        ];

        for i in 0..900 {
            let input = &inputs[i % inputs.len()];
            tick(&mut state1, input, DT);
            tick(&mut state2, input, DT);
        }

        assert_eq!(state1.time_ticks, state2.time_ticks);
        assert_eq!(state1.combat.hp(), state2.combat.hp());
        assert_eq!(state1.player_pos(), state2.player_pos());
        for (a, b) in state1.bandits.iter().zip(&state2.bandits) {
            assert_eq!(a.pos, b.pos);
            assert_eq!(a.state(), b.state());
        }
    }
}

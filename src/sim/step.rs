/// One simulation tick, in a fixed order:
///   input → moving bodies → integration → horizontal pass → vertical pass
///   → platform ride → enemy contact → pickups → hazards → world bounds
///   → state/animation → completion check.
///
/// Emits GameEvents for the presentation layer; never panics on gameplay
/// edge conditions. An empty level makes the whole tick a no-op.

use crate::config::PhysicsConfig;
use crate::domain::player::{InputSnapshot, Player, PLAYER_W};
use crate::domain::tile::{CollectibleKind, TILE_SIZE};
use crate::sim::event::GameEvent;
use crate::sim::level::Level;
use crate::sim::physics;

/// How deep (px) the player's feet may sink into a moving platform's top
/// and still count as standing on it.
const PLATFORM_TOLERANCE: f32 = 8.0;

/// Clamp a frame delta so a stalled frame can't tunnel the player
/// through geometry.
pub fn clamp_delta(dt: f32, max: f32) -> f32 {
    if dt > max {
        max
    } else {
        dt
    }
}

pub fn step(
    level: &mut Level,
    player: &mut Player,
    phys: &PhysicsConfig,
    input: &InputSnapshot,
    dt: f32,
) -> Vec<GameEvent> {
    let mut events = Vec::new();
    if level.width == 0 || level.height == 0 {
        return events;
    }

    // Ladder occupancy feeds climb intent; cleared when no overlap remains.
    let on_ladder = level
        .tile_collisions(&player.collision_box())
        .iter()
        .any(|t| t.kind.is_climbable());
    if !on_ladder {
        player.is_climbing = false;
    }

    player.apply_input(input, on_ladder, phys);

    for body in level.platforms.iter_mut().chain(level.enemies.iter_mut()) {
        body.advance(dt);
    }

    player.integrate(dt, phys);

    // Axis-separated tile resolution; each pass re-queries the overlap set.
    let hits = level.tile_collisions(&player.collision_box());
    physics::resolve_horizontal(player, &hits);
    let hits = level.tile_collisions(&player.collision_box());
    physics::resolve_vertical(player, &hits);

    resolve_platform_contact(level, player);
    resolve_enemy_contact(level, player, &mut events);
    resolve_pickups(level, player, &mut events);
    resolve_hazards(level, player, &mut events);
    resolve_world_bounds(level, player, &mut events);

    player.update_state();
    player.update_animation(dt);

    if player.is_alive
        && level.requirements_met(player.has_key)
        && level.exit_reached(player.position)
    {
        events.push(GameEvent::LevelCompleted);
    }

    events
}

/// Moving-platform contact. Feet within the top tolerance means standing:
/// snap to the top and ride the platform's horizontal displacement for this
/// tick. Any other overlap treats the platform as a solid: side hits clamp
/// to the near edge, rising hits bump the underside.
fn resolve_platform_contact(level: &Level, player: &mut Player) {
    let pbox = player.collision_box();
    let feet = pbox.bottom();
    for plat in &level.platforms {
        let b = plat.bounds();
        let h_overlap = pbox.x < b.right() && pbox.right() > b.x;
        if h_overlap
            && player.velocity.y >= 0.0
            && feet >= b.y
            && feet <= b.y + PLATFORM_TOLERANCE
        {
            player.land_on(b.y);
            player.position.x += plat.last_dx;
            return;
        }
        if !pbox.intersects(&b) {
            continue;
        }
        if player.velocity.x != 0.0 {
            player.hit_wall(&b, player.velocity.x > 0.0);
        } else if player.velocity.y < 0.0 {
            player.bump_ceiling(b.bottom());
        }
        return;
    }
}

fn resolve_enemy_contact(level: &Level, player: &mut Player, events: &mut Vec<GameEvent>) {
    if !player.is_alive {
        return;
    }
    let pbox = player.collision_box();
    if level.enemies.iter().any(|e| e.collides_with(&pbox)) {
        damage_player(level, player, events);
    }
}

fn resolve_pickups(level: &mut Level, player: &mut Player, events: &mut Vec<GameEvent>) {
    if !player.is_alive {
        return;
    }
    for idx in level.collectibles_hit(&player.collision_box()) {
        let kind = level.collectibles[idx].kind;
        let doors_before = level.doors_unlocked;
        let total_before = level.total_collectibles;
        let points = level.collect(idx);

        match kind {
            CollectibleKind::Key => {
                player.collect_item(0);
                events.push(GameEvent::KeyCollected);
                let unlocked = level.doors_unlocked - doors_before;
                if unlocked > 0 {
                    events.push(GameEvent::DoorsUnlocked { count: unlocked });
                }
            }
            CollectibleKind::Princess => {
                // Rescue only; no score and no inventory change
                events.push(GameEvent::ItemCollected { kind, points });
            }
            _ => {
                player.collect_item(points);
                events.push(GameEvent::ItemCollected { kind, points });
                if level.total_collectibles > total_before {
                    events.push(GameEvent::PrincessSpawned);
                }
            }
        }
    }
}

fn resolve_hazards(level: &Level, player: &mut Player, events: &mut Vec<GameEvent>) {
    if !player.is_alive {
        return;
    }
    let touching_hazard = level
        .tile_collisions(&player.collision_box())
        .iter()
        .any(|t| t.kind.is_dangerous());
    if touching_hazard {
        damage_player(level, player, events);
    }
}

/// Clamp to the playfield's sides and top; dropping past the bottom costs
/// a life.
fn resolve_world_bounds(level: &Level, player: &mut Player, events: &mut Vec<GameEvent>) {
    let world_w = level.width as f32 * TILE_SIZE;
    let world_h = level.height as f32 * TILE_SIZE;

    if player.position.x < 0.0 {
        player.position.x = 0.0;
        if player.velocity.x < 0.0 {
            player.velocity.x = 0.0;
        }
    } else if player.position.x > world_w - PLAYER_W {
        player.position.x = world_w - PLAYER_W;
        if player.velocity.x > 0.0 {
            player.velocity.x = 0.0;
        }
    }

    // Only a rising player stops at the top edge; a sprite standing on a
    // top-row surface may overhang row zero.
    if player.position.y < 0.0 && player.velocity.y < 0.0 {
        player.position.y = 0.0;
        player.velocity.y = 0.0;
    }

    if player.is_alive && player.position.y > world_h {
        damage_player(level, player, events);
    }
}

/// One hit: lose a life, then either respawn at the level start or die.
/// The respawn teleport guarantees one contact yields exactly one hit.
fn damage_player(level: &Level, player: &mut Player, events: &mut Vec<GameEvent>) {
    player.take_damage();
    events.push(GameEvent::PlayerDamaged);
    if player.is_alive {
        let start = level.player_start();
        player.reset(start.x, start.y);
        // Progression already banked in the level survives the respawn
        player.has_key = level.keys_collected > 0;
        events.push(GameEvent::PlayerRespawned);
    } else {
        events.push(GameEvent::PlayerDied);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::levels::rows_to_grid;

    const DT: f32 = 1.0 / 60.0;

    fn level_from(rows: &[&str]) -> Level {
        Level::from_grid(1, &rows_to_grid(rows))
    }

    fn playing(level: &Level, lives: u32) -> Player {
        let start = level.player_start();
        Player::new(start.x, start.y, lives)
    }

    fn run(
        level: &mut Level,
        player: &mut Player,
        input: InputSnapshot,
        ticks: usize,
    ) -> Vec<GameEvent> {
        let phys = PhysicsConfig::default();
        let mut all = Vec::new();
        for _ in 0..ticks {
            all.extend(step(level, player, &phys, &input, DT));
        }
        all
    }

    #[test]
    fn clamp_delta_caps_stalls() {
        let max = 1.0 / 30.0;
        assert_eq!(clamp_delta(0.016, max), 0.016);
        assert_eq!(clamp_delta(0.5, max), max);
    }

    #[test]
    fn empty_level_is_a_noop() {
        let mut level = Level::from_grid(1, &[]);
        let mut player = Player::new(10.0, 10.0, 3);
        let events = run(&mut level, &mut player, InputSnapshot::default(), 5);
        assert!(events.is_empty());
        assert_eq!(player.position.y, 10.0);
    }

    #[test]
    fn walk_collect_and_exit() {
        let mut level = level_from(&[
            "P.c..D...",
            "#########",
        ]);
        let mut player = playing(&level, 3);
        let input = InputSnapshot {
            right: true,
            ..Default::default()
        };
        let events = run(&mut level, &mut player, input, 90);

        assert!(events
            .iter()
            .any(|e| matches!(e, GameEvent::ItemCollected { kind: CollectibleKind::Coin, points: 100 })));
        assert!(events.iter().any(|e| matches!(e, GameEvent::LevelCompleted)));
        assert_eq!(player.score, 100);
        // Clamped at the right edge, never out of the world
        assert!(player.position.x <= 9.0 * TILE_SIZE - PLAYER_W + 1e-3);
    }

    #[test]
    fn exit_without_collecting_is_not_completion() {
        let mut level = level_from(&[
            "P....D..c",
            "#########",
        ]);
        let mut player = playing(&level, 3);
        // Walk just far enough to stand in the doorway
        let input = InputSnapshot {
            right: true,
            ..Default::default()
        };
        let events = run(&mut level, &mut player, input, 30);
        assert!(level.exit_reached(player.position));
        assert!(!events.iter().any(|e| matches!(e, GameEvent::LevelCompleted)));
    }

    #[test]
    fn gem_princess_chain() {
        let mut level = level_from(&[
            "P.g.p..D",
            "########",
        ]);
        let mut player = playing(&level, 3);
        let input = InputSnapshot {
            right: true,
            ..Default::default()
        };
        let events = run(&mut level, &mut player, input, 120);

        assert!(events.iter().any(|e| matches!(e, GameEvent::PrincessSpawned)));
        assert!(events
            .iter()
            .any(|e| matches!(e, GameEvent::ItemCollected { kind: CollectibleKind::Princess, .. })));
        assert!(events.iter().any(|e| matches!(e, GameEvent::LevelCompleted)));
        assert_eq!(player.score, 500);
        assert!(level.diamond_collected);
        assert!(level.princess_collected);
    }

    #[test]
    fn hazard_on_last_life_kills() {
        let mut level = level_from(&[
            "P^......",
            "########",
        ]);
        let mut player = playing(&level, 1);
        let input = InputSnapshot {
            right: true,
            ..Default::default()
        };
        let events = run(&mut level, &mut player, input, 30);

        assert!(events.iter().any(|e| matches!(e, GameEvent::PlayerDamaged)));
        assert!(events.iter().any(|e| matches!(e, GameEvent::PlayerDied)));
        assert!(!player.is_alive);
        assert_eq!(player.lives, 0);
    }

    /// Walk right until the first PlayerDamaged event, then stop.
    fn walk_until_damaged(level: &mut Level, player: &mut Player, max_ticks: usize) -> bool {
        let phys = PhysicsConfig::default();
        let input = InputSnapshot {
            right: true,
            ..Default::default()
        };
        for _ in 0..max_ticks {
            let events = step(level, player, &phys, &input, DT);
            if events.iter().any(|e| matches!(e, GameEvent::PlayerDamaged)) {
                return true;
            }
        }
        false
    }

    #[test]
    fn hazard_respawn_is_one_hit() {
        let mut level = level_from(&[
            "P..^....",
            "########",
        ]);
        let mut player = playing(&level, 3);
        // One brush with the spikes costs exactly one life and teleports home
        assert!(walk_until_damaged(&mut level, &mut player, 120));
        assert_eq!(player.lives, 2);
        assert_eq!(player.position.x, level.player_start().x);
    }

    #[test]
    fn key_survives_respawn() {
        let mut level = level_from(&[
            "Pk.^....",
            "########",
        ]);
        let mut player = playing(&level, 3);
        assert!(walk_until_damaged(&mut level, &mut player, 120));
        assert_eq!(player.lives, 2);
        assert!(player.has_key);
    }

    #[test]
    fn platform_ride_tracks_displacement() {
        // A lone moving platform; the player drops onto it and rides.
        let mut level = level_from(&[
            "..P.....",
            "..=.....",
        ]);
        let mut player = playing(&level, 3);
        let start_x = player.position.x;
        run(&mut level, &mut player, InputSnapshot::default(), 60);

        assert!(player.is_grounded);
        // Feet planted on the platform's top edge
        let plat = &level.platforms[0];
        assert!((player.collision_box().bottom() - plat.bounds().y).abs() < 1e-3);
        // Carried to the right without any input
        assert!(player.position.x > start_x + 10.0);
    }

    #[test]
    fn platform_side_blocks_like_a_wall() {
        // The platform's top sits above the stand tolerance, so walking
        // into it must clamp to its near edge, not pass through.
        let mut level = level_from(&[
            "P.......",
            ".....=..",
            "########",
        ]);
        let mut player = playing(&level, 3);
        let input = InputSnapshot {
            right: true,
            ..Default::default()
        };
        run(&mut level, &mut player, input, 200);

        let plat = level.platforms[0].bounds();
        let pbox = player.collision_box();
        assert!(!pbox.intersects(&plat));
        assert!((pbox.right() - plat.x).abs() < 1e-3);
        assert_eq!(player.velocity.x, 0.0);
    }

    #[test]
    fn world_top_clamps_a_rising_player() {
        let mut level = level_from(&[
            "P.......",
            "........",
            "########",
        ]);
        let mut player = playing(&level, 3);
        let phys = PhysicsConfig::default();
        let input = InputSnapshot {
            jump: true,
            ..Default::default()
        };
        let mut touched_top = false;
        for _ in 0..180 {
            step(&mut level, &mut player, &phys, &input, DT);
            assert!(player.position.y >= 0.0);
            if player.position.y == 0.0 {
                touched_top = true;
            }
        }
        assert!(touched_top);
        assert_eq!(player.lives, 3);
    }

    #[test]
    fn falling_out_of_the_world_costs_a_life() {
        let mut level = level_from(&[
            "P.......",
            "........",
        ]);
        let mut player = playing(&level, 3);
        let phys = PhysicsConfig::default();
        let input = InputSnapshot::default();
        let mut damaged = false;
        for _ in 0..120 {
            let events = step(&mut level, &mut player, &phys, &input, DT);
            if events.iter().any(|e| matches!(e, GameEvent::PlayerDamaged)) {
                damaged = true;
                break;
            }
        }
        assert!(damaged);
        assert_eq!(player.lives, 2);
    }

    #[test]
    fn jump_clears_a_low_wall() {
        let mut level = level_from(&[
            "........",
            "P.......",
            "...#....",
            "########",
        ]);
        let mut player = playing(&level, 3);
        let input = InputSnapshot {
            right: true,
            jump: true,
            ..Default::default()
        };
        run(&mut level, &mut player, input, 150);
        // Carried over the wall, not stuck against it
        assert!(player.position.x > 4.0 * TILE_SIZE);
    }
}

/// A play session: owns the level, the player, the shared game state, and
/// the screen state machine that ties them together. The frontend drives it
/// with one `update` per frame and reads whatever it needs for drawing.

use crate::config::GameConfig;
use crate::domain::player::{InputSnapshot, Player};
use crate::sim::event::GameEvent;
use crate::sim::level::Level;
use crate::sim::levels;
use crate::sim::step;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Screen {
    Loading,
    Menu,
    Playing,
    Paused,
    GameOver,
    LevelComplete,
    Victory,
}

/// Session-wide bookkeeping mirrored from the player each tick.
#[derive(Clone, Debug)]
pub struct GameState {
    pub score: u32,
    pub lives: u32,
    pub current_level: u32,
    pub is_paused: bool,
    pub is_game_over: bool,
    pub is_level_complete: bool,
}

impl GameState {
    fn new(lives: u32) -> Self {
        GameState {
            score: 0,
            lives,
            current_level: 1,
            is_paused: false,
            is_game_over: false,
            is_level_complete: false,
        }
    }
}

pub struct Session {
    pub level: Level,
    pub player: Player,
    pub state: GameState,
    pub screen: Screen,
    pub message: String,
    pub message_timer: u32,
    pub anim_tick: u32,
    phys: crate::config::PhysicsConfig,
    start_lives: u32,
}

impl Session {
    pub fn new(config: &GameConfig) -> Self {
        let level = load_level(1);
        let start = level.player_start();
        let player = Player::new(start.x, start.y, config.lives);
        Session {
            level,
            player,
            state: GameState::new(config.lives),
            screen: Screen::Loading,
            message: String::new(),
            message_timer: 0,
            anim_tick: 0,
            phys: config.physics.clone(),
            start_lives: config.lives,
        }
    }

    pub fn set_message(&mut self, text: &str, ticks: u32) {
        self.message = text.to_string();
        self.message_timer = ticks;
    }

    /// One frame. Edge-triggered inputs drive screen transitions; the
    /// simulation itself runs only while Playing.
    pub fn update(&mut self, dt: f32, input: &InputSnapshot) {
        self.anim_tick = self.anim_tick.wrapping_add(1);
        if self.message_timer > 0 {
            self.message_timer -= 1;
            if self.message_timer == 0 {
                self.message.clear();
            }
        }

        match self.screen {
            Screen::Loading => {
                // Everything is embedded; there is nothing to wait for
                self.screen = Screen::Menu;
            }
            Screen::Menu => {
                if input.jump_pressed {
                    self.new_game();
                }
            }
            Screen::Playing => {
                if input.pause_pressed {
                    self.state.is_paused = true;
                    self.screen = Screen::Paused;
                    return;
                }
                let events = step::step(&mut self.level, &mut self.player, &self.phys, input, dt);
                self.state.score = self.player.score;
                self.state.lives = self.player.lives;
                self.consume_events(&events);

                if !self.player.is_alive {
                    self.state.is_game_over = true;
                    self.screen = Screen::GameOver;
                } else if events
                    .iter()
                    .any(|e| matches!(e, GameEvent::LevelCompleted))
                {
                    self.state.is_level_complete = true;
                    self.screen = Screen::LevelComplete;
                }
            }
            Screen::Paused => {
                if input.pause_pressed {
                    self.state.is_paused = false;
                    self.screen = Screen::Playing;
                }
            }
            Screen::GameOver => {
                if input.jump_pressed {
                    self.restart();
                }
            }
            Screen::LevelComplete => {
                if input.jump_pressed {
                    self.next_level();
                }
            }
            Screen::Victory => {
                if input.jump_pressed || input.action_pressed {
                    self.screen = Screen::Menu;
                }
            }
        }
    }

    fn consume_events(&mut self, events: &[GameEvent]) {
        for event in events {
            match event {
                GameEvent::ItemCollected { points, .. } if *points > 0 => {
                    self.set_message(&format!("+{points}"), 30);
                }
                GameEvent::ItemCollected { .. } => {
                    self.set_message("Rescued!", 45);
                }
                GameEvent::KeyCollected => self.set_message("Got a key!", 45),
                GameEvent::DoorsUnlocked { count } => {
                    if *count == 1 {
                        self.set_message("A door unlocks...", 45);
                    } else {
                        self.set_message(&format!("{count} doors unlock..."), 45);
                    }
                }
                GameEvent::PrincessSpawned => self.set_message("The princess appears!", 60),
                GameEvent::PlayerRespawned => self.set_message("Ouch!", 30),
                GameEvent::PlayerDamaged
                | GameEvent::PlayerDied
                | GameEvent::LevelCompleted => {}
            }
        }
    }

    /// Fresh run from level 1 with a brand-new player.
    pub fn new_game(&mut self) {
        self.state = GameState::new(self.start_lives);
        self.level = load_level(1);
        let start = self.level.player_start();
        self.player = Player::new(start.x, start.y, self.start_lives);
        self.message.clear();
        self.message_timer = 0;
        self.screen = Screen::Playing;
    }

    /// Retry the current level after a game over: same level, reset
    /// progression, full lives, zero score.
    pub fn restart(&mut self) {
        self.level.reset();
        let start = self.level.player_start();
        self.player.reset(start.x, start.y);
        self.player.lives = self.start_lives;
        self.player.score = 0;
        self.state.score = 0;
        self.state.lives = self.start_lives;
        self.state.is_game_over = false;
        self.screen = Screen::Playing;
    }

    /// Advance past a completed level, or into the victory screen when the
    /// level table runs out. Score and lives carry over.
    pub fn next_level(&mut self) {
        self.state.is_level_complete = false;
        let next = self.state.current_level + 1;
        match levels::level_grid(next) {
            Some(grid) => {
                self.state.current_level = next;
                self.level = Level::from_grid(next, &grid);
                let start = self.level.player_start();
                self.player.reset(start.x, start.y);
                self.screen = Screen::Playing;
            }
            None => {
                self.screen = Screen::Victory;
            }
        }
    }
}

fn load_level(number: u32) -> Level {
    match levels::level_grid(number) {
        Some(grid) => Level::from_grid(number, &grid),
        None => {
            eprintln!("Warning: no level {number} in the built-in table");
            Level::from_grid(number, &[])
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GameConfig;

    const DT: f32 = 1.0 / 60.0;

    fn session() -> Session {
        let config = GameConfig {
            physics: crate::config::PhysicsConfig::default(),
            lives: 3,
            theme: crate::config::ThemeConfig::default(),
            gamepad: crate::config::GamepadConfig {
                jump: vec![],
                action: vec![],
                confirm: vec![],
                cancel: vec![],
                pause: vec![],
            },
        };
        Session::new(&config)
    }

    fn jump_edge() -> InputSnapshot {
        InputSnapshot {
            jump_pressed: true,
            ..Default::default()
        }
    }

    fn pause_edge() -> InputSnapshot {
        InputSnapshot {
            pause_pressed: true,
            ..Default::default()
        }
    }

    #[test]
    fn boot_flows_to_menu() {
        let mut s = session();
        assert_eq!(s.screen, Screen::Loading);
        s.update(DT, &InputSnapshot::default());
        assert_eq!(s.screen, Screen::Menu);
    }

    #[test]
    fn menu_starts_a_game_on_jump() {
        let mut s = session();
        s.update(DT, &InputSnapshot::default());
        s.update(DT, &jump_edge());
        assert_eq!(s.screen, Screen::Playing);
        assert_eq!(s.state.current_level, 1);
        assert_eq!(s.state.lives, 3);
        assert_eq!(s.player.position, s.level.player_start());
    }

    #[test]
    fn pause_freezes_the_simulation() {
        let mut s = session();
        s.update(DT, &InputSnapshot::default());
        s.update(DT, &jump_edge());

        s.update(DT, &pause_edge());
        assert_eq!(s.screen, Screen::Paused);
        assert!(s.state.is_paused);

        let pos = s.player.position;
        for _ in 0..10 {
            s.update(DT, &InputSnapshot::default());
        }
        assert_eq!(s.player.position, pos);

        s.update(DT, &pause_edge());
        assert_eq!(s.screen, Screen::Playing);
        assert!(!s.state.is_paused);
    }

    #[test]
    fn death_goes_to_game_over_and_restart_recovers() {
        let mut s = session();
        s.update(DT, &InputSnapshot::default());
        s.update(DT, &jump_edge());

        s.player.score = 4200;
        s.player.lives = 1;
        s.player.take_damage();
        assert!(!s.player.is_alive);
        s.update(DT, &InputSnapshot::default());
        assert_eq!(s.screen, Screen::GameOver);
        assert!(s.state.is_game_over);

        s.update(DT, &jump_edge());
        assert_eq!(s.screen, Screen::Playing);
        assert!(s.player.is_alive);
        assert_eq!(s.player.lives, 3);
        assert_eq!(s.state.score, 0);
        assert!(!s.state.is_game_over);
        assert_eq!(s.level.collected_count(), 0);
    }

    #[test]
    fn level_complete_advances_and_victory_after_last() {
        let mut s = session();
        s.update(DT, &InputSnapshot::default());
        s.update(DT, &jump_edge());
        s.player.score = 900;

        // Walk the whole table
        for expected in 2..=levels::LEVEL_COUNT {
            s.screen = Screen::LevelComplete;
            s.update(DT, &jump_edge());
            assert_eq!(s.screen, Screen::Playing);
            assert_eq!(s.state.current_level, expected);
            assert_eq!(s.level.number, expected);
            // Score carries across levels
            assert_eq!(s.player.score, 900);
        }

        s.screen = Screen::LevelComplete;
        s.update(DT, &jump_edge());
        assert_eq!(s.screen, Screen::Victory);

        s.update(DT, &jump_edge());
        assert_eq!(s.screen, Screen::Menu);
    }

    #[test]
    fn message_timer_expires() {
        let mut s = session();
        s.set_message("hello", 2);
        s.update(DT, &InputSnapshot::default());
        assert_eq!(s.message, "hello");
        s.update(DT, &InputSnapshot::default());
        assert!(s.message.is_empty());
    }
}

/// The player entity: movement intent, integration, collision responses,
/// inventory, and animation bookkeeping. Pure data + methods; tile queries
/// and resolution order live in the sim layer.

use crate::config::PhysicsConfig;
use crate::domain::geom::{Aabb, Vec2};

pub const PLAYER_W: f32 = 16.0;
pub const PLAYER_H: f32 = 24.0;

// Collision box inset relative to the sprite rectangle.
// Slightly narrower than the sprite so brushing a wall edge doesn't snag.
const BOX_OFF_X: f32 = 2.0;
const BOX_OFF_Y: f32 = 2.0;
const BOX_W: f32 = PLAYER_W - 4.0;
const BOX_H: f32 = PLAYER_H - 2.0;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum PlayerState {
    Idle,
    Walking,
    Jumping,
    Falling,
    Climbing,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Facing {
    Left,
    Right,
}

/// One tick's worth of player intent, sampled by the frontend.
/// `*_pressed` fields are edge-triggered; the rest are level-triggered.
#[derive(Clone, Copy, Debug, Default)]
pub struct InputSnapshot {
    pub left: bool,
    pub right: bool,
    pub up: bool,
    pub down: bool,
    pub jump: bool,
    pub jump_pressed: bool,
    pub action_pressed: bool,
    pub pause_pressed: bool,
}

#[derive(Clone, Debug)]
pub struct Player {
    pub position: Vec2,
    pub velocity: Vec2,
    pub state: PlayerState,
    pub facing: Facing,
    pub is_grounded: bool,
    pub is_climbing: bool,
    pub is_alive: bool,
    pub lives: u32,
    pub score: u32,
    pub has_gun: bool,
    pub has_key: bool,
    pub has_trophy: bool,
    pub anim_frame: u32,
    anim_timer: f32,
}

impl Player {
    pub fn new(x: f32, y: f32, lives: u32) -> Self {
        Player {
            position: Vec2::new(x, y),
            velocity: Vec2::default(),
            state: PlayerState::Idle,
            facing: Facing::Right,
            is_grounded: false,
            is_climbing: false,
            is_alive: true,
            lives,
            score: 0,
            has_gun: false,
            has_key: false,
            has_trophy: false,
            anim_frame: 0,
            anim_timer: 0.0,
        }
    }

    /// Collision box: sprite rect with the inset applied.
    pub fn collision_box(&self) -> Aabb {
        Aabb::new(
            self.position.x + BOX_OFF_X,
            self.position.y + BOX_OFF_Y,
            BOX_W,
            BOX_H,
        )
    }

    /// Translate intent into velocity. Horizontal speed is set directly
    /// (no acceleration ramp). `on_ladder` is whether the collision box
    /// currently overlaps a climbable tile.
    pub fn apply_input(&mut self, input: &InputSnapshot, on_ladder: bool, phys: &PhysicsConfig) {
        if !self.is_alive {
            self.velocity.x = 0.0;
            return;
        }

        self.velocity.x = 0.0;
        if input.left {
            self.velocity.x = -phys.walk_speed;
            self.facing = Facing::Left;
        }
        if input.right {
            self.velocity.x = phys.walk_speed;
            self.facing = Facing::Right;
        }

        if on_ladder && (input.up || input.down) {
            self.is_climbing = true;
            self.is_grounded = false;
            self.velocity.y = if input.up {
                -phys.climb_speed
            } else {
                phys.climb_speed
            };
        } else if self.is_climbing && on_ladder {
            // Holding position on the ladder
            self.velocity.y = 0.0;
        }

        if input.jump && (self.is_grounded || self.is_climbing) {
            self.velocity.y = -phys.jump_force;
            self.is_grounded = false;
            self.is_climbing = false;
        }

        if input.action_pressed && !self.is_climbing {
            self.shoot();
        }
    }

    /// Semi-implicit Euler: gravity into velocity first, then position.
    pub fn integrate(&mut self, dt: f32, phys: &PhysicsConfig) {
        if !self.is_climbing {
            self.velocity.y += phys.gravity * dt;
            if self.velocity.y > phys.terminal_velocity {
                self.velocity.y = phys.terminal_velocity;
            }
        }
        self.position.x += self.velocity.x * dt;
        self.position.y += self.velocity.y * dt;
    }

    // ── Collision responses (velocity-sign guarded) ──

    /// Land on a solid surface whose top edge is at `top_y`.
    pub fn land_on(&mut self, top_y: f32) {
        self.position.y = top_y - PLAYER_H;
        if self.velocity.y > 0.0 {
            self.velocity.y = 0.0;
        }
        self.is_grounded = true;
        self.is_climbing = false;
    }

    /// Pushed out of a wall. `push_left` = the wall is to the player's right.
    pub fn hit_wall(&mut self, wall: &Aabb, push_left: bool) {
        if push_left {
            self.position.x = wall.x - BOX_OFF_X - BOX_W;
            if self.velocity.x > 0.0 {
                self.velocity.x = 0.0;
            }
        } else {
            self.position.x = wall.right() - BOX_OFF_X;
            if self.velocity.x < 0.0 {
                self.velocity.x = 0.0;
            }
        }
    }

    /// Head bumped a ceiling whose bottom edge is at `bottom_y`.
    pub fn bump_ceiling(&mut self, bottom_y: f32) {
        self.position.y = bottom_y - BOX_OFF_Y;
        if self.velocity.y < 0.0 {
            self.velocity.y = 0.0;
        }
    }

    // ── Life and inventory ──

    pub fn take_damage(&mut self) {
        if !self.is_alive {
            return;
        }
        self.lives = self.lives.saturating_sub(1);
        if self.lives == 0 {
            self.is_alive = false;
        }
    }

    /// Score-side effect of a pickup. Zero points is the key sentinel;
    /// the trophy point value flags the trophy held.
    pub fn collect_item(&mut self, points: u32) {
        if points == 0 {
            self.has_key = true;
            return;
        }
        if points == crate::domain::tile::CollectibleKind::Trophy.points() {
            self.has_trophy = true;
        }
        self.score += points;
    }

    /// Full respawn-to-defaults at (x, y). Lives and score are kept;
    /// inventory is cleared (respawn and level-entry share this path).
    pub fn reset(&mut self, x: f32, y: f32) {
        self.position = Vec2::new(x, y);
        self.velocity = Vec2::default();
        self.state = PlayerState::Idle;
        self.facing = Facing::Right;
        self.is_grounded = false;
        self.is_climbing = false;
        self.is_alive = true;
        self.has_gun = false;
        self.has_key = false;
        self.has_trophy = false;
        self.anim_frame = 0;
        self.anim_timer = 0.0;
    }

    fn shoot(&mut self) {
        // Gun pickup is not placed by any current level; stub until it is.
        if self.has_gun {}
    }

    /// Derive the animation state from physics results.
    /// Climbing wins, then airborne by vy sign, then walking, then idle.
    pub fn update_state(&mut self) {
        self.state = if self.is_climbing {
            PlayerState::Climbing
        } else if !self.is_grounded {
            if self.velocity.y < 0.0 {
                PlayerState::Jumping
            } else {
                PlayerState::Falling
            }
        } else if self.velocity.x.abs() > 0.1 {
            PlayerState::Walking
        } else {
            PlayerState::Idle
        };
    }

    pub fn update_animation(&mut self, dt: f32) {
        let (interval, frames) = match self.state {
            PlayerState::Walking => (0.12, 4),
            PlayerState::Climbing => (0.2, 2),
            PlayerState::Idle => (0.4, 2),
            PlayerState::Jumping | PlayerState::Falling => (0.0, 1),
        };
        if frames <= 1 {
            self.anim_frame = 0;
            self.anim_timer = 0.0;
            return;
        }
        self.anim_timer += dt;
        if self.anim_timer >= interval {
            self.anim_timer = 0.0;
            self.anim_frame = (self.anim_frame + 1) % frames;
        }
    }
}

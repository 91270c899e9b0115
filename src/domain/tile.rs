/// Tile types, collectibles, and moving bodies.
/// Tile properties are queried via methods, not stored as flags,
/// so tile semantics are centralized here.

use crate::domain::geom::{Aabb, Vec2};

/// Side length of one grid cell in logical pixels.
pub const TILE_SIZE: f32 = 16.0;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum TileKind {
    Empty,
    Ground,
    Platform,
    Wall,
    Spikes,
    Door,       // level exit
    LockedDoor, // solid until a key unlocks it
    Trophy,
    Coin,
    Ladder,
}

impl TileKind {
    /// Does this tile block movement?
    pub fn is_solid(self) -> bool {
        matches!(
            self,
            TileKind::Ground | TileKind::Platform | TileKind::Wall | TileKind::LockedDoor
        )
    }

    /// Does touching this tile hurt the player?
    pub fn is_dangerous(self) -> bool {
        matches!(self, TileKind::Spikes)
    }

    /// Is this tile picked up on contact?
    pub fn is_collectible(self) -> bool {
        matches!(self, TileKind::Trophy | TileKind::Coin)
    }

    /// Can the player move up/down through this tile?
    pub fn is_climbable(self) -> bool {
        matches!(self, TileKind::Ladder)
    }
}

impl Default for TileKind {
    fn default() -> Self {
        TileKind::Empty
    }
}

/// A tile instance placed in the world: kind plus its pixel-space bounds.
#[derive(Clone, Copy, Debug)]
pub struct Tile {
    pub kind: TileKind,
    pub bounds: Aabb,
}

impl Tile {
    pub fn at_cell(kind: TileKind, col: usize, row: usize) -> Self {
        Tile {
            kind,
            bounds: Aabb::new(
                col as f32 * TILE_SIZE,
                row as f32 * TILE_SIZE,
                TILE_SIZE,
                TILE_SIZE,
            ),
        }
    }
}

// ── Collectibles ──

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum CollectibleKind {
    Trophy,
    Coin,
    Gem,
    Key,
    Princess,
}

impl CollectibleKind {
    pub fn points(self) -> u32 {
        match self {
            CollectibleKind::Trophy => 1000,
            CollectibleKind::Coin => 100,
            CollectibleKind::Gem => 500,
            CollectibleKind::Key => 0,
            CollectibleKind::Princess => 0,
        }
    }
}

#[derive(Clone, Copy, Debug)]
pub struct Collectible {
    pub kind: CollectibleKind,
    pub bounds: Aabb,
    pub collected: bool,
}

impl Collectible {
    pub fn at_cell(kind: CollectibleKind, col: usize, row: usize) -> Self {
        Collectible {
            kind,
            bounds: Aabb::new(
                col as f32 * TILE_SIZE,
                row as f32 * TILE_SIZE,
                TILE_SIZE,
                TILE_SIZE,
            ),
            collected: false,
        }
    }
}

// ── Moving bodies (patrolling platforms and enemies) ──

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum MovingKind {
    Platform,
    Enemy,
}

/// A body patrolling horizontally between `min_x` and `max_x`, reflecting at
/// the ends. Platforms carry the player; enemies hurt on contact.
#[derive(Clone, Copy, Debug)]
pub struct MovingBody {
    pub kind: MovingKind,
    pub pos: Vec2,
    pub start: Vec2,
    pub min_x: f32,
    pub max_x: f32,
    pub speed: f32,
    pub dir: f32, // +1.0 or -1.0
    pub w: f32,
    pub h: f32,
    /// Horizontal displacement applied during the last advance() call.
    /// Riders are carried by this amount.
    pub last_dx: f32,
}

impl MovingBody {
    pub fn new(kind: MovingKind, x: f32, y: f32, range: f32, speed: f32, w: f32) -> Self {
        MovingBody {
            kind,
            pos: Vec2::new(x, y),
            start: Vec2::new(x, y),
            min_x: (x - range).max(0.0),
            max_x: x + range,
            speed,
            dir: 1.0,
            w,
            h: TILE_SIZE,
            last_dx: 0.0,
        }
    }

    pub fn bounds(&self) -> Aabb {
        Aabb::new(self.pos.x, self.pos.y, self.w, self.h)
    }

    /// Linear motion with reflection at the patrol bounds.
    /// Position is clamped back into range on reversal so a large `dt`
    /// can't leave the body outside its patrol segment.
    pub fn advance(&mut self, dt: f32) {
        let before = self.pos.x;
        self.pos.x += self.speed * self.dir * dt;
        if self.pos.x <= self.min_x {
            self.pos.x = self.min_x;
            self.dir = 1.0;
        } else if self.pos.x >= self.max_x {
            self.pos.x = self.max_x;
            self.dir = -1.0;
        }
        self.last_dx = self.pos.x - before;
    }

    pub fn collides_with(&self, other: &Aabb) -> bool {
        self.bounds().intersects(other)
    }

    /// Back to the seeded patrol position.
    pub fn reset(&mut self) {
        self.pos = self.start;
        self.dir = 1.0;
        self.last_dx = 0.0;
    }
}

/// Level data: the static tile grid, collectibles, moving bodies, and the
/// unlock/completion bookkeeping. Parsed from a rectangular grid of numeric
/// cell codes; queries are pixel-space AABB probes that scan only the cell
/// range the probe box spans.

use crate::domain::geom::{Aabb, Vec2};
use crate::domain::player::{PLAYER_H, PLAYER_W};
use crate::domain::tile::{
    Collectible, CollectibleKind, MovingBody, MovingKind, Tile, TileKind, TILE_SIZE,
};

/// Grid cell codes:
///   1 ground, 2 exit door, 3 coin, 4 ladder, 5 trophy, 6 spikes, 7 gem,
///   9 moving-platform seed, 10 moving-enemy seed, 12 key, 13 locked door,
///   15 princess spawn marker. `PlayerStart` overrides the default start.
///   Anything else is empty.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum GridCell {
    Code(u8),
    PlayerStart,
}

const PLATFORM_RANGE: f32 = 5.0 * TILE_SIZE;
const PLATFORM_SPEED: f32 = 40.0;
const PLATFORM_WIDTH: f32 = 3.0 * TILE_SIZE;
const ENEMY_RANGE: f32 = 3.0 * TILE_SIZE;
const ENEMY_SPEED: f32 = 30.0;

const DEFAULT_START: Vec2 = Vec2 { x: 32.0, y: 400.0 };

pub struct Level {
    pub number: u32,
    pub width: usize,
    pub height: usize,
    grid: Vec<TileKind>,
    pub collectibles: Vec<Collectible>,
    pub platforms: Vec<MovingBody>,
    pub enemies: Vec<MovingBody>,
    pub exit: Option<Aabb>,
    start: Vec2,
    princess_marker: Option<Vec2>,
    locked_door_cells: Vec<(usize, usize)>,

    // Progression state
    pub total_collectibles: usize,
    pub keys_collected: u32,
    pub doors_unlocked: u32,
    pub diamond_collected: bool,
    pub princess_collected: bool,
    princess_spawned: bool,
    has_gem: bool,
    has_key: bool,
}

impl Level {
    /// Parse a rectangular grid of cell codes. Malformed input (no rows,
    /// zero columns, ragged rows) logs a warning and yields an empty level.
    pub fn from_grid(number: u32, rows: &[Vec<GridCell>]) -> Self {
        let height = rows.len();
        let width = rows.first().map_or(0, |r| r.len());
        if height == 0 || width == 0 || rows.iter().any(|r| r.len() != width) {
            eprintln!("Warning: level {number} grid is malformed; loading empty level");
            return Self::empty(number);
        }

        let mut level = Self::empty(number);
        level.width = width;
        level.height = height;
        level.grid = vec![TileKind::Empty; width * height];

        for (row, cells) in rows.iter().enumerate() {
            for (col, cell) in cells.iter().enumerate() {
                let (x, y) = (col as f32 * TILE_SIZE, row as f32 * TILE_SIZE);
                let code = match cell {
                    GridCell::PlayerStart => {
                        level.start = Vec2::new(x, y);
                        continue;
                    }
                    GridCell::Code(c) => *c,
                };
                match code {
                    1 => level.grid[row * width + col] = TileKind::Ground,
                    2 => {
                        level.grid[row * width + col] = TileKind::Door;
                        level.exit = Some(Aabb::new(x, y, TILE_SIZE, TILE_SIZE));
                    }
                    3 => level
                        .collectibles
                        .push(Collectible::at_cell(CollectibleKind::Coin, col, row)),
                    4 => level.grid[row * width + col] = TileKind::Ladder,
                    5 => level
                        .collectibles
                        .push(Collectible::at_cell(CollectibleKind::Trophy, col, row)),
                    6 => level.grid[row * width + col] = TileKind::Spikes,
                    7 => {
                        level
                            .collectibles
                            .push(Collectible::at_cell(CollectibleKind::Gem, col, row));
                        level.has_gem = true;
                    }
                    9 => level.platforms.push(MovingBody::new(
                        MovingKind::Platform,
                        x,
                        y,
                        PLATFORM_RANGE,
                        PLATFORM_SPEED,
                        PLATFORM_WIDTH,
                    )),
                    10 => level.enemies.push(MovingBody::new(
                        MovingKind::Enemy,
                        x,
                        y,
                        ENEMY_RANGE,
                        ENEMY_SPEED,
                        TILE_SIZE,
                    )),
                    12 => {
                        level
                            .collectibles
                            .push(Collectible::at_cell(CollectibleKind::Key, col, row));
                        level.has_key = true;
                    }
                    13 => {
                        level.grid[row * width + col] = TileKind::LockedDoor;
                        level.locked_door_cells.push((col, row));
                    }
                    15 => level.princess_marker = Some(Vec2::new(x, y)),
                    _ => {}
                }
            }
        }

        level.total_collectibles = level.collectibles.len();
        level
    }

    fn empty(number: u32) -> Self {
        Level {
            number,
            width: 0,
            height: 0,
            grid: Vec::new(),
            collectibles: Vec::new(),
            platforms: Vec::new(),
            enemies: Vec::new(),
            exit: None,
            start: DEFAULT_START,
            princess_marker: None,
            locked_door_cells: Vec::new(),
            total_collectibles: 0,
            keys_collected: 0,
            doors_unlocked: 0,
            diamond_collected: false,
            princess_collected: false,
            princess_spawned: false,
            has_gem: false,
            has_key: false,
        }
    }

    pub fn player_start(&self) -> Vec2 {
        self.start
    }

    pub fn tile_at(&self, col: usize, row: usize) -> TileKind {
        if col < self.width && row < self.height {
            self.grid[row * self.width + col]
        } else {
            TileKind::Empty
        }
    }

    /// Cell range spanned by a pixel-space box, clamped to the grid.
    fn cell_range(&self, probe: &Aabb) -> (usize, usize, usize, usize) {
        let col0 = (probe.x / TILE_SIZE).floor().max(0.0) as usize;
        let row0 = (probe.y / TILE_SIZE).floor().max(0.0) as usize;
        let col1 = ((probe.right() / TILE_SIZE).floor() as usize).min(self.width.saturating_sub(1));
        let row1 =
            ((probe.bottom() / TILE_SIZE).floor() as usize).min(self.height.saturating_sub(1));
        (col0, row0, col1, row1)
    }

    /// All solid, dangerous, or climbable tiles overlapping the probe box.
    pub fn tile_collisions(&self, probe: &Aabb) -> Vec<Tile> {
        let mut hits = Vec::new();
        if self.width == 0 || self.height == 0 {
            return hits;
        }
        let (col0, row0, col1, row1) = self.cell_range(probe);
        for row in row0..=row1 {
            for col in col0..=col1 {
                let kind = self.grid[row * self.width + col];
                if !(kind.is_solid() || kind.is_dangerous() || kind.is_climbable()) {
                    continue;
                }
                let tile = Tile::at_cell(kind, col, row);
                if tile.bounds.intersects(probe) {
                    hits.push(tile);
                }
            }
        }
        hits
    }

    /// Indices of uncollected collectibles overlapping the probe box.
    pub fn collectibles_hit(&self, probe: &Aabb) -> Vec<usize> {
        self.collectibles
            .iter()
            .enumerate()
            .filter(|(_, c)| !c.collected && c.bounds.intersects(probe))
            .map(|(i, _)| i)
            .collect()
    }

    /// Mark a collectible picked up and apply its level-side effects.
    /// Idempotent: an already-collected index yields 0 and no effects.
    pub fn collect(&mut self, idx: usize) -> u32 {
        let Some(c) = self.collectibles.get_mut(idx) else {
            return 0;
        };
        if c.collected {
            return 0;
        }
        c.collected = true;
        let kind = c.kind;

        match kind {
            CollectibleKind::Key => {
                self.keys_collected += 1;
                self.unlock_doors();
            }
            CollectibleKind::Gem => {
                self.diamond_collected = true;
                self.spawn_princess();
            }
            CollectibleKind::Princess => {
                self.princess_collected = true;
            }
            CollectibleKind::Trophy | CollectibleKind::Coin => {}
        }
        kind.points()
    }

    /// Unlock locked doors in grid scan order, never more doors in total
    /// than keys collected.
    fn unlock_doors(&mut self) {
        for &(col, row) in &self.locked_door_cells {
            if self.doors_unlocked >= self.keys_collected {
                break;
            }
            let slot = &mut self.grid[row * self.width + col];
            if *slot == TileKind::LockedDoor {
                *slot = TileKind::Empty;
                self.doors_unlocked += 1;
            }
        }
    }

    /// The princess appears at her marker the first time the gem is taken.
    fn spawn_princess(&mut self) {
        if self.princess_spawned {
            return;
        }
        let Some(marker) = self.princess_marker else {
            return;
        };
        let col = (marker.x / TILE_SIZE) as usize;
        let row = (marker.y / TILE_SIZE) as usize;
        self.collectibles
            .push(Collectible::at_cell(CollectibleKind::Princess, col, row));
        self.total_collectibles += 1;
        self.princess_spawned = true;
    }

    pub fn collected_count(&self) -> usize {
        self.collectibles.iter().filter(|c| c.collected).count()
    }

    /// Would a player-sized box anchored at `pos` overlap the exit door?
    pub fn exit_reached(&self, pos: Vec2) -> bool {
        let probe = Aabb::new(pos.x, pos.y, PLAYER_W, PLAYER_H);
        self.exit.map_or(false, |door| door.intersects(&probe))
    }

    /// Everything collected, the gem chain finished (when the level has a
    /// gem), and the key held (when the level has one). The exit-overlap
    /// gate is applied by the caller.
    pub fn requirements_met(&self, player_has_key: bool) -> bool {
        let all_collected = self.collected_count() == self.total_collectibles;
        let gem_chain_done =
            !self.has_gem || (self.diamond_collected && self.princess_collected);
        let key_ok = !self.has_key || player_has_key;
        all_collected && gem_chain_done && key_ok
    }

    /// Back to the freshly-parsed state: everything uncollected, counters
    /// zeroed, spawned princess removed, doors re-locked, bodies re-seeded.
    pub fn reset(&mut self) {
        self.collectibles.retain(|c| c.kind != CollectibleKind::Princess);
        for c in &mut self.collectibles {
            c.collected = false;
        }
        self.total_collectibles = self.collectibles.len();
        self.keys_collected = 0;
        self.doors_unlocked = 0;
        self.diamond_collected = false;
        self.princess_collected = false;
        self.princess_spawned = false;
        for &(col, row) in &self.locked_door_cells {
            self.grid[row * self.width + col] = TileKind::LockedDoor;
        }
        for body in self.platforms.iter_mut().chain(self.enemies.iter_mut()) {
            body.reset();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::levels::rows_to_grid;

    fn level_from(rows: &[&str]) -> Level {
        Level::from_grid(1, &rows_to_grid(rows))
    }

    fn collect_kind(level: &mut Level, kind: CollectibleKind) -> u32 {
        let idx = level
            .collectibles
            .iter()
            .position(|c| c.kind == kind && !c.collected)
            .unwrap();
        level.collect(idx)
    }

    #[test]
    fn malformed_grid_yields_empty_level() {
        let level = Level::from_grid(7, &[]);
        assert_eq!(level.width, 0);
        assert_eq!(level.total_collectibles, 0);
        assert!(level.tile_collisions(&Aabb::new(0.0, 0.0, 100.0, 100.0)).is_empty());

        let ragged = vec![
            vec![GridCell::Code(1), GridCell::Code(1)],
            vec![GridCell::Code(1)],
        ];
        let level = Level::from_grid(7, &ragged);
        assert_eq!(level.width, 0);
    }

    #[test]
    fn parse_counts_and_start() {
        let level = level_from(&[
            "P..c..T.",
            "........",
            "#..L...D",
            "########",
        ]);
        assert_eq!(level.total_collectibles, 2);
        assert_eq!(level.player_start(), Vec2::new(0.0, 0.0));
        assert!(level.exit.is_some());
        assert_eq!(level.tile_at(3, 2), TileKind::LockedDoor);
    }

    #[test]
    fn tile_collisions_scan_only_probe_range() {
        let level = level_from(&[
            "........",
            "........",
            "........",
            "########",
        ]);
        // Probe fully in the air
        let air = Aabb::new(16.0, 0.0, 12.0, 22.0);
        assert!(level.tile_collisions(&air).is_empty());
        // Probe dipping into the floor
        let low = Aabb::new(16.0, 44.0, 12.0, 22.0);
        let hits = level.tile_collisions(&low);
        assert!(!hits.is_empty());
        assert!(hits.iter().all(|t| t.kind == TileKind::Ground));
    }

    #[test]
    fn collect_is_idempotent() {
        let mut level = level_from(&[
            "c.......",
            "########",
        ]);
        assert_eq!(level.collect(0), 100);
        assert_eq!(level.collect(0), 0);
        assert_eq!(level.collected_count(), 1);
        // Out-of-range index is a no-op
        assert_eq!(level.collect(99), 0);
    }

    #[test]
    fn key_unlocks_at_most_keys_collected_doors() {
        let mut level = level_from(&[
            "k..LL...",
            "########",
        ]);
        assert_eq!(level.tile_at(3, 0), TileKind::LockedDoor);
        collect_kind(&mut level, CollectibleKind::Key);
        assert_eq!(level.keys_collected, 1);
        assert_eq!(level.doors_unlocked, 1);
        // First door in scan order opened, second stays locked
        assert_eq!(level.tile_at(3, 0), TileKind::Empty);
        assert_eq!(level.tile_at(4, 0), TileKind::LockedDoor);
    }

    #[test]
    fn gem_spawns_princess_exactly_once() {
        let mut level = level_from(&[
            "g.p.....",
            "########",
        ]);
        assert_eq!(level.total_collectibles, 1);
        assert_eq!(collect_kind(&mut level, CollectibleKind::Gem), 500);
        assert!(level.diamond_collected);
        assert_eq!(level.total_collectibles, 2);
        let princess = level
            .collectibles
            .iter()
            .find(|c| c.kind == CollectibleKind::Princess)
            .unwrap();
        assert_eq!(princess.bounds.x, 32.0);

        // Re-collecting the gem after a partial reset path can't double-spawn
        level.spawn_princess();
        assert_eq!(level.total_collectibles, 2);
    }

    #[test]
    fn gem_without_marker_spawns_nothing() {
        let mut level = level_from(&[
            "g.......",
            "########",
        ]);
        collect_kind(&mut level, CollectibleKind::Gem);
        assert_eq!(level.total_collectibles, 1);
        // No princess to rescue means the gem chain can't finish;
        // a gem without a marker is a level-design error
        assert!(!level.requirements_met(false));
    }

    #[test]
    fn completion_conjunction() {
        let mut level = level_from(&[
            "c.g.p.k.",
            "...L...D",
            "########",
        ]);
        assert!(!level.requirements_met(true));

        collect_kind(&mut level, CollectibleKind::Coin);
        collect_kind(&mut level, CollectibleKind::Gem);
        collect_kind(&mut level, CollectibleKind::Key);
        // Princess spawned but not collected yet
        assert!(!level.requirements_met(true));

        collect_kind(&mut level, CollectibleKind::Princess);
        assert!(level.requirements_met(true));
        // Key must be held by the player at the door
        assert!(!level.requirements_met(false));
    }

    #[test]
    fn completion_without_gem_or_key() {
        let mut level = level_from(&[
            "c......D",
            "########",
        ]);
        collect_kind(&mut level, CollectibleKind::Coin);
        assert!(level.requirements_met(false));
    }

    #[test]
    fn exit_probe() {
        let level = level_from(&[
            ".......D",
            "########",
        ]);
        assert!(level.exit_reached(Vec2::new(7.0 * 16.0, 0.0)));
        assert!(level.exit_reached(Vec2::new(7.0 * 16.0 - 8.0, -10.0)));
        assert!(!level.exit_reached(Vec2::new(0.0, 0.0)));
    }

    #[test]
    fn reset_restores_parsed_state() {
        let mut level = level_from(&[
            "g.p.k.L.",
            "c......D",
            "########",
        ]);
        collect_kind(&mut level, CollectibleKind::Gem);
        collect_kind(&mut level, CollectibleKind::Key);
        collect_kind(&mut level, CollectibleKind::Princess);
        collect_kind(&mut level, CollectibleKind::Coin);
        assert_eq!(level.tile_at(6, 0), TileKind::Empty);

        level.reset();
        assert_eq!(level.collected_count(), 0);
        assert_eq!(level.total_collectibles, 3); // princess despawned
        assert_eq!(level.keys_collected, 0);
        assert_eq!(level.doors_unlocked, 0);
        assert!(!level.diamond_collected);
        assert!(!level.princess_collected);
        assert_eq!(level.tile_at(6, 0), TileKind::LockedDoor);

        // Gem chain re-arms after reset
        collect_kind(&mut level, CollectibleKind::Gem);
        assert_eq!(level.total_collectibles, 4);
    }
}

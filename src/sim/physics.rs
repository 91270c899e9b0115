/// Axis-separated tile collision resolution.
///
/// Each pass takes the tiles currently overlapping the player's collision
/// box (queried fresh by the caller), picks the single most relevant solid,
/// and applies one positional correction. Resolving one axis at a time keeps
/// corner cases stable: walking into a wall while falling corrects x first,
/// then the re-queried vertical pass lands on the floor.

use crate::domain::player::Player;
use crate::domain::tile::Tile;

/// Horizontal pass: push the player out of a wall sideways.
///
/// Tiles whose top edge sits at (or within a pixel of) the box bottom are
/// floor contacts, not walls; they are left to the vertical pass. Among the
/// rest, the closest tile by Euclidean distance from the player position to
/// the tile's top-left corner wins; ties keep the first in scan order. The
/// push side follows the x-velocity sign; a stationary overlap is left for
/// the vertical pass.
pub fn resolve_horizontal(player: &mut Player, hits: &[Tile]) {
    let pbox = player.collision_box();
    let wall = hits
        .iter()
        .filter(|t| t.kind.is_solid())
        .filter(|t| t.bounds.y < pbox.bottom() - 1.0)
        .min_by(|a, b| {
            let da = player.position.distance_to(a.bounds.top_left());
            let db = player.position.distance_to(b.bounds.top_left());
            da.partial_cmp(&db).unwrap_or(std::cmp::Ordering::Equal)
        });

    if let Some(tile) = wall {
        if player.velocity.x != 0.0 {
            player.hit_wall(&tile.bounds, player.velocity.x > 0.0);
        }
    }
}

/// Vertical pass: land on a floor or bump a ceiling, by velocity sign.
/// No solid overlap at all means the player is airborne.
pub fn resolve_vertical(player: &mut Player, hits: &[Tile]) {
    let surface = hits
        .iter()
        .filter(|t| t.kind.is_solid())
        .min_by(|a, b| {
            let da = player.position.distance_to(a.bounds.top_left());
            let db = player.position.distance_to(b.bounds.top_left());
            da.partial_cmp(&db).unwrap_or(std::cmp::Ordering::Equal)
        });

    match surface {
        Some(tile) => {
            if player.velocity.y >= 0.0 {
                player.land_on(tile.bounds.y);
            } else {
                player.bump_ceiling(tile.bounds.bottom());
            }
        }
        None => {
            player.is_grounded = false;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::player::{Player, PLAYER_H};
    use crate::domain::tile::{Tile, TileKind, TILE_SIZE};

    /// Build tiles from string rows: '#' = ground, '^' = spikes, 'H' = ladder.
    fn tiles_from(rows: &[&str]) -> Vec<Tile> {
        let mut tiles = Vec::new();
        for (row, line) in rows.iter().enumerate() {
            for (col, ch) in line.chars().enumerate() {
                let kind = match ch {
                    '#' => TileKind::Ground,
                    '^' => TileKind::Spikes,
                    'H' => TileKind::Ladder,
                    _ => continue,
                };
                tiles.push(Tile::at_cell(kind, col, row));
            }
        }
        tiles
    }

    fn overlapping<'a>(player: &Player, tiles: &'a [Tile]) -> Vec<Tile> {
        let pbox = player.collision_box();
        tiles
            .iter()
            .filter(|t| t.bounds.intersects(&pbox))
            .copied()
            .collect()
    }

    #[test]
    fn wall_push_zeroes_vx_and_separates() {
        let tiles = tiles_from(&[
            "..#",
            "..#",
            "###",
        ]);
        // Player moved right into the wall column (x = 32..48)
        let mut p = Player::new(22.0, 8.0, 3);
        p.velocity.x = 150.0;
        let hits = overlapping(&p, &tiles);
        assert!(!hits.is_empty());
        resolve_horizontal(&mut p, &hits);
        assert_eq!(p.velocity.x, 0.0);
        let pbox = p.collision_box();
        assert!(pbox.right() <= 32.0 + 1e-4);
        assert!(!tiles.iter().any(|t| t.bounds.intersects(&pbox) && t.bounds.x == 32.0));
    }

    #[test]
    fn floor_tiles_are_not_walls() {
        let tiles = tiles_from(&[
            "...",
            "...",
            "###",
        ]);
        // Feet just dipping into the floor: horizontal pass must not touch it
        let mut p = Player::new(8.0, 32.0 - PLAYER_H + 1.0, 3);
        p.velocity.x = 150.0;
        let x_before = p.position.x;
        let hits = overlapping(&p, &tiles);
        assert!(!hits.is_empty());
        resolve_horizontal(&mut p, &hits);
        assert_eq!(p.position.x, x_before);
        assert_eq!(p.velocity.x, 150.0);
    }

    #[test]
    fn stationary_overlap_is_not_pushed() {
        let tiles = tiles_from(&[
            "..#",
            "..#",
            "###",
        ]);
        // Overlapping the wall column with zero x-velocity: no push
        let mut p = Player::new(22.0, 8.0, 3);
        let x_before = p.position.x;
        let hits = overlapping(&p, &tiles);
        assert!(!hits.is_empty());
        resolve_horizontal(&mut p, &hits);
        assert_eq!(p.position.x, x_before);
    }

    #[test]
    fn falling_lands_without_overlap() {
        let tiles = tiles_from(&[
            "...",
            "...",
            "###",
        ]);
        let mut p = Player::new(8.0, 12.0, 3);
        p.velocity.y = 200.0;
        let hits = overlapping(&p, &tiles);
        assert!(!hits.is_empty());
        resolve_vertical(&mut p, &hits);
        assert!(p.is_grounded);
        assert_eq!(p.velocity.y, 0.0);
        assert_eq!(p.position.y, 2.0 * TILE_SIZE - PLAYER_H);
        let pbox = p.collision_box();
        assert!(!tiles.iter().any(|t| t.bounds.intersects(&pbox)));
    }

    #[test]
    fn rising_bumps_ceiling() {
        let tiles = tiles_from(&[
            "###",
            "...",
        ]);
        let mut p = Player::new(8.0, 10.0, 3);
        p.velocity.y = -300.0;
        let hits = overlapping(&p, &tiles);
        assert!(!hits.is_empty());
        resolve_vertical(&mut p, &hits);
        assert_eq!(p.velocity.y, 0.0);
        let pbox = p.collision_box();
        assert!(pbox.y >= TILE_SIZE - 1e-4);
    }

    #[test]
    fn no_solid_means_airborne() {
        let tiles = tiles_from(&[
            "HHH",
        ]);
        let mut p = Player::new(8.0, 0.0, 3);
        p.is_grounded = true;
        let hits = overlapping(&p, &tiles);
        resolve_vertical(&mut p, &hits);
        assert!(!p.is_grounded);
    }

    #[test]
    fn closest_tile_wins() {
        let tiles = tiles_from(&[
            "#.#",
            "...",
        ]);
        // Player body spanning both columns' rows, nearer the left tile
        let mut p = Player::new(2.0, 10.0, 3);
        p.velocity.y = -10.0;
        let hits: Vec<Tile> = tiles.clone();
        resolve_vertical(&mut p, &hits);
        // Pushed below the LEFT tile's bottom edge
        assert!(p.collision_box().y >= TILE_SIZE - 1e-4);
    }
}

/// The built-in level table: three 80x30 levels authored as ASCII rows.
/// The char legend below is authoring sugar only; the level loader consumes
/// the numeric cell codes it expands to.
///
/// Legend:
///   `#` ground   `D` exit door   `c` coin    `H` ladder   `T` trophy
///   `^` spikes   `g` gem         `=` moving platform      `e` moving enemy
///   `k` key      `L` locked door `p` princess marker      `P` player start

use crate::sim::level::GridCell;

pub const LEVEL_COUNT: u32 = 3;

/// Expand ASCII rows to the numeric grid, padding short rows with empty
/// cells so the result is always rectangular.
pub fn rows_to_grid(rows: &[&str]) -> Vec<Vec<GridCell>> {
    let width = rows.iter().map(|r| r.chars().count()).max().unwrap_or(0);
    rows.iter()
        .map(|r| {
            let mut cells: Vec<GridCell> = r.chars().map(cell_for).collect();
            cells.resize(width, GridCell::Code(0));
            cells
        })
        .collect()
}

fn cell_for(ch: char) -> GridCell {
    match ch {
        '#' => GridCell::Code(1),
        'D' => GridCell::Code(2),
        'c' => GridCell::Code(3),
        'H' => GridCell::Code(4),
        'T' => GridCell::Code(5),
        '^' => GridCell::Code(6),
        'g' => GridCell::Code(7),
        '=' => GridCell::Code(9),
        'e' => GridCell::Code(10),
        'k' => GridCell::Code(12),
        'L' => GridCell::Code(13),
        'p' => GridCell::Code(15),
        'P' => GridCell::PlayerStart,
        _ => GridCell::Code(0),
    }
}

/// Grid for a 1-based level number, or None past the end of the table.
pub fn level_grid(number: u32) -> Option<Vec<Vec<GridCell>>> {
    match number {
        1 => Some(rows_to_grid(LEVEL1)),
        2 => Some(rows_to_grid(LEVEL2)),
        3 => Some(rows_to_grid(LEVEL3)),
        _ => None,
    }
}

// Level 1: movement, ladders, coins, the trophy, and one spike pit.
#[rustfmt::skip]
const LEVEL1: &[&str] = &[
    "................................................................................",
    "................................................................................",
    "................................................................................",
    "................................................................................",
    "................................................................................",
    "................................................................................",
    "................................................................................",
    "................................................................................",
    "................................................................................",
    "................................................................................",
    "................................................................................",
    "................................................................................",
    "................................................................................",
    "................................................................................",
    "................................................................................",
    "...........................................T....................................",
    ".....................................H###########...............................",
    ".....................................H..........................................",
    ".....................................H..........................................",
    ".....................................H..........................................",
    "........................c..c..c......H..........................................",
    "....................H############...............................................",
    "....................H...........................................................",
    "....................H...........................................................",
    "..........c..c..c...H...........................................................",
    "......H############....................................c.c......................",
    "......H...........................................H###########..................",
    "..P...H...........................................H...........H.................",
    "......H...........................................H...^^^^....H...........D.....",
    "################################################################################",
];

// Level 2: keys and locked doors, reached by moving platforms.
#[rustfmt::skip]
const LEVEL2: &[&str] = &[
    "................................................................................",
    "................................................................................",
    "................................................................................",
    "................................................................................",
    "................................................................................",
    "................................................................................",
    "................................................................................",
    "................................................................................",
    "................................................................................",
    "................................................................................",
    "................................................................................",
    "................................................................................",
    "................................................................................",
    "................................................................................",
    "................................................................................",
    "................................................................................",
    ".................................k............................k.................",
    "..............................#######.....................#########.............",
    "......................................#.........................................",
    "......................................#.........................................",
    "......................................#.........................................",
    "..........................=...........#.................=.......................",
    "......................................#.........................................",
    "......................................#.........................................",
    "............c..c..c...................#.......c..c..c.................#.........",
    "........H############.................#.....###########...............#.........",
    "........H.............................#.................H.............#.........",
    "..P.....H.............................#.................H.............#.........",
    "........H.............................L.................H.............L.....D...",
    "################################################################################",
];

// Level 3: the gem-and-princess chain, patrolling enemies, spikes.
#[rustfmt::skip]
const LEVEL3: &[&str] = &[
    "................................................................................",
    "................................................................................",
    "................................................................................",
    "................................................................................",
    "................................................................................",
    "................................................................................",
    "................................................................................",
    "................................................................................",
    "................................................................................",
    "................................................................................",
    "................................................................................",
    "................................................................................",
    "................................................................................",
    "..............................................................g.................",
    ".........................................................H#########.............",
    ".........................................................H......................",
    ".........................................................H......................",
    ".......................................................e.H......................",
    ".................................................H###########...................",
    ".................................................H..............................",
    ".................................................H..............................",
    "...............................................c.H.c............................",
    "............................................H##########.........................",
    "............................................H...................................",
    "............................................H...................................",
    "..............................c..c..c.......H...................................",
    "..........................H#############....H...................................",
    "..P...p...................H.............H...H...................................",
    "....................e.....H...^^^^^^....H...H...e...........................D...",
    "################################################################################",
];

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::tile::CollectibleKind;
    use crate::sim::level::Level;

    #[test]
    fn grid_expansion_pads_short_rows() {
        let grid = rows_to_grid(&["#", "###"]);
        assert_eq!(grid[0].len(), 3);
        assert_eq!(grid[0][1], GridCell::Code(0));
        assert_eq!(grid[1][2], GridCell::Code(1));
    }

    #[test]
    fn table_bounds() {
        assert!(level_grid(0).is_none());
        assert!(level_grid(LEVEL_COUNT + 1).is_none());
        for n in 1..=LEVEL_COUNT {
            let grid = level_grid(n).unwrap();
            assert_eq!(grid.len(), 30);
            assert_eq!(grid[0].len(), 80);
        }
    }

    #[test]
    fn every_level_is_well_formed() {
        for n in 1..=LEVEL_COUNT {
            let level = Level::from_grid(n, &level_grid(n).unwrap());
            assert!(level.exit.is_some(), "level {n} has no exit");
            assert!(level.total_collectibles > 0, "level {n} has nothing to collect");
            // 'P' must have overridden the default start
            assert!(level.player_start().x > 0.0);
        }
    }

    #[test]
    fn level_three_has_the_gem_chain() {
        let level = Level::from_grid(3, &level_grid(3).unwrap());
        assert!(level
            .collectibles
            .iter()
            .any(|c| c.kind == CollectibleKind::Gem));
        assert!(!level.enemies.is_empty());
    }

    #[test]
    fn level_two_has_keys_and_doors() {
        let level = Level::from_grid(2, &level_grid(2).unwrap());
        let keys = level
            .collectibles
            .iter()
            .filter(|c| c.kind == CollectibleKind::Key)
            .count();
        assert_eq!(keys, 2);
        assert!(!level.platforms.is_empty());
    }
}

//! Integration tests for the packing engine.
//!
//! Exercises: place → collide → remove → undo → auto-arrange → snapshot,
//! plus a seeded random operation stream checked against the storage
//! invariants after every step.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use satchel_logic::{Grid, GridConfig, ItemId, Position, Rotation, Shape};
use std::collections::{HashMap, HashSet};

// ── Helpers ────────────────────────────────────────────────────────────

fn catalog() -> Vec<Shape> {
    [
        vec!["#"],
        vec!["##"],
        vec!["###"],
        vec!["##", "##"],
        vec!["#.", "#.", "##"],
        vec![".#.", "###"],
        vec!["##.", ".##"],
        vec!["#.#", "###"],
        vec!["####"],
    ]
    .iter()
    .map(|rows| Shape::from_rows(rows.as_slice()).unwrap())
    .collect()
}

/// Cell → owner map rebuilt from placements alone.
fn owners_from_placements(grid: &Grid) -> HashMap<(usize, usize), ItemId> {
    let mut owners = HashMap::new();
    for p in grid.placements() {
        for cell in p.cells() {
            let prev = owners.insert(cell, p.item_id.clone());
            assert!(prev.is_none(), "two placements claim {:?}", cell);
        }
    }
    owners
}

fn assert_consistent(grid: &Grid) {
    assert_eq!(grid.check_invariants(), vec![]);
    let owners = owners_from_placements(grid);
    for y in 0..grid.height() {
        for x in 0..grid.width() {
            let at = grid.item_at(Position::new(x as i32, y as i32));
            assert_eq!(at, owners.get(&(x, y)), "cell ({},{})", x, y);
        }
    }
    let fill = grid.get_fill_percentage();
    assert!((0.0..=1.0).contains(&fill));
    let expected = owners.len() as f32 / (grid.width() * grid.height()) as f32;
    assert_eq!(fill, expected);
}

fn held_ids(grid: &Grid) -> HashSet<ItemId> {
    grid.placements().iter().map(|p| p.item_id.clone()).collect()
}

fn occupied(grid: &Grid) -> HashSet<(i32, i32)> {
    let mut cells = HashSet::new();
    for y in 0..grid.height() as i32 {
        for x in 0..grid.width() as i32 {
            if grid.item_at(Position::new(x, y)).is_some() {
                cells.insert((x, y));
            }
        }
    }
    cells
}

// ── Reference scenario ─────────────────────────────────────────────────

#[test]
fn five_by_five_scenario() {
    let mut grid = Grid::new(5, 5).unwrap();
    let square = Shape::filled(2, 2).unwrap();

    assert!(grid.try_place_item("A", &square, Position::new(0, 0), Rotation::Deg0));
    assert_eq!(
        occupied(&grid),
        HashSet::from([(0, 0), (1, 0), (0, 1), (1, 1)])
    );
    assert_eq!(grid.get_fill_percentage(), 4.0 / 25.0);

    let before = grid.get_debug_view();
    assert!(!grid.try_place_item("B", &square, Position::new(0, 0), Rotation::Deg0));
    assert_eq!(grid.get_debug_view(), before);
    assert_eq!(grid.len(), 1);

    assert!(grid.try_place_item("B", &square, Position::new(3, 3), Rotation::Deg0));
    assert_eq!(grid.get_fill_percentage(), 8.0 / 25.0);

    assert!(grid.remove_item("A"));
    assert_eq!(grid.get_fill_percentage(), 4.0 / 25.0);
    assert_eq!(grid.item_at(Position::new(0, 0)), None);

    assert!(grid.undo());
    let a = grid.placement("A").unwrap();
    assert_eq!(a.anchor, Position::new(0, 0));
    assert_eq!(a.rotation, Rotation::Deg0);
    assert_eq!(a.shape, square);
    assert_eq!(grid.get_fill_percentage(), 8.0 / 25.0);
    assert_eq!(
        grid.get_debug_view(),
        "AA...\nAA...\n.....\n...BB\n...BB"
    );
    assert_consistent(&grid);
}

// ── Undo round-trips ───────────────────────────────────────────────────

#[test]
fn place_then_undo_restores_exact_state() {
    let shapes = catalog();
    let mut grid = Grid::new(6, 5).unwrap();
    assert!(grid.try_place_item("base", &shapes[3], Position::new(2, 2), Rotation::Deg0));

    for (i, shape) in shapes.iter().enumerate() {
        for rotation in Rotation::ALL {
            let before_view = grid.get_debug_view();
            let before_depth = grid.undo_depth();
            if grid.try_place_item(format!("s{}", i), shape, Position::new(0, 0), rotation) {
                assert!(grid.undo());
            }
            assert_eq!(grid.get_debug_view(), before_view);
            assert_eq!(grid.undo_depth(), before_depth);
            assert_consistent(&grid);
        }
    }
}

#[test]
fn remove_then_undo_restores_exact_placement() {
    let shapes = catalog();
    let mut grid = Grid::new(4, 4).unwrap();
    let anchor = Position::new(1, 1);
    assert!(grid.try_place_item_weighted("T", &shapes[5], anchor, Rotation::Deg270, 7.0));
    let original = grid.placement("T").unwrap().clone();
    let view = grid.get_debug_view();

    assert!(grid.remove_item("T"));
    assert!(grid.undo());
    assert_eq!(grid.placement("T"), Some(&original));
    assert_eq!(grid.get_debug_view(), view);
}

#[test]
fn full_unwind_empties_grid() {
    let shapes = catalog();
    let mut grid = Grid::new(6, 6).unwrap();
    let mut placed = 0;
    for (i, shape) in shapes.iter().enumerate() {
        if grid.try_auto_place(format!("i{}", i), shape, 1.0) {
            placed += 1;
        }
    }
    assert!(placed > 0);
    assert!(grid.remove_item("i0"));

    while grid.undo() {
        assert_consistent(&grid);
    }
    assert!(grid.is_empty());
    assert_eq!(grid.occupied_cells(), 0);
}

// ── Auto-arrange ───────────────────────────────────────────────────────

#[test]
fn auto_arrange_keeps_subset_without_overlap() {
    let shapes = catalog();
    let mut rng = StdRng::seed_from_u64(7);
    for order_by_weight in [false, true] {
        let mut grid = Grid::new(7, 5).unwrap();
        for (i, shape) in shapes.iter().enumerate() {
            let weight = rng.gen_range(0.5..10.0);
            grid.try_auto_place(format!("item{}", i), shape, weight);
        }
        let before = held_ids(&grid);

        let report = grid.auto_arrange(order_by_weight);
        let after = held_ids(&grid);

        assert!(after.is_subset(&before));
        assert_eq!(after.len() + report.dropped.len(), before.len());
        for d in &report.dropped {
            assert!(!after.contains(&d.item_id));
        }
        assert_consistent(&grid);
    }
}

#[test]
fn auto_arrange_on_empty_grid_is_noop() {
    let mut grid = Grid::new(3, 3).unwrap();
    let report = grid.auto_arrange(true);
    assert!(report.placed.is_empty());
    assert!(report.is_complete());
    assert!(!grid.can_undo());
}

#[test]
fn atomic_arrange_round_trip() {
    let shapes = catalog();
    let config = GridConfig {
        width: 6,
        height: 4,
        atomic_arrange: true,
        ..GridConfig::default()
    };
    let mut grid = Grid::with_config(&config).unwrap();
    assert!(grid.try_place_item("a", &shapes[4], Position::new(0, 0), Rotation::Deg0));
    assert!(grid.try_place_item("b", &shapes[8], Position::new(2, 0), Rotation::Deg0));
    assert!(grid.try_place_item("c", &shapes[6], Position::new(3, 1), Rotation::Deg0));
    let view = grid.get_debug_view();

    grid.auto_arrange(true);
    assert_consistent(&grid);
    assert!(grid.undo());
    assert_eq!(grid.get_debug_view(), view);
    assert_consistent(&grid);
}

// ── Snapshot ───────────────────────────────────────────────────────────

#[test]
fn snapshot_survives_json_after_arrange() {
    let shapes = catalog();
    let mut grid = Grid::new(6, 6).unwrap();
    for (i, shape) in shapes.iter().enumerate() {
        grid.try_auto_place(format!("{}", i), shape, i as f32);
    }
    grid.auto_arrange(true);

    let json = serde_json::to_string_pretty(&grid.snapshot()).unwrap();
    let restored = Grid::restore(&serde_json::from_str(&json).unwrap()).unwrap();
    assert_eq!(restored.get_debug_view(), grid.get_debug_view());
    assert_eq!(restored.len(), grid.len());
    assert_consistent(&restored);
}

// ── Random operation stream ────────────────────────────────────────────

#[test]
fn random_operations_preserve_invariants() {
    let shapes = catalog();
    for seed in 0..8u64 {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut grid = Grid::new(8, 6).unwrap();

        for step in 0..300 {
            let id = format!("{}", (b'a' + rng.gen_range(0..12u8)) as char);
            let view = grid.get_debug_view();
            let depth = grid.undo_depth();
            match rng.gen_range(0..10) {
                0..=4 => {
                    let shape = &shapes[rng.gen_range(0..shapes.len())];
                    let pos = Position::new(rng.gen_range(-1..8), rng.gen_range(-1..6));
                    let rotation = Rotation::ALL[rng.gen_range(0..4)];
                    let ok = grid.try_place_item(id.as_str(), shape, pos, rotation);
                    if !ok {
                        assert_eq!(grid.get_debug_view(), view, "seed {} step {}", seed, step);
                        assert_eq!(grid.undo_depth(), depth);
                    }
                }
                5..=6 => {
                    let had = grid.placement(&id).cloned();
                    let ok = grid.remove_item(&id);
                    assert_eq!(ok, had.is_some());
                    if let Some(p) = had {
                        for (x, y) in p.cells() {
                            assert_eq!(grid.item_at(Position::new(x as i32, y as i32)), None);
                        }
                    }
                }
                7..=8 => {
                    grid.undo();
                }
                _ => {
                    let shape = &shapes[rng.gen_range(0..shapes.len())];
                    grid.try_auto_place(id.as_str(), shape, rng.gen_range(0.0..5.0));
                }
            }
            assert_consistent(&grid);
        }
    }
}

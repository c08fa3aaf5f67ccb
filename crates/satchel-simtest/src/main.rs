//! Satchel Headless Packing Harness
//!
//! Validates the inventory packing engine against the item catalog without
//! any rendering or input layer. Runs entirely in-process.
//!
//! Usage:
//!   cargo run -p satchel-simtest
//!   cargo run -p satchel-simtest -- --verbose --seed 7
//!   RUST_LOG=satchel_logic=debug cargo run -p satchel-simtest

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use satchel_logic::{Grid, GridConfig, ItemId, Position, Rotation, Shape};
use serde::Deserialize;
use std::collections::HashSet;

// ── Item catalog ────────────────────────────────────────────────────────
const CATALOG_JSON: &str = include_str!("../../../data/items.json");

#[derive(Debug, Deserialize)]
struct Catalog {
    backpack: BackpackSize,
    items: Vec<CatalogItem>,
}

#[derive(Debug, Deserialize)]
struct BackpackSize {
    width: usize,
    height: usize,
}

#[derive(Debug, Deserialize)]
struct CatalogItem {
    name: String,
    weight: f32,
    shape: Vec<String>,
}

/// A catalog entry with its shape parsed.
struct Item {
    name: String,
    weight: f32,
    shape: Shape,
}

// ── Test harness ────────────────────────────────────────────────────────

struct TestResult {
    name: String,
    passed: bool,
    detail: String,
}

struct Options {
    verbose: bool,
    seed: u64,
}

fn parse_options() -> Options {
    let args: Vec<String> = std::env::args().collect();
    let verbose = args.iter().any(|a| a == "--verbose");
    let seed = args
        .iter()
        .position(|a| a == "--seed")
        .and_then(|i| args.get(i + 1))
        .and_then(|s| s.parse().ok())
        .unwrap_or(42);
    Options { verbose, seed }
}

fn main() {
    env_logger::init();
    let opts = parse_options();
    log::info!("harness starting, fuzz seed {}", opts.seed);
    println!("=== Satchel Packing Harness ===\n");

    let mut results = Vec::new();

    // 1. Catalog validation
    let (catalog_results, catalog) = validate_catalog(opts.verbose);
    results.extend(catalog_results);

    if let Some((size, items)) = catalog {
        // 2. Rotation closure over every catalog shape
        results.extend(validate_rotations(&items));

        // 3. Reference 5×5 scenario
        results.extend(validate_reference_scenario(opts.verbose));

        // 4. Undo round-trips
        results.extend(validate_undo(&size, &items));

        // 5. Backpack fill + auto-arrange
        results.extend(validate_auto_arrange(&size, &items, opts.verbose));

        // 6. Snapshot reload
        results.extend(validate_snapshot(&size, &items));

        // 7. Random operation fuzz
        results.extend(validate_random_ops(&size, &items, opts.seed));
    }

    // ── Summary ──
    println!();
    let passed = results.iter().filter(|r| r.passed).count();
    let failed = results.iter().filter(|r| !r.passed).count();
    let total = results.len();

    for r in &results {
        let icon = if r.passed { "✓" } else { "✗" };
        if !r.passed || opts.verbose {
            println!("  {} {}: {}", icon, r.name, r.detail);
        }
    }

    println!(
        "\n=== RESULT: {}/{} passed, {} failed ===",
        passed, total, failed
    );

    if failed > 0 {
        std::process::exit(1);
    }
}

fn held_ids(grid: &Grid) -> HashSet<ItemId> {
    grid.placements().iter().map(|p| p.item_id.clone()).collect()
}

fn invariants_hold(grid: &Grid) -> (bool, String) {
    let violations = grid.check_invariants();
    if violations.is_empty() {
        (true, "no invariant violations".into())
    } else {
        (false, format!("{:?}", violations))
    }
}

// ── 1. Catalog ──────────────────────────────────────────────────────────

fn validate_catalog(verbose: bool) -> (Vec<TestResult>, Option<(GridConfig, Vec<Item>)>) {
    println!("--- Item Catalog ---");
    let mut results = Vec::new();

    let catalog: Catalog = match serde_json::from_str(CATALOG_JSON) {
        Ok(c) => c,
        Err(e) => {
            results.push(TestResult {
                name: "catalog_parse".into(),
                passed: false,
                detail: format!("JSON parse error: {}", e),
            });
            return (results, None);
        }
    };

    let size = GridConfig {
        width: catalog.backpack.width,
        height: catalog.backpack.height,
        ..GridConfig::default()
    };
    let config_errors = satchel_logic::config::validate_config(&size);
    results.push(TestResult {
        name: "catalog_backpack_size".into(),
        passed: config_errors.is_empty(),
        detail: format!(
            "{}×{} backpack {:?}",
            size.width, size.height, config_errors
        ),
    });

    let mut items = Vec::new();
    let mut bad_shapes = Vec::new();
    for entry in &catalog.items {
        match Shape::from_rows(entry.shape.as_slice()) {
            Ok(shape) => items.push(Item {
                name: entry.name.clone(),
                weight: entry.weight,
                shape,
            }),
            Err(e) => bad_shapes.push(format!("{}: {}", entry.name, e)),
        }
    }
    results.push(TestResult {
        name: "catalog_shapes_parse".into(),
        passed: bad_shapes.is_empty(),
        detail: if bad_shapes.is_empty() {
            format!("{} item shapes loaded", items.len())
        } else {
            bad_shapes.join("; ")
        },
    });

    let bad_weight: Vec<_> = catalog.items.iter().filter(|i| i.weight <= 0.0).collect();
    results.push(TestResult {
        name: "catalog_positive_weights".into(),
        passed: bad_weight.is_empty(),
        detail: format!("{} items with non-positive weight", bad_weight.len()),
    });

    let names: HashSet<&str> = catalog.items.iter().map(|i| i.name.as_str()).collect();
    results.push(TestResult {
        name: "catalog_unique_names".into(),
        passed: names.len() == catalog.items.len(),
        detail: format!("{} names, {} items", names.len(), catalog.items.len()),
    });

    // Every item must fit an empty backpack in some orientation
    let mut too_big = Vec::new();
    if let Ok(empty) = Grid::with_config(&size) {
        for item in &items {
            if empty.find_first_fit(&item.shape).is_none() {
                too_big.push(item.name.as_str());
            }
        }
    }
    results.push(TestResult {
        name: "catalog_items_fit_empty_backpack".into(),
        passed: too_big.is_empty(),
        detail: if too_big.is_empty() {
            "every item fits alone".into()
        } else {
            format!("too big: {}", too_big.join(", "))
        },
    });

    if verbose {
        let cells: usize = items.iter().map(|i| i.shape.cell_count()).sum();
        println!(
            "  {} items, {} cells total, backpack holds {}",
            items.len(),
            cells,
            size.width * size.height
        );
    }

    let ok = results.iter().all(|r| r.passed);
    (results, ok.then_some((size, items)))
}

// ── 2. Rotation ─────────────────────────────────────────────────────────

fn validate_rotations(items: &[Item]) -> Vec<TestResult> {
    println!("--- Shape Rotation ---");
    let mut results = Vec::new();

    let mut not_closed = Vec::new();
    let mut bad_half_turn = Vec::new();
    for item in items {
        let s = &item.shape;
        let full = s.rotate90().rotate90().rotate90().rotate90();
        if &full != s {
            not_closed.push(item.name.as_str());
        }
        let half = s.rotate90().rotate90();
        let reflected = (0..s.height()).all(|y| {
            (0..s.width()).all(|x| {
                half.is_filled(x, y) == s.is_filled(s.width() - 1 - x, s.height() - 1 - y)
            })
        });
        if !reflected || half.cell_count() != s.cell_count() {
            bad_half_turn.push(item.name.as_str());
        }
    }

    results.push(TestResult {
        name: "rotation_four_turns_identity".into(),
        passed: not_closed.is_empty(),
        detail: format!("{} shapes not closed under rotation", not_closed.len()),
    });
    results.push(TestResult {
        name: "rotation_half_turn_point_reflection".into(),
        passed: bad_half_turn.is_empty(),
        detail: format!("{} shapes with a wrong half turn", bad_half_turn.len()),
    });

    results
}

// ── 3. Reference scenario ───────────────────────────────────────────────

fn validate_reference_scenario(verbose: bool) -> Vec<TestResult> {
    println!("--- Reference Scenario (5×5) ---");
    let mut results = Vec::new();

    let Ok(mut grid) = Grid::new(5, 5) else {
        results.push(TestResult {
            name: "scenario_grid".into(),
            passed: false,
            detail: "5×5 grid rejected".into(),
        });
        return results;
    };
    let Ok(square) = Shape::filled(2, 2) else {
        return results;
    };

    let a = grid.try_place_item("A", &square, Position::new(0, 0), Rotation::Deg0);
    results.push(TestResult {
        name: "scenario_place_a".into(),
        passed: a && grid.occupied_cells() == 4,
        detail: format!("fill {:.2}", grid.get_fill_percentage()),
    });

    let before = grid.get_debug_view();
    let b_collide = grid.try_place_item("B", &square, Position::new(0, 0), Rotation::Deg0);
    results.push(TestResult {
        name: "scenario_collision_rejected".into(),
        passed: !b_collide && grid.get_debug_view() == before && !grid.contains("B"),
        detail: "B at (0,0) overlaps A".into(),
    });

    let b = grid.try_place_item("B", &square, Position::new(3, 3), Rotation::Deg0);
    results.push(TestResult {
        name: "scenario_place_b_flush".into(),
        passed: b && grid.occupied_cells() == 8,
        detail: "B at (3,3) fits exactly".into(),
    });

    let removed = grid.remove_item("A");
    results.push(TestResult {
        name: "scenario_remove_a".into(),
        passed: removed && grid.occupied_cells() == 4,
        detail: format!("fill {:.2}", grid.get_fill_percentage()),
    });

    let undone = grid.undo();
    let restored = grid
        .placement("A")
        .map(|p| p.anchor == Position::new(0, 0) && p.rotation == Rotation::Deg0)
        .unwrap_or(false);
    results.push(TestResult {
        name: "scenario_undo_remove".into(),
        passed: undone && restored && grid.occupied_cells() == 8,
        detail: format!("fill {:.2}", grid.get_fill_percentage()),
    });

    if verbose {
        println!("{}\n", grid.get_debug_view());
    }

    results
}

// ── 4. Undo ─────────────────────────────────────────────────────────────

fn validate_undo(size: &GridConfig, items: &[Item]) -> Vec<TestResult> {
    println!("--- Undo Log ---");
    let mut results = Vec::new();
    let Ok(mut grid) = Grid::with_config(size) else {
        return results;
    };

    // Place each item in every orientation at the origin, undo, compare
    let mut mismatches = 0;
    let mut attempts = 0;
    for item in items {
        for rotation in Rotation::ALL {
            let before = grid.get_debug_view();
            let depth = grid.undo_depth();
            let origin = Position::new(0, 0);
            if grid.try_place_item(item.name.as_str(), &item.shape, origin, rotation) {
                attempts += 1;
                grid.undo();
            }
            if grid.get_debug_view() != before || grid.undo_depth() != depth {
                mismatches += 1;
            }
        }
    }
    results.push(TestResult {
        name: "undo_place_round_trip".into(),
        passed: mismatches == 0 && attempts > 0,
        detail: format!("{} placements undone, {} mismatches", attempts, mismatches),
    });

    // Fill, remove everything, undo every removal
    for item in items {
        grid.try_auto_place(item.name.as_str(), &item.shape, item.weight);
    }
    let filled = grid.snapshot();
    let held: Vec<ItemId> = held_ids(&grid).into_iter().collect();
    for id in &held {
        grid.remove_item(id.as_str());
    }
    let emptied = grid.is_empty();
    for _ in &held {
        grid.undo();
    }
    let all_back = filled.items.iter().all(|saved| {
        grid.placement(saved.item_id.as_str())
            .map(|p| {
                p.anchor == Position::new(saved.anchor_x, saved.anchor_y)
                    && p.rotation.degrees() == saved.rotation
            })
            .unwrap_or(false)
    });
    results.push(TestResult {
        name: "undo_remove_round_trip".into(),
        passed: emptied && all_back && grid.len() == filled.items.len(),
        detail: format!("{} removals undone", held.len()),
    });

    let (ok, detail) = invariants_hold(&grid);
    results.push(TestResult {
        name: "undo_invariants".into(),
        passed: ok,
        detail,
    });

    while grid.undo() {}
    results.push(TestResult {
        name: "undo_full_unwind".into(),
        passed: grid.is_empty() && grid.occupied_cells() == 0,
        detail: format!("{} items left after unwinding", grid.len()),
    });

    results
}

// ── 5. Auto-arrange ─────────────────────────────────────────────────────

fn validate_auto_arrange(size: &GridConfig, items: &[Item], verbose: bool) -> Vec<TestResult> {
    println!("--- Auto-Arrange ---");
    let mut results = Vec::new();

    for order_by_weight in [false, true] {
        let label = if order_by_weight { "weight" } else { "order" };
        let Ok(mut grid) = Grid::with_config(size) else {
            return results;
        };

        // Scatter items top-right first so the arrange has work to do
        for item in items {
            let mut placed = false;
            'search: for y in 0..size.height as i32 {
                for x in (0..size.width as i32).rev() {
                    for rotation in Rotation::ALL {
                        let pos = Position::new(x, y);
                        if grid.try_place_item_weighted(
                            item.name.as_str(),
                            &item.shape,
                            pos,
                            rotation,
                            item.weight,
                        ) {
                            placed = true;
                            break 'search;
                        }
                    }
                }
            }
            if !placed && verbose {
                println!("  {} did not fit before arranging", item.name);
            }
        }

        let before = held_ids(&grid);
        let fill_before = grid.get_fill_percentage();
        let report = grid.auto_arrange(order_by_weight);
        let after = held_ids(&grid);

        results.push(TestResult {
            name: format!("arrange_by_{}_subset", label),
            passed: after.is_subset(&before)
                && after.len() + report.dropped.len() == before.len(),
            detail: format!(
                "{} held → {} placed, {} dropped",
                before.len(),
                report.placed.len(),
                report.dropped.len()
            ),
        });

        let (ok, detail) = invariants_hold(&grid);
        results.push(TestResult {
            name: format!("arrange_by_{}_invariants", label),
            passed: ok,
            detail,
        });

        results.push(TestResult {
            name: format!("arrange_by_{}_fill", label),
            passed: (0.0..=1.0).contains(&grid.get_fill_percentage()),
            detail: format!(
                "fill {:.0}% → {:.0}%",
                fill_before * 100.0,
                grid.get_fill_percentage() * 100.0
            ),
        });

        if verbose {
            println!("  arranged by {}:\n{}\n", label, grid.get_debug_view());
        }
    }

    results
}

// ── 6. Snapshot ─────────────────────────────────────────────────────────

fn validate_snapshot(size: &GridConfig, items: &[Item]) -> Vec<TestResult> {
    println!("--- Snapshot ---");
    let mut results = Vec::new();
    let Ok(mut grid) = Grid::with_config(size) else {
        return results;
    };
    for item in items {
        grid.try_auto_place(item.name.as_str(), &item.shape, item.weight);
    }
    grid.auto_arrange(true);

    let reloaded = serde_json::to_string(&grid.snapshot())
        .map_err(|e| e.to_string())
        .and_then(|json| serde_json::from_str(&json).map_err(|e| e.to_string()))
        .and_then(|snap| Grid::restore(&snap).map_err(|e| e.to_string()));

    match reloaded {
        Ok(restored) => {
            results.push(TestResult {
                name: "snapshot_round_trip".into(),
                passed: restored.get_debug_view() == grid.get_debug_view()
                    && restored.len() == grid.len()
                    && !restored.can_undo(),
                detail: format!("{} items reloaded", restored.len()),
            });
        }
        Err(e) => results.push(TestResult {
            name: "snapshot_round_trip".into(),
            passed: false,
            detail: e,
        }),
    }

    results
}

// ── 7. Random fuzz ──────────────────────────────────────────────────────

fn validate_random_ops(size: &GridConfig, items: &[Item], seed: u64) -> Vec<TestResult> {
    println!("--- Random Operations (seed {}) ---", seed);
    let mut results = Vec::new();
    let Ok(mut grid) = Grid::with_config(size) else {
        return results;
    };
    let mut rng = StdRng::seed_from_u64(seed);

    let steps = 2000;
    let mut failures = Vec::new();
    let mut silent_failures = 0;
    let (mut places, mut removes, mut undos, mut arranges) = (0, 0, 0, 0);

    for step in 0..steps {
        let item = &items[rng.gen_range(0..items.len())];
        match rng.gen_range(0..20) {
            0..=8 => {
                let view = grid.get_debug_view();
                let depth = grid.undo_depth();
                let pos = Position::new(
                    rng.gen_range(-1..size.width as i32),
                    rng.gen_range(-1..size.height as i32),
                );
                let rotation = Rotation::ALL[rng.gen_range(0..4)];
                if grid.try_place_item_weighted(
                    item.name.as_str(),
                    &item.shape,
                    pos,
                    rotation,
                    item.weight,
                ) {
                    places += 1;
                } else if grid.get_debug_view() != view || grid.undo_depth() != depth {
                    silent_failures += 1;
                }
            }
            9..=13 => {
                if grid.remove_item(&item.name) {
                    removes += 1;
                }
            }
            14..=18 => {
                if grid.undo() {
                    undos += 1;
                }
            }
            _ => {
                grid.auto_arrange(rng.gen_bool(0.5));
                arranges += 1;
            }
        }
        if let (false, detail) = invariants_hold(&grid) {
            failures.push(format!("step {}: {}", step, detail));
        }
    }

    results.push(TestResult {
        name: "fuzz_invariants".into(),
        passed: failures.is_empty(),
        detail: if failures.is_empty() {
            format!(
                "{} steps: {} places, {} removes, {} undos, {} arranges",
                steps, places, removes, undos, arranges
            )
        } else {
            failures[0].clone()
        },
    });
    results.push(TestResult {
        name: "fuzz_failed_place_side_effect_free".into(),
        passed: silent_failures == 0,
        detail: format!("{} rejected placements changed state", silent_failures),
    });

    results
}

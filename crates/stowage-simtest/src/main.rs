//! Stowage Headless Inventory Harness
//!
//! Validates placement logic and catalog data without a renderer.
//! Runs entirely in-process — no windowing, no input devices, no files
//! written.
//!
//! Usage:
//!   cargo run -p stowage-simtest
//!   cargo run -p stowage-simtest -- --verbose

use hecs::{Entity, World};
use rand::seq::SliceRandom;
use rand::Rng;
use stowage_core::{
    build_grid, load_grid, save_grid, serialize_grid, GridConfig, GridInventory, Item,
    ItemCatalog, PlaceOutcome, PlacementSession, StartingItem, TemplateSpec,
};

// ── Item catalog (same JSON the game ships) ─────────────────────────────
const CATALOG_JSON: &str = include_str!("../../../data/item_catalog.json");

// ── Test harness ────────────────────────────────────────────────────────

struct TestResult {
    name: String,
    passed: bool,
    detail: String,
}

impl TestResult {
    fn new(name: &str, passed: bool, detail: String) -> Self {
        Self {
            name: name.to_string(),
            passed,
            detail,
        }
    }
}

fn main() {
    let verbose = std::env::args().any(|a| a == "--verbose");
    println!("=== Stowage Inventory Harness ===\n");

    let catalog = load_catalog();

    let mut results = Vec::new();

    // 1. Catalog data validation
    results.extend(validate_catalog(&catalog, verbose));

    // 2. Rotation closure over every template
    results.extend(validate_rotation_closure(&catalog, verbose));

    // 3. Placement and swap resolution sweep
    results.extend(validate_placement(&catalog, verbose));

    // 4. Pointer mapping sweep
    results.extend(validate_pointer_mapping(&catalog, verbose));

    // 5. Persistence round trip
    results.extend(validate_persistence(&catalog, verbose));

    // 6. Randomized soak: invariant holds under arbitrary interaction
    results.extend(soak_invariant(&catalog, verbose));

    // ── Summary ──
    println!();
    let passed = results.iter().filter(|r| r.passed).count();
    let failed = results.iter().filter(|r| !r.passed).count();
    let total = results.len();

    for r in &results {
        let icon = if r.passed { "✓" } else { "✗" };
        if !r.passed || verbose {
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

fn load_catalog() -> ItemCatalog {
    let specs: Vec<TemplateSpec> =
        serde_json::from_str(CATALOG_JSON).unwrap_or_else(|e| {
            eprintln!("item_catalog.json does not parse: {}", e);
            std::process::exit(1);
        });
    ItemCatalog::from_specs(specs).unwrap_or_else(|e| {
        eprintln!("item_catalog.json is inconsistent: {}", e);
        std::process::exit(1);
    })
}

/// The occupancy invariant, checked both directions: every occupied slot's
/// item is solid there, and every placed item's solid cell maps back to a
/// slot it owns.
fn check_invariant(world: &World, grid: &GridInventory) -> Result<(), String> {
    for slot in grid.slots() {
        if let Some(entity) = slot.occupant() {
            let item = world
                .get::<&Item>(entity)
                .map_err(|_| format!("slot ({},{}) holds a dead entity", slot.row(), slot.col()))?;
            if !item.occupies(slot.row() as i32, slot.col() as i32) {
                return Err(format!(
                    "slot ({},{}) occupant '{}' is not solid there",
                    slot.row(),
                    slot.col(),
                    item.template_id()
                ));
            }
        }
    }
    for (entity, item) in world.query::<&Item>().iter() {
        let Some((ar, ac)) = item.anchor() else {
            continue;
        };
        if !grid.contains(entity) {
            continue; // placed in some other grid
        }
        for (r, c) in item.current_mask().solid_cells() {
            let (row, col) = (ar + r as i32, ac + c as i32);
            if row < 0 || col < 0 || grid.occupant(row as u32, col as u32) != Some(entity) {
                return Err(format!(
                    "item '{}' solid cell ({},{}) not owned in grid",
                    item.template_id(),
                    row,
                    col
                ));
            }
        }
    }
    Ok(())
}

// ── 1. Catalog validation ───────────────────────────────────────────────

fn validate_catalog(catalog: &ItemCatalog, _verbose: bool) -> Vec<TestResult> {
    let mut results = Vec::new();

    results.push(TestResult::new(
        "catalog.nonempty",
        !catalog.is_empty(),
        format!("{} templates", catalog.len()),
    ));

    for id in catalog.ids() {
        let template = catalog.get(id).unwrap();
        let mask = template.base_mask();
        let ok = mask.width() > 0 && mask.height() > 0 && mask.solid_count() > 0;
        results.push(TestResult::new(
            &format!("catalog.{}", id),
            ok,
            format!(
                "{}×{}, {} solid cells",
                mask.width(),
                mask.height(),
                mask.solid_count()
            ),
        ));
    }
    results
}

// ── 2. Rotation closure ─────────────────────────────────────────────────

fn validate_rotation_closure(catalog: &ItemCatalog, _verbose: bool) -> Vec<TestResult> {
    let mut results = Vec::new();
    for id in catalog.ids() {
        let mask = catalog.get(id).unwrap().base_mask();
        let back = mask
            .rotated_clockwise()
            .rotated_clockwise()
            .rotated_clockwise()
            .rotated_clockwise();
        results.push(TestResult::new(
            &format!("rotation.closure.{}", id),
            back == *mask,
            "4× clockwise is identity".to_string(),
        ));
    }
    results
}

// ── 3. Placement & swap sweep ───────────────────────────────────────────

fn validate_placement(catalog: &ItemCatalog, _verbose: bool) -> Vec<TestResult> {
    let mut results = Vec::new();
    let mut world = World::new();
    let mut grid = GridInventory::new(6, 6);
    let mut session = PlacementSession::new();

    // Every template must fit somewhere on an empty 6×6 grid.
    for id in catalog.ids() {
        let entity = catalog.spawn(&mut world, id).unwrap();
        let mut placed_at = None;
        'scan: for r in 0..6 {
            for c in 0..6 {
                if grid.can_place(&world, entity, r, c, None) {
                    placed_at = Some((r, c));
                    break 'scan;
                }
            }
        }
        let ok = match placed_at {
            Some((r, c)) => grid.place(&mut world, entity, r, c).is_ok(),
            None => false,
        };
        results.push(TestResult::new(
            &format!("placement.fits.{}", id),
            ok,
            format!("{:?}", placed_at),
        ));
        grid.remove(&mut world, entity);
        let _ = world.despawn(entity);
    }

    // Swap resolution: one blocker swaps, two blockers reject.
    let blocker = catalog.spawn(&mut world, "cargo_crate").unwrap();
    grid.place(&mut world, blocker, 0, 0).unwrap();
    let incoming = catalog.spawn(&mut world, "cargo_crate").unwrap();
    session.pick_up(&mut world, [], incoming).unwrap();
    let outcome = session.attempt_place(&mut world, &mut grid, (100.0, 100.0), 100.0);
    results.push(TestResult::new(
        "placement.swap.single",
        outcome == PlaceOutcome::Swapped { displaced: blocker }
            && session.held() == Some(blocker),
        format!("{:?}", outcome),
    ));
    session.delete_held(&mut world);

    let a = catalog.spawn(&mut world, "bait_box").unwrap();
    let b = catalog.spawn(&mut world, "bait_box").unwrap();
    grid.place(&mut world, a, 4, 0).unwrap();
    grid.place(&mut world, b, 4, 1).unwrap();
    let wide = catalog.spawn(&mut world, "ice_chest").unwrap();
    session.pick_up(&mut world, [], wide).unwrap();
    // Ice chest is 4×2; anchored at (3,0) it covers both bait boxes.
    let before: Vec<Option<Entity>> = grid.slots().map(|s| s.occupant()).collect();
    let outcome = session.attempt_place(&mut world, &mut grid, (200.0, 400.0), 100.0);
    let after: Vec<Option<Entity>> = grid.slots().map(|s| s.occupant()).collect();
    results.push(TestResult::new(
        "placement.swap.multi_rejected",
        matches!(outcome, PlaceOutcome::Rejected(_)) && before == after,
        format!("{:?}", outcome),
    ));
    session.delete_held(&mut world);

    let invariant = check_invariant(&world, &grid);
    results.push(TestResult::new(
        "placement.invariant",
        invariant.is_ok(),
        invariant.err().unwrap_or_else(|| "holds".to_string()),
    ));
    results
}

// ── 4. Pointer mapping ──────────────────────────────────────────────────

fn validate_pointer_mapping(catalog: &ItemCatalog, _verbose: bool) -> Vec<TestResult> {
    let mut results = Vec::new();
    let mut world = World::new();
    let grid = GridInventory::new(8, 8);

    // Sweep the pointer across every cell center: a 1×1 item must map to
    // exactly the cell under the pointer.
    let bait = catalog.spawn(&mut world, "bait_box").unwrap();
    let mut centered_ok = true;
    for row in 0..8 {
        for col in 0..8 {
            let pointer = (col as f32 * 64.0 + 32.0, row as f32 * 64.0 + 32.0);
            if grid.map_pointer_to_origin(&world, bait, pointer, 64.0) != (row, col) {
                centered_ok = false;
            }
        }
    }
    results.push(TestResult::new(
        "pointer.cell_centers",
        centered_ok,
        "1×1 item lands under the pointer".to_string(),
    ));

    // Determinism across repeated calls.
    let chest = catalog.spawn(&mut world, "ice_chest").unwrap();
    let first = grid.map_pointer_to_origin(&world, chest, (301.5, 188.25), 64.0);
    let stable = (0..100)
        .all(|_| grid.map_pointer_to_origin(&world, chest, (301.5, 188.25), 64.0) == first);
    results.push(TestResult::new(
        "pointer.deterministic",
        stable,
        format!("{:?}", first),
    ));
    results
}

// ── 5. Persistence round trip ───────────────────────────────────────────

fn validate_persistence(catalog: &ItemCatalog, _verbose: bool) -> Vec<TestResult> {
    let mut results = Vec::new();
    let mut world = World::new();

    let config = GridConfig {
        name: "CargoHold".into(),
        width: 8,
        height: 8,
        slot_size: 64.0,
        starting_items: vec![
            StartingItem {
                item_id: "fishing_rod".into(),
                row: 0,
                col: 0,
                rotation: 0,
            },
            StartingItem {
                item_id: "boat_hook".into(),
                row: 0,
                col: 2,
                rotation: 2,
            },
            StartingItem {
                item_id: "fish_trap".into(),
                row: 5,
                col: 4,
                rotation: 0,
            },
        ],
    };
    let (grid, skipped) = build_grid(&mut world, catalog, &config);
    results.push(TestResult::new(
        "persistence.starting_items",
        skipped.is_empty(),
        format!("{} skipped", skipped.len()),
    ));

    let mut buffer = Vec::new();
    let saved = save_grid(&mut buffer, &world, &grid).is_ok();
    results.push(TestResult::new(
        "persistence.save",
        saved,
        format!("{} bytes", buffer.len()),
    ));

    let mut world2 = World::new();
    let mut grid2 = GridInventory::new(8, 8);
    let ok = match load_grid(&buffer[..], &mut world2, &mut grid2, catalog) {
        Ok(report) => report.loaded == 3 && report.skipped.is_empty(),
        Err(_) => false,
    };
    let mut original: Vec<_> = serialize_grid(&world, &grid)
        .into_iter()
        .map(|r| (r.item_id, r.anchor_row, r.anchor_col, r.rotation))
        .collect();
    let mut reloaded: Vec<_> = serialize_grid(&world2, &grid2)
        .into_iter()
        .map(|r| (r.item_id, r.anchor_row, r.anchor_col, r.rotation))
        .collect();
    original.sort();
    reloaded.sort();
    results.push(TestResult::new(
        "persistence.round_trip",
        ok && original == reloaded,
        format!("{} records", original.len()),
    ));
    results
}

// ── 6. Randomized soak ──────────────────────────────────────────────────

fn soak_invariant(catalog: &ItemCatalog, verbose: bool) -> Vec<TestResult> {
    const STEPS: usize = 2_000;

    let mut results = Vec::new();
    let mut rng = rand::thread_rng();
    let mut world = World::new();
    let mut grid = GridInventory::new(10, 10);
    let mut session = PlacementSession::new();
    let ids: Vec<String> = catalog.ids().map(str::to_string).collect();

    let mut placements = 0usize;
    let mut swaps = 0usize;
    let mut rejections = 0usize;

    for step in 0..STEPS {
        if session.is_holding() {
            match rng.gen_range(0..10) {
                0 => session.rotate_held(&mut world),
                1 => session.delete_held(&mut world),
                _ => {
                    let pointer = (rng.gen_range(-64.0..704.0), rng.gen_range(-64.0..704.0));
                    match session.attempt_place(&mut world, &mut grid, pointer, 64.0) {
                        PlaceOutcome::Placed => placements += 1,
                        PlaceOutcome::Swapped { .. } => swaps += 1,
                        PlaceOutcome::Rejected(_) => rejections += 1,
                        PlaceOutcome::NothingHeld => {}
                    }
                }
            }
        } else {
            // Either spawn something new or pick a placed item back up.
            let placed: Vec<Entity> = grid
                .slots()
                .filter_map(|s| s.occupant())
                .collect::<std::collections::BTreeSet<_>>()
                .into_iter()
                .collect();
            if placed.is_empty() || rng.gen_bool(0.5) {
                let id = ids.choose(&mut rng).unwrap();
                let entity = catalog.spawn(&mut world, id).unwrap();
                let _ = session.pick_up(&mut world, [&mut grid], entity);
            } else {
                let entity = *placed.choose(&mut rng).unwrap();
                let _ = session.pick_up(&mut world, [&mut grid], entity);
            }
        }

        if let Err(detail) = check_invariant(&world, &grid) {
            results.push(TestResult::new(
                "soak.invariant",
                false,
                format!("step {}: {}", step, detail),
            ));
            return results;
        }
    }

    results.push(TestResult::new(
        "soak.invariant",
        true,
        format!(
            "{} steps: {} placed, {} swapped, {} rejected",
            STEPS, placements, swaps, rejections
        ),
    ));
    if verbose {
        results.push(TestResult::new(
            "soak.final_grid",
            true,
            format!(
                "{} slots occupied",
                grid.slots().filter(|s| s.occupant().is_some()).count()
            ),
        ));
    }
    results
}

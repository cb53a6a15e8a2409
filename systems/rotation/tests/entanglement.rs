use quantum_loop_core::{CellCoord, EntanglementGroup, Grid, RotationRejection, Tile, TileKind};
use quantum_loop_system_rotation::{apply_rotation, RotationOutcome};

fn alpha(kind: TileKind) -> Tile {
    Tile::new(kind).in_group(EntanglementGroup::Alpha)
}

fn rotations(grid: &Grid) -> Vec<u8> {
    grid.iter()
        .map(|(_, tile)| tile.rotation().quarter_turns())
        .collect()
}

fn rotate(grid: &Grid, cell: CellCoord, tick: u64) -> (Grid, Vec<CellCoord>) {
    match apply_rotation(grid, cell, tick) {
        RotationOutcome::Rotated { grid, rotated } => (grid, rotated),
        RotationOutcome::Rejected(reason) => panic!("rotation rejected: {reason:?}"),
    }
}

fn entangled_grid() -> Grid {
    Grid::from_rows(vec![
        vec![
            Tile::new(TileKind::Source).with_rotation(1).fixed(),
            alpha(TileKind::Corner),
            Tile::new(TileKind::Straight),
        ],
        vec![
            alpha(TileKind::Straight).with_rotation(1),
            Tile::new(TileKind::Corner).in_group(EntanglementGroup::Beta),
            alpha(TileKind::Corner).with_rotation(2),
        ],
        vec![
            Tile::new(TileKind::Empty),
            Tile::new(TileKind::Sink).fixed(),
            alpha(TileKind::Corner).with_rotation(3).fixed(),
        ],
    ])
    .expect("square grid")
}

#[test]
fn whole_group_advances_together() {
    let grid = entangled_grid();

    let (next, rotated) = rotate(&grid, CellCoord::new(1, 0), 0);

    assert_eq!(
        rotated,
        vec![
            CellCoord::new(1, 0),
            CellCoord::new(0, 1),
            CellCoord::new(1, 2),
        ]
    );
    assert_eq!(rotations(&next), vec![1, 1, 0, 2, 0, 3, 0, 0, 3]);
}

#[test]
fn four_rotations_restore_the_group() {
    let grid = entangled_grid();
    let cell = CellCoord::new(0, 1);

    let mut current = grid.clone();
    for _ in 0..4 {
        current = rotate(&current, cell, 0).0;
    }

    assert_eq!(current, grid);
}

#[test]
fn fixed_source_rejects_rotation() {
    let grid = entangled_grid();

    assert_eq!(
        apply_rotation(&grid, CellCoord::new(0, 0), 0),
        RotationOutcome::Rejected(RotationRejection::Fixed)
    );
}

#[test]
fn locked_partner_is_skipped_but_does_not_block() {
    let mut rows = vec![
        vec![alpha(TileKind::Corner), alpha(TileKind::Corner)],
        vec![alpha(TileKind::Straight), Tile::new(TileKind::Empty)],
    ];
    rows[0][1].lock_until(10);
    let grid = Grid::from_rows(rows).expect("square grid");

    let (next, rotated) = rotate(&grid, CellCoord::new(0, 0), 3);

    assert_eq!(rotated, vec![CellCoord::new(0, 0), CellCoord::new(1, 0)]);
    assert_eq!(rotations(&next), vec![1, 0, 1, 0]);

    let (after_expiry, rotated) = rotate(&grid, CellCoord::new(0, 0), 10);
    assert_eq!(rotated.len(), 3);
    assert_eq!(rotations(&after_expiry), vec![1, 1, 1, 0]);
}

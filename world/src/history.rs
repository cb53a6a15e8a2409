//! Bounded record of grids replaced by player rotations.

use std::{collections::VecDeque, sync::Arc};

use quantum_loop_core::Grid;

/// Capacity used when the session configuration does not override it.
pub const DEFAULT_HISTORY_CAPACITY: usize = 64;

/// Ring of previous grid snapshots, oldest first.
///
/// The session never restores from the buffer; it only exposes it to queries.
#[derive(Clone, Debug)]
pub(crate) struct History {
    capacity: usize,
    grids: VecDeque<Arc<Grid>>,
}

impl History {
    pub(crate) fn new(capacity: usize) -> Self {
        Self {
            capacity,
            grids: VecDeque::with_capacity(capacity.min(DEFAULT_HISTORY_CAPACITY)),
        }
    }

    /// Records a replaced grid, evicting the oldest entry when full.
    pub(crate) fn push(&mut self, grid: Arc<Grid>) {
        if self.capacity == 0 {
            return;
        }
        while self.grids.len() >= self.capacity {
            let _ = self.grids.pop_front();
        }
        self.grids.push_back(grid);
    }

    pub(crate) fn len(&self) -> usize {
        self.grids.len()
    }

    pub(crate) fn latest(&self) -> Option<&Arc<Grid>> {
        self.grids.back()
    }
}

#[cfg(test)]
mod tests {
    use super::History;
    use quantum_loop_core::{Grid, Tile, TileKind};
    use std::sync::Arc;

    fn grid(kind: TileKind) -> Arc<Grid> {
        Arc::new(Grid::from_rows(vec![vec![Tile::new(kind); 2]; 2]).expect("square grid"))
    }

    #[test]
    fn evicts_oldest_snapshot_when_full() {
        let mut history = History::new(2);
        history.push(grid(TileKind::Empty));
        history.push(grid(TileKind::Corner));
        history.push(grid(TileKind::Cross));

        assert_eq!(history.len(), 2);
        assert_eq!(history.latest(), Some(&grid(TileKind::Cross)));
    }

    #[test]
    fn zero_capacity_stores_nothing() {
        let mut history = History::new(0);
        history.push(grid(TileKind::Empty));

        assert_eq!(history.len(), 0);
    }
}

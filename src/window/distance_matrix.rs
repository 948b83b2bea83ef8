//! Slot-indexed symmetric distance matrix.
//!
//! The matrix doubles as the slot allocator: a slot is free exactly when its
//! row holds nothing but the sentinel. Occupied slots carry their own
//! self-distance (`0.0`) on the diagonal, so even a lone live observation
//! with no partners keeps its row marked as taken.

/// Cell value meaning "no valid distance".
pub const SENTINEL: f64 = -1.0;

/// Reusable handle into the matrix and the observation table.
pub type Slot = usize;

/// `capacity x capacity` symmetric matrix stored row-major in one buffer.
#[derive(Debug, Clone)]
pub struct DistanceMatrix {
    capacity: usize,
    cells: Vec<f64>,
}

impl DistanceMatrix {
    /// Create a matrix with every cell set to the sentinel.
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            cells: vec![SENTINEL; capacity * capacity],
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    #[inline]
    fn offset(&self, i: Slot, j: Slot) -> usize {
        i * self.capacity + j
    }

    /// Raw cell value, sentinel included.
    #[inline]
    pub fn get(&self, i: Slot, j: Slot) -> f64 {
        self.cells[self.offset(i, j)]
    }

    /// Cached distance, or `None` for a sentinel cell.
    pub fn distance(&self, i: Slot, j: Slot) -> Option<f64> {
        if i >= self.capacity || j >= self.capacity {
            return None;
        }
        let d = self.get(i, j);
        (d >= 0.0).then_some(d)
    }

    /// Store `distance` in both `(i, j)` and `(j, i)`.
    pub fn set(&mut self, i: Slot, j: Slot, distance: f64) {
        let ij = self.offset(i, j);
        let ji = self.offset(j, i);
        self.cells[ij] = distance;
        self.cells[ji] = distance;
    }

    /// Mark `slot` as taken.
    pub fn occupy(&mut self, slot: Slot) {
        self.set(slot, slot, 0.0);
    }

    /// Reset the whole row and column of `slot` to the sentinel.
    pub fn clear(&mut self, slot: Slot) {
        for k in 0..self.capacity {
            let row = self.offset(slot, k);
            let col = self.offset(k, slot);
            self.cells[row] = SENTINEL;
            self.cells[col] = SENTINEL;
        }
    }

    /// A row of cells.
    pub fn row(&self, slot: Slot) -> &[f64] {
        let start = self.offset(slot, 0);
        &self.cells[start..start + self.capacity]
    }

    /// True when the row of `slot` is entirely sentinel.
    pub fn is_free(&self, slot: Slot) -> bool {
        self.row(slot).iter().all(|&d| d == SENTINEL)
    }

    /// Lowest-numbered free slot, scanning from zero.
    pub fn first_free(&self) -> Option<Slot> {
        (0..self.capacity).find(|&slot| self.is_free(slot))
    }

    /// Neighbor edge test: distinct slots with `0 < d < eps`.
    ///
    /// Sentinel cells and zero distances never qualify, whatever `eps` is.
    #[inline]
    pub fn is_neighbor(&self, i: Slot, j: Slot, eps: f64) -> bool {
        if i == j {
            return false;
        }
        let d = self.get(i, j);
        d > 0.0 && d < eps
    }

    /// Check `m[i][j] == m[j][i]` over the whole matrix.
    pub fn is_symmetric(&self) -> bool {
        (0..self.capacity).all(|i| {
            (i + 1..self.capacity).all(|j| self.get(i, j).to_bits() == self.get(j, i).to_bits())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_matrix_is_all_sentinel() {
        let m = DistanceMatrix::new(4);
        assert!((0..4).all(|s| m.is_free(s)));
        assert_eq!(m.first_free(), Some(0));
        assert_eq!(m.distance(1, 2), None);
    }

    #[test]
    fn test_occupy_marks_row_taken() {
        let mut m = DistanceMatrix::new(3);
        m.occupy(0);
        assert!(!m.is_free(0));
        assert_eq!(m.first_free(), Some(1));
        assert_eq!(m.distance(0, 0), Some(0.0));
    }

    #[test]
    fn test_clear_resets_row_and_column() {
        let mut m = DistanceMatrix::new(3);
        m.occupy(0);
        m.occupy(1);
        m.set(0, 1, 2.5);
        m.clear(1);
        assert!(m.is_free(1));
        assert_eq!(m.get(0, 1), SENTINEL);
        assert_eq!(m.get(1, 0), SENTINEL);
        assert!(!m.is_free(0));
    }

    #[test]
    fn test_sentinel_is_never_a_neighbor() {
        let m = DistanceMatrix::new(2);
        assert!(!m.is_neighbor(0, 1, f64::MAX));
        assert!(!m.is_neighbor(0, 1, -5.0));
        assert!(!m.is_neighbor(0, 1, f64::INFINITY));
    }

    #[test]
    fn test_zero_distance_is_not_a_neighbor() {
        let mut m = DistanceMatrix::new(2);
        m.set(0, 1, 0.0);
        assert!(!m.is_neighbor(0, 1, 1.0));
        m.set(0, 1, 0.5);
        assert!(m.is_neighbor(0, 1, 1.0));
        assert!(!m.is_neighbor(0, 1, 0.5));
        assert!(!m.is_neighbor(0, 0, 1.0));
    }
}

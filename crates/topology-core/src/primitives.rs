//! # Primitives
//!
//! Fixed constants of the topology core.
//!
//! ## Layout
//!
//! New nodes are placed on a simple grid so they fan out without overlapping:
//! `column = prior_count % GRID_COLUMNS`, `row = prior_count / GRID_COLUMNS`.

/// Number of columns in the initial placement grid.
pub const GRID_COLUMNS: u32 = 5;

/// X coordinate of the first grid column.
pub const GRID_ORIGIN_X: u32 = 180;

/// Y coordinate of the first grid row.
pub const GRID_ORIGIN_Y: u32 = 100;

/// Horizontal distance between grid columns.
pub const GRID_STEP_X: u32 = 70;

/// Vertical distance between grid rows.
pub const GRID_STEP_Y: u32 = 60;

// =============================================================================
// INPUT VALIDATION LIMITS
// =============================================================================

/// Maximum length of a node label, in bytes.
pub const MAX_LABEL_LENGTH: usize = 256;

/// Maximum length of a type key, in bytes.
pub const MAX_TYPE_KEY_LENGTH: usize = 64;

/// Grid coordinates for the node placed after `prior_count` others.
#[must_use]
pub fn grid_position(prior_count: usize) -> (f64, f64) {
    let index = u32::try_from(prior_count).unwrap_or(u32::MAX);
    let column = index % GRID_COLUMNS;
    let row = index / GRID_COLUMNS;

    let x = GRID_ORIGIN_X.saturating_add(column.saturating_mul(GRID_STEP_X));
    let y = GRID_ORIGIN_Y.saturating_add(row.saturating_mul(GRID_STEP_Y));
    (f64::from(x), f64::from(y))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grid_wraps_after_five_columns() {
        assert_eq!(grid_position(0), (180.0, 100.0));
        assert_eq!(grid_position(4), (460.0, 100.0));
        assert_eq!(grid_position(5), (180.0, 160.0));
        assert_eq!(grid_position(12), (320.0, 220.0));
    }

    #[test]
    fn grid_saturates_instead_of_overflowing() {
        let (x, y) = grid_position(usize::MAX);
        assert!(x >= f64::from(GRID_ORIGIN_X));
        assert!(y >= f64::from(GRID_ORIGIN_Y));
    }
}

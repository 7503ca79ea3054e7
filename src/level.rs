//! Refinement-level and level-of-detail addressing.
//!
//! Two independent selectors govern which approximation of a variable is
//! read. A refinement `level` indexes the multiresolution hierarchy:
//! non-negative values count up from the coarsest level (0), negative values
//! count back from the finest (-1 is native resolution). A `lod` indexes the
//! compression-ratio ladder the same way: 0 is least compressed, -1 is most.
//! Out-of-range values clamp to the nearest valid extreme; they are never
//! rejected.

/// Clamp a signed refinement level into `[-num_levels, num_levels - 1]`.
pub fn clamp_level(level: i32, num_levels: usize) -> i32 {
    let n = num_levels.max(1) as i32;
    level.clamp(-n, n - 1)
}

/// Resolve a signed refinement level to its canonical non-negative index,
/// clamping first. 0 is the coarsest level, `num_levels - 1` the finest.
pub fn resolve_level(level: i32, num_levels: usize) -> usize {
    let n = num_levels.max(1) as i32;
    let level = clamp_level(level, num_levels);
    if level < 0 {
        (n + level) as usize
    } else {
        level as usize
    }
}

/// Clamp a signed level-of-detail into `[-num_lods, num_lods - 1]`.
pub fn clamp_lod(lod: i32, num_lods: usize) -> i32 {
    let n = num_lods.max(1) as i32;
    lod.clamp(-n, n - 1)
}

/// Resolve a signed level-of-detail to its canonical index into the
/// compression-ratio vector, clamping first. 0 is the least-compressed
/// entry, `num_lods - 1` the most.
pub fn resolve_lod(lod: i32, num_lods: usize) -> usize {
    let n = num_lods.max(1) as i32;
    let lod = clamp_lod(lod, num_lods);
    if lod < 0 {
        (n + lod) as usize
    } else {
        lod as usize
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_positive_indexing() {
        assert_eq!(resolve_level(0, 4), 0);
        assert_eq!(resolve_level(3, 4), 3);
        assert_eq!(resolve_level(4, 4), 3); // clamped to finest
        assert_eq!(resolve_level(i32::MAX, 4), 3);
    }

    #[test]
    fn test_level_negative_indexing() {
        assert_eq!(resolve_level(-1, 4), 3); // native resolution
        assert_eq!(resolve_level(-4, 4), 0);
        assert_eq!(resolve_level(-5, 4), 0); // clamped to coarsest
        assert_eq!(resolve_level(i32::MIN, 4), 0);
    }

    #[test]
    fn test_level_clamp_range() {
        // Clamped values always land inside [-n, n - 1]
        for level in -10..10 {
            let clamped = clamp_level(level, 3);
            assert!((-3..3).contains(&clamped));
            assert!(resolve_level(level, 3) < 3);
        }
    }

    #[test]
    fn test_lod_over_cratio_ladder() {
        // cratios = [8, 4, 2, 1]
        let cratios = [8usize, 4, 2, 1];
        let n = cratios.len();
        assert_eq!(cratios[resolve_lod(-1, n)], 1); // least compression
        assert_eq!(cratios[resolve_lod(0, n)], 8); // most compression
        assert_eq!(cratios[resolve_lod(-4, n)], 8);
        assert_eq!(cratios[resolve_lod(100, n)], 1);
        assert_eq!(cratios[resolve_lod(-100, n)], 8);
    }

    #[test]
    fn test_degenerate_single_entry() {
        for v in [-3, -1, 0, 1, 3] {
            assert_eq!(resolve_level(v, 1), 0);
            assert_eq!(resolve_lod(v, 1), 0);
        }
    }

    #[test]
    fn test_zero_treated_as_one() {
        // A variable always has at least one level and one lod
        assert_eq!(resolve_level(-1, 0), 0);
        assert_eq!(resolve_lod(2, 0), 0);
    }
}

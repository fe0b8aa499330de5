//! Data masking and mask selection.
//!
//! Masking XORs data modules with one of eight fixed patterns to break up
//! large single-colour areas and finder look-alikes. Every mask is tried,
//! the resulting symbol scored, and the lowest penalty kept.

use std::fmt;

use log::{debug, trace};

use crate::error::{QrError, Result};
use crate::matrix::{Grid, place};
use crate::version::{ErrorCorrectionLevel, Version};

/// One of the eight data mask patterns (0-7).
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MaskPattern(u8);

impl MaskPattern {
    pub fn new(id: u8) -> Result<Self> {
        if id < 8 {
            Ok(MaskPattern(id))
        } else {
            Err(QrError::InvalidMaskPattern(id))
        }
    }

    pub fn id(self) -> u8 {
        self.0
    }

    /// All masks in ascending id order.
    pub fn all() -> impl Iterator<Item = MaskPattern> {
        (0..8).map(MaskPattern)
    }

    /// Determine if a position should be flipped by this mask pattern.
    ///
    /// The 8 mask patterns (row = i, col = j):
    /// - 0: (i + j) mod 2 = 0
    /// - 1: i mod 2 = 0
    /// - 2: j mod 3 = 0
    /// - 3: (i + j) mod 3 = 0
    /// - 4: (i/2 + j/3) mod 2 = 0
    /// - 5: (i*j) mod 2 + (i*j) mod 3 = 0
    /// - 6: ((i*j) mod 2 + (i*j) mod 3) mod 2 = 0
    /// - 7: ((i+j) mod 2 + (i*j) mod 3) mod 2 = 0
    pub fn is_masked(self, row: usize, col: usize) -> bool {
        let i = row;
        let j = col;
        match self.0 {
            0 => (i + j).is_multiple_of(2),
            1 => i.is_multiple_of(2),
            2 => j.is_multiple_of(3),
            3 => (i + j).is_multiple_of(3),
            4 => (i / 2 + j / 3).is_multiple_of(2),
            5 => (i * j) % 2 + (i * j) % 3 == 0,
            6 => ((i * j) % 2 + (i * j) % 3).is_multiple_of(2),
            _ => ((i + j) % 2 + (i * j) % 3).is_multiple_of(2),
        }
    }
}

impl fmt::Display for MaskPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Penalty score of a finished symbol, broken down per rule.
///
/// The balance term is fractional, so totals are compared as `f64`.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct PenaltyScore {
    /// Rule 1: modules with more than five same-coloured neighbours.
    pub adjacent: u32,
    /// Rule 2: single-colour 2x2 blocks.
    pub blocks: u32,
    /// Rule 3: `1 0 1 1 1 0 1` runs in rows and columns.
    pub finder_like: u32,
    /// Rule 4: deviation of the dark ratio from 50%, two points per percent.
    pub balance: f64,
}

impl PenaltyScore {
    pub fn of(grid: &Grid) -> Self {
        Self {
            adjacent: adjacent_penalty(grid),
            blocks: block_penalty(grid),
            finder_like: finder_like_penalty(grid),
            balance: balance_penalty(grid),
        }
    }

    pub fn total(&self) -> f64 {
        (self.adjacent + self.blocks + self.finder_like) as f64 + self.balance
    }
}

/// For each module, `3 + (n - 5)` when `n > 5` of its 8 neighbours share its colour.
fn adjacent_penalty(grid: &Grid) -> u32 {
    let size = grid.size();
    let mut penalty = 0;

    for row in 0..size {
        for col in 0..size {
            let dark = grid.is_dark(row, col);
            let mut same = 0;
            for r in row.saturating_sub(1)..=(row + 1).min(size - 1) {
                for c in col.saturating_sub(1)..=(col + 1).min(size - 1) {
                    if (r, c) != (row, col) && grid.is_dark(r, c) == dark {
                        same += 1;
                    }
                }
            }
            if same > 5 {
                penalty += 3 + same - 5;
            }
        }
    }

    penalty
}

fn block_penalty(grid: &Grid) -> u32 {
    let size = grid.size();
    let mut penalty = 0;

    for row in 0..size - 1 {
        for col in 0..size - 1 {
            let color = grid.is_dark(row, col);
            if color == grid.is_dark(row, col + 1)
                && color == grid.is_dark(row + 1, col)
                && color == grid.is_dark(row + 1, col + 1)
            {
                penalty += 3;
            }
        }
    }

    penalty
}

/// Finder-like patterns (1:1:3:1:1 ratio)
fn finder_like_penalty(grid: &Grid) -> u32 {
    const PATTERN: [bool; 7] = [true, false, true, true, true, false, true];
    let size = grid.size();
    let mut penalty = 0;

    for line in 0..size {
        for start in 0..size.saturating_sub(6) {
            if (0..7).all(|k| grid.is_dark(line, start + k) == PATTERN[k]) {
                penalty += 40;
            }
            if (0..7).all(|k| grid.is_dark(start + k, line) == PATTERN[k]) {
                penalty += 40;
            }
        }
    }

    penalty
}

/// Color imbalance: 10 * (|dark% - 50| / 5), unrounded.
fn balance_penalty(grid: &Grid) -> f64 {
    let size = grid.size() as f64;
    let dark = grid.dark_count() as f64;
    let ratio = ((100.0 * dark) / size / size - 50.0).abs() / 5.0;
    ratio * 10.0
}

/// Place the codewords under every mask and keep the lowest-penalty symbol.
///
/// Ties go to the lowest mask id.
pub fn select_best_mask(
    codewords: &[u8],
    version: Version,
    ecl: ErrorCorrectionLevel,
) -> (Grid, MaskPattern) {
    let mut masks = MaskPattern::all();
    let mut best_mask = MaskPattern(0);
    let mut best_grid = place(codewords, version, ecl, best_mask);
    let mut best_penalty = PenaltyScore::of(&best_grid).total();
    trace!("mask {} penalty {}", best_mask, best_penalty);

    masks.next();
    for mask in masks {
        let grid = place(codewords, version, ecl, mask);
        let penalty = PenaltyScore::of(&grid).total();
        trace!("mask {} penalty {}", mask, penalty);

        if penalty < best_penalty {
            best_penalty = penalty;
            best_mask = mask;
            best_grid = grid;
        }
    }

    debug!("selected mask {} with penalty {}", best_mask, best_penalty);
    (best_grid, best_mask)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matrix::Module;

    fn v(n: u8) -> Version {
        Version::new(n).unwrap()
    }

    fn sample_codewords(version: Version) -> Vec<u8> {
        (0..version.total_codewords(ErrorCorrectionLevel::M))
            .map(|i| (i * 31 + 7) as u8)
            .collect()
    }

    #[test]
    fn mask_ids_are_bounded() {
        assert!(MaskPattern::new(7).is_ok());
        assert_eq!(MaskPattern::new(8), Err(QrError::InvalidMaskPattern(8)));
        assert_eq!(MaskPattern::all().count(), 8);
    }

    #[test]
    fn mask_formulas_at_sample_positions() {
        let m = |id| MaskPattern::new(id).unwrap();
        assert!(m(0).is_masked(0, 0));
        assert!(!m(0).is_masked(0, 1));
        assert!(m(1).is_masked(2, 5));
        assert!(!m(1).is_masked(3, 5));
        assert!(m(2).is_masked(1, 3));
        assert!(!m(2).is_masked(1, 4));
        assert!(m(3).is_masked(1, 2));
        assert!(m(4).is_masked(1, 2));
        assert!(!m(4).is_masked(2, 0));
        assert!(m(5).is_masked(0, 7));
        assert!(!m(5).is_masked(1, 1));
        assert!(m(6).is_masked(1, 1));
        assert!(!m(6).is_masked(1, 2));
        assert!(m(7).is_masked(0, 0));
        assert!(!m(7).is_masked(1, 1));
    }

    #[test]
    fn all_dark_grid_penalties() {
        // Corners see 3 neighbours and edges 5, so only the 19x19 interior
        // (8 same-coloured neighbours, 3 + 8 - 5 each) is penalised.
        let grid = Grid::from_fn(21, |_, _| true);
        let score = PenaltyScore::of(&grid);
        assert_eq!(score.adjacent, 19 * 19 * 6);
        assert_eq!(score.blocks, 20 * 20 * 3);
        assert_eq!(score.finder_like, 0);
        assert_eq!(score.balance, 100.0);
        assert_eq!(score.total(), 2166.0 + 1200.0 + 100.0);
    }

    #[test]
    fn adjacent_penalty_at_corner_edge_and_centre() {
        // Only the centre of a uniform 3x3 grid has more than 5 equal neighbours.
        let grid = Grid::from_fn(3, |_, _| false);
        assert_eq!(adjacent_penalty(&grid), 6);
        assert_eq!(block_penalty(&grid), 4 * 3);

        // A light centre: every dark border module loses its match with it.
        // Corners keep 2 of 3, edges 4 of 5, the centre matches none.
        let grid = Grid::from_fn(3, |r, c| (r, c) != (1, 1));
        assert_eq!(adjacent_penalty(&grid), 0);
        assert_eq!(block_penalty(&grid), 0);

        // 4x4 all light: 4 interior modules, 8 neighbours each.
        let grid = Grid::from_fn(4, |_, _| false);
        assert_eq!(adjacent_penalty(&grid), 4 * 6);

        // One dark corner in a light 4x4 grid: (1, 1) drops to 7 matches.
        let grid = Grid::from_fn(4, |r, c| r == 0 && c == 0);
        assert_eq!(adjacent_penalty(&grid), 5 + 3 * 6);
    }

    #[test]
    fn isolated_finder_like_run_scores_forty() {
        const RUN: [bool; 7] = [true, false, true, true, true, false, true];
        let row_run = Grid::from_fn(11, |r, c| r == 5 && (2..9).contains(&c) && RUN[c - 2]);
        assert_eq!(finder_like_penalty(&row_run), 40);

        let col_run = Grid::from_fn(11, |r, c| c == 0 && (4..11).contains(&r) && RUN[r - 4]);
        assert_eq!(finder_like_penalty(&col_run), 40);

        let both = Grid::from_fn(11, |r, c| {
            (r == 5 && (2..9).contains(&c) && RUN[c - 2]) || (c == 0 && (4..11).contains(&r) && RUN[r - 4])
        });
        assert_eq!(finder_like_penalty(&both), 80);

        // Too short to match.
        let short = Grid::from_fn(6, |r, c| r == 0 && c.is_multiple_of(2));
        assert_eq!(finder_like_penalty(&short), 0);
    }

    #[test]
    fn every_symbol_has_finder_like_runs_through_the_finders() {
        let grid = place(&[0u8; 26], v(1), ErrorCorrectionLevel::M, MaskPattern(0));
        let score = PenaltyScore::of(&grid);
        // Row and column through each finder centre.
        assert!(score.finder_like >= 6 * 40);
    }

    #[test]
    fn balance_penalty_is_not_rounded() {
        let grid = Grid::from_fn(4, |r, c| r * 4 + c < 8);
        assert_eq!(balance_penalty(&grid), 0.0);

        // 9 of 16 dark: 56.25%, 6.25 points off centre.
        let grid = Grid::from_fn(4, |r, c| r * 4 + c < 9);
        assert_eq!(balance_penalty(&grid), 12.5);

        // 231 of 441 dark is 52.38%: below one 5% step, still penalised.
        let grid = Grid::from_fn(21, |r, c| r * 21 + c < 231);
        let expected = ((100.0 * 231.0) / 21.0 / 21.0 - 50.0_f64).abs() / 5.0 * 10.0;
        assert_eq!(balance_penalty(&grid), expected);
        assert!(expected > 4.7 && expected < 4.8);
    }

    #[test]
    fn fractional_balance_decides_the_mask() {
        // Integer-rounded balance would pick mask 3 here.
        let code = crate::QrCode::encode("https://example.com/80", ErrorCorrectionLevel::M).unwrap();
        assert_eq!(code.mask().id(), 5);
    }

    #[test]
    fn selected_mask_has_minimal_penalty() {
        for n in [1u8, 2, 7] {
            let version = v(n);
            let codewords = sample_codewords(version);
            let (grid, chosen) = select_best_mask(&codewords, version, ErrorCorrectionLevel::M);
            let chosen_penalty = PenaltyScore::of(&grid).total();

            for mask in MaskPattern::all() {
                let other = place(&codewords, version, ErrorCorrectionLevel::M, mask);
                let penalty = PenaltyScore::of(&other).total();
                assert!(chosen_penalty <= penalty, "version {} mask {}", n, mask);
                if mask < chosen {
                    assert!(chosen_penalty < penalty, "tie must go to mask {}", mask);
                }
            }
            assert_eq!(grid, place(&codewords, version, ErrorCorrectionLevel::M, chosen));
        }
    }

    #[test]
    fn masks_only_touch_data_modules() {
        let version = v(2);
        let codewords = sample_codewords(version);
        let base = place(&codewords, version, ErrorCorrectionLevel::M, MaskPattern(0));
        let other = place(&codewords, version, ErrorCorrectionLevel::M, MaskPattern(1));
        let size = version.size();

        for row in 0..size {
            for col in 0..size {
                match (base.module(row, col), other.module(row, col)) {
                    (Module::Data(a), Module::Data(b)) => {
                        let flips = MaskPattern(0).is_masked(row, col)
                            ^ MaskPattern(1).is_masked(row, col);
                        assert_eq!(a ^ b, flips, "module ({}, {})", row, col);
                    }
                    (Module::Function(_), Module::Function(_)) => {}
                    (a, b) => panic!("module kind changed at ({}, {}): {:?} vs {:?}", row, col, a, b),
                }
            }
        }
    }
}

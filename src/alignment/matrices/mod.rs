use std::fmt;

use crate::alignment::{GapExtension, Mapping, PairwiseAlignment, ProfileScoring};
use crate::alphabets::ParsimonySet;

/// Move into a cell of the dynamic program. `GapInX` consumes a column of the right profile
/// against a gap in the left one (horizontal), `GapInY` the reverse (vertical).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Direction {
    Matc,
    GapInY,
    GapInX,
}

use Direction::*;

/// Score matrix `S` and move matrix `T` for aligning two profiles, given by their column sets.
pub(crate) struct ProfileAlignmentMatrices<'a> {
    rows: usize,
    cols: usize,
    scoring: &'a dyn ProfileScoring,
    x_sets: &'a [ParsimonySet],
    y_sets: &'a [ParsimonySet],
    pub(super) score: Vec<Vec<f64>>,
    pub(super) trace: Vec<Vec<Direction>>,
}

impl fmt::Display for ProfileAlignmentMatrices<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "S")?;
        for row in &self.score {
            writeln!(f, "{:?}", row)?;
        }
        writeln!(f, "T")?;
        for row in &self.trace {
            writeln!(f, "{:?}", row)?;
        }
        Ok(())
    }
}

impl<'a> ProfileAlignmentMatrices<'a> {
    pub(crate) fn new(
        x_sets: &'a [ParsimonySet],
        y_sets: &'a [ParsimonySet],
        scoring: &'a dyn ProfileScoring,
    ) -> ProfileAlignmentMatrices<'a> {
        let rows = x_sets.len() + 1;
        let cols = y_sets.len() + 1;
        ProfileAlignmentMatrices {
            rows,
            cols,
            scoring,
            x_sets,
            y_sets,
            score: vec![vec![0.0; cols]; rows],
            trace: vec![vec![Matc; cols]; rows],
        }
    }

    /// Ties prefer the diagonal, then the vertical move.
    fn select_direction(&self, sm: f64, sy: f64, sx: f64) -> (f64, Direction) {
        let (mut min_val, mut dir) = (sm, Matc);
        if sy < min_val {
            (min_val, dir) = (sy, GapInY);
        }
        if sx < min_val {
            (min_val, dir) = (sx, GapInX);
        }
        (min_val, dir)
    }

    /// Gap cost of a column, waived when the previous move put a gap on the same side and
    /// extensions are free.
    fn gap_cost(&self, set: &ParsimonySet, previous: Direction, current: Direction) -> f64 {
        if self.scoring.gap_extension() == GapExtension::Free && previous == current {
            0.0
        } else {
            self.scoring.gap_cost(set)
        }
    }

    pub(crate) fn fill_matrices(&mut self) {
        self.init_x();
        self.init_y();
        for i in 1..self.rows {
            for j in 1..self.cols {
                (self.score[i][j], self.trace[i][j]) = self.fill_cell(i, j);
            }
        }
    }

    fn init_x(&mut self) {
        for i in 1..self.rows {
            self.score[i][0] = self.score[i - 1][0]
                + self.gap_cost(&self.x_sets[i - 1], self.trace[i - 1][0], GapInY);
            self.trace[i][0] = GapInY;
        }
    }

    fn init_y(&mut self) {
        for j in 1..self.cols {
            self.score[0][j] = self.score[0][j - 1]
                + self.gap_cost(&self.y_sets[j - 1], self.trace[0][j - 1], GapInX);
            self.trace[0][j] = GapInX;
        }
    }

    fn fill_cell(&self, i: usize, j: usize) -> (f64, Direction) {
        let x_set = &self.x_sets[i - 1];
        let y_set = &self.y_sets[j - 1];
        self.select_direction(
            self.score[i - 1][j - 1] + self.scoring.match_cost(x_set, y_set),
            self.score[i - 1][j] + self.gap_cost(x_set, self.trace[i - 1][j], GapInY),
            self.score[i][j - 1] + self.gap_cost(y_set, self.trace[i][j - 1], GapInX),
        )
    }

    /// Final score, the merged column sets and the column mapping of both profiles.
    pub(crate) fn traceback(&self) -> (Vec<ParsimonySet>, PairwiseAlignment, f64) {
        let mut i = self.rows - 1;
        let mut j = self.cols - 1;
        let score = self.score[i][j];
        let max_alignment_length = self.rows + self.cols - 2;
        let mut sets = Vec::<ParsimonySet>::with_capacity(max_alignment_length);
        let mut alignment = PairwiseAlignment::new(
            Mapping::with_capacity(max_alignment_length),
            Mapping::with_capacity(max_alignment_length),
        );
        while i > 0 || j > 0 {
            let (map_x, map_y, set) = match self.trace[i][j] {
                Matc => {
                    i -= 1;
                    j -= 1;
                    let mut set = self.x_sets[i] & self.y_sets[j];
                    if set.is_empty() {
                        set = self.x_sets[i] | self.y_sets[j];
                    }
                    (Some(i), Some(j), set)
                }
                GapInY => {
                    i -= 1;
                    (Some(i), None, self.x_sets[i])
                }
                GapInX => {
                    j -= 1;
                    (None, Some(j), self.y_sets[j])
                }
            };
            sets.push(set);
            alignment.map_x.push(map_x);
            alignment.map_y.push(map_y);
        }
        sets.reverse();
        alignment.map_x.reverse();
        alignment.map_y.reverse();
        (sets, alignment, score)
    }
}

use std::fmt::Debug;

use dyn_clone::DynClone;

use crate::alphabets::ParsimonySet;
use crate::cost_matrix::CostMatrix;

/// Whether a run of gap columns on the same side pays for every column or only for the first.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum GapExtension {
    #[default]
    Charged,
    Free,
}

/// Costs of the profile-profile dynamic program.
pub trait ProfileScoring: Debug + DynClone {
    /// Cost of placing two columns in the same alignment column.
    fn match_cost(&self, x: &ParsimonySet, y: &ParsimonySet) -> f64;
    /// Cost of aligning a column against a gap.
    fn gap_cost(&self, set: &ParsimonySet) -> f64;
    fn gap_extension(&self) -> GapExtension;
}

dyn_clone::clone_trait_object!(ProfileScoring);

impl ProfileScoring for Box<dyn ProfileScoring> {
    fn match_cost(&self, x: &ParsimonySet, y: &ParsimonySet) -> f64 {
        (**self).match_cost(x, y)
    }

    fn gap_cost(&self, set: &ParsimonySet) -> f64 {
        (**self).gap_cost(set)
    }

    fn gap_extension(&self) -> GapExtension {
        (**self).gap_extension()
    }
}

/// Unit costs without a cost matrix, matrix costs otherwise. `gap_extension` overrides the
/// default of the chosen scoring.
pub fn profile_scoring(
    cost_matrix: Option<&CostMatrix>,
    gap_extension: Option<GapExtension>,
) -> Box<dyn ProfileScoring> {
    match (cost_matrix, gap_extension) {
        (Some(costs), Some(gap_extension)) => {
            Box::new(WeightedScoring::new(costs.clone()).with_gap_extension(gap_extension))
        }
        (Some(costs), None) => Box::new(WeightedScoring::new(costs.clone())),
        (None, gap_extension) => Box::new(UnitScoring::new(gap_extension.unwrap_or_default())),
    }
}

/// Set overlap is free, everything else costs 1.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct UnitScoring {
    gap_extension: GapExtension,
}

impl UnitScoring {
    pub fn new(gap_extension: GapExtension) -> UnitScoring {
        UnitScoring { gap_extension }
    }
}

impl ProfileScoring for UnitScoring {
    fn match_cost(&self, x: &ParsimonySet, y: &ParsimonySet) -> f64 {
        if x.is_disjoint(y) {
            1.0
        } else {
            0.0
        }
    }

    fn gap_cost(&self, _: &ParsimonySet) -> f64 {
        1.0
    }

    fn gap_extension(&self) -> GapExtension {
        self.gap_extension
    }
}

/// Costs taken from a substitution and indel matrix. Extending a gap is free unless configured
/// otherwise.
#[derive(Clone, Debug, PartialEq)]
pub struct WeightedScoring {
    costs: CostMatrix,
    gap_extension: GapExtension,
}

impl WeightedScoring {
    pub fn new(costs: CostMatrix) -> WeightedScoring {
        WeightedScoring {
            costs,
            gap_extension: GapExtension::Free,
        }
    }

    pub fn with_gap_extension(mut self, gap_extension: GapExtension) -> WeightedScoring {
        self.gap_extension = gap_extension;
        self
    }

    pub fn costs(&self) -> &CostMatrix {
        &self.costs
    }
}

impl ProfileScoring for WeightedScoring {
    /// Cheapest pair within the overlap of the sets, or across the sets if they are disjoint.
    fn match_cost(&self, x: &ParsimonySet, y: &ParsimonySet) -> f64 {
        let overlap = *x & *y;
        if overlap.is_empty() {
            self.costs.min_cost(x, y)
        } else {
            self.costs.min_cost(&overlap, &overlap)
        }
    }

    fn gap_cost(&self, set: &ParsimonySet) -> f64 {
        self.costs.gap_cost(set)
    }

    fn gap_extension(&self) -> GapExtension {
        self.gap_extension
    }
}

use super::{Axis, RatioCaps};
use crate::model::{Student, Team};

/// A rule deciding whether a team may take one more member.
pub trait Constraint {
    fn name(&self) -> &'static str;
    fn accepts(&self, team: &Team<'_>, candidate: &Student) -> bool;
}

/// Keeps every category count of the balanced axes within the group caps.
pub struct RatioLimit<'a> {
    axes: &'a [Axis],
    caps: RatioCaps,
}

impl<'a> RatioLimit<'a> {
    pub fn new(axes: &'a [Axis], caps: RatioCaps) -> RatioLimit<'a> {
        RatioLimit { axes, caps }
    }
}

impl Constraint for RatioLimit<'_> {
    fn name(&self) -> &'static str {
        "ratio caps"
    }

    fn accepts(&self, team: &Team<'_>, candidate: &Student) -> bool {
        self.axes
            .iter()
            .flat_map(|axis| axis.categories())
            .all(|category| {
                let count = team.count(category) + usize::from(category.matches(candidate));
                count <= self.caps.max_for(category)
            })
    }
}

/// At most `max_per_school` members from the same school.
pub struct SchoolConcentration {
    pub max_per_school: usize,
}

impl Constraint for SchoolConcentration {
    fn name(&self) -> &'static str {
        "school concentration"
    }

    fn accepts(&self, team: &Team<'_>, candidate: &Student) -> bool {
        candidate.school.is_empty() || team.school_count(&candidate.school) < self.max_per_school
    }
}

/// Team CGPA standard deviation stays under `max_std`.
pub struct CgpaSpread {
    pub max_std: f64,
}

impl Constraint for CgpaSpread {
    fn name(&self) -> &'static str {
        "CGPA spread"
    }

    fn accepts(&self, team: &Team<'_>, candidate: &Student) -> bool {
        team.is_empty() || team.cgpa_std_with(candidate) < self.max_std
    }
}

use crate::model::{Category, Student};

/// Maximum number of members of each category allowed in one team of a
/// tutorial group.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct RatioCaps {
    pub male_max: usize,
    pub female_max: usize,
    pub stem_max: usize,
    pub non_stem_max: usize,
}

impl RatioCaps {
    /// Caps for a group: `round(team_size * min(proportion + tolerance, 1))`,
    /// at least 1. An axis with no categorized student falls back to half
    /// of the team size.
    pub fn compute(students: &[&Student], team_size: usize, tolerance: f64) -> RatioCaps {
        let (male_max, female_max) =
            pair(students, Category::Male, Category::Female, team_size, tolerance);
        let (stem_max, non_stem_max) =
            pair(students, Category::Stem, Category::NonStem, team_size, tolerance);
        RatioCaps {
            male_max,
            female_max,
            stem_max,
            non_stem_max,
        }
    }

    pub fn max_for(&self, category: Category) -> usize {
        match category {
            Category::Male => self.male_max,
            Category::Female => self.female_max,
            Category::Stem => self.stem_max,
            Category::NonStem => self.non_stem_max,
        }
    }
}

fn pair(
    students: &[&Student],
    first: Category,
    second: Category,
    team_size: usize,
    tolerance: f64,
) -> (usize, usize) {
    let a = students.iter().filter(|s| first.matches(s)).count();
    let b = students.iter().filter(|s| second.matches(s)).count();
    let total = a + b;
    if total == 0 {
        let default_max = team_size.div_ceil(2).max(1);
        return (default_max, default_max);
    }
    (
        cap(a, total, team_size, tolerance),
        cap(b, total, team_size, tolerance),
    )
}

fn cap(count: usize, total: usize, team_size: usize, tolerance: f64) -> usize {
    proportional_cap(count, total, team_size, tolerance).max(1)
}

/// `round(team_size * min(count / total + tolerance, 1))`, rounding half up.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn proportional_cap(count: usize, total: usize, team_size: usize, tolerance: f64) -> usize {
    assert!(total > 0, "no member to take a proportion of");
    let ratio = (count as f64 / total as f64 + tolerance).min(1.0);
    (team_size as f64 * ratio + 0.5).floor() as usize
}

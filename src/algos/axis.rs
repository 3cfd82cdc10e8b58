use crate::model::{Category, Student};
use serde::Deserialize;
use std::cmp::Ordering;
use std::fmt;

/// A dimension along which teams are balanced.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, PartialEq)]
#[serde(rename_all = "kebab-case")]
pub enum Axis {
    Gender,
    SchoolCategory,
}

/// Students of one axis split into its smaller and larger category, each
/// sorted by descending CGPA.
#[derive(Debug)]
pub struct Split<'a> {
    pub minority_category: Category,
    pub minority: Vec<&'a Student>,
    pub majority_category: Category,
    pub majority: Vec<&'a Student>,
}

impl Axis {
    pub fn categories(self) -> [Category; 2] {
        match self {
            Axis::Gender => [Category::Male, Category::Female],
            Axis::SchoolCategory => [Category::Stem, Category::NonStem],
        }
    }

    /// Students without a category on this axis appear in neither side.
    pub fn split<'a>(self, students: &[&'a Student]) -> Split<'a> {
        let [first, second] = self.categories();
        let mut a = by_cgpa(students, first);
        let mut b = by_cgpa(students, second);
        let (minority_category, majority_category) = if a.len() <= b.len() {
            (first, second)
        } else {
            std::mem::swap(&mut a, &mut b);
            (second, first)
        };
        Split {
            minority_category,
            minority: a,
            majority_category,
            majority: b,
        }
    }
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Axis::Gender => f.write_str("gender"),
            Axis::SchoolCategory => f.write_str("school-category"),
        }
    }
}

fn by_cgpa<'a>(students: &[&'a Student], category: Category) -> Vec<&'a Student> {
    let mut selected = students
        .iter()
        .copied()
        .filter(|s| category.matches(s))
        .collect::<Vec<_>>();
    selected.sort_by(|a, b| b.cgpa.partial_cmp(&a.cgpa).unwrap_or(Ordering::Equal));
    selected
}

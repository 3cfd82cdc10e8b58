use super::{Category, Student};
use crate::stats;
use std::fmt;

/// Global team number as written to the output, starting at 1.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct TeamNumber(pub usize);

impl fmt::Display for TeamNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A team being built inside one tutorial group.
#[derive(Clone, Debug)]
pub struct Team<'a> {
    capacity: usize,
    members: Vec<&'a Student>,
}

impl<'a> Team<'a> {
    pub fn new(capacity: usize) -> Team<'a> {
        Team {
            capacity,
            members: Vec::with_capacity(capacity),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn remaining(&self) -> usize {
        self.capacity.saturating_sub(self.members.len())
    }

    pub fn has_room(&self) -> bool {
        self.remaining() > 0
    }

    pub fn members(&self) -> &[&'a Student] {
        &self.members
    }

    pub fn push(&mut self, student: &'a Student) {
        assert!(self.has_room(), "team is already full");
        self.members.push(student);
    }

    pub fn count(&self, category: Category) -> usize {
        self.members.iter().filter(|s| category.matches(s)).count()
    }

    pub fn school_count(&self, school: &str) -> usize {
        self.members.iter().filter(|s| s.school == school).count()
    }

    /// CGPA standard deviation the team would have with `candidate` added.
    pub fn cgpa_std_with(&self, candidate: &Student) -> f64 {
        let cgpas = self
            .members
            .iter()
            .map(|s| s.cgpa)
            .chain(std::iter::once(candidate.cgpa))
            .collect::<Vec<_>>();
        stats::std_dev(&cgpas)
    }
}

use crate::model::{Category, Student};
use std::collections::BTreeMap;

pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        None
    } else {
        Some(values.iter().sum::<f64>() / values.len() as f64)
    }
}

/// Population standard deviation, 0 for fewer than two values.
pub fn std_dev(values: &[f64]) -> f64 {
    match mean(values) {
        Some(m) if values.len() > 1 => {
            (values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / values.len() as f64).sqrt()
        }
        _ => 0.0,
    }
}

/// Aggregates of a set of students, used for constraint checks and reports.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TeamStats {
    pub size: usize,
    pub male: usize,
    pub female: usize,
    pub stem: usize,
    pub non_stem: usize,
    pub schools: BTreeMap<String, usize>,
    pub cgpa_mean: f64,
    pub cgpa_std: f64,
}

impl TeamStats {
    pub fn of<'a, I>(students: I) -> TeamStats
    where
        I: IntoIterator<Item = &'a Student>,
    {
        let mut stats = TeamStats::default();
        let mut cgpas = Vec::new();
        for s in students {
            stats.size += 1;
            stats.male += usize::from(Category::Male.matches(s));
            stats.female += usize::from(Category::Female.matches(s));
            stats.stem += usize::from(Category::Stem.matches(s));
            stats.non_stem += usize::from(Category::NonStem.matches(s));
            if !s.school.is_empty() {
                *stats.schools.entry(s.school.clone()).or_insert(0) += 1;
            }
            cgpas.push(s.cgpa);
        }
        stats.cgpa_mean = mean(&cgpas).unwrap_or(0.0);
        stats.cgpa_std = std_dev(&cgpas);
        stats
    }

    pub fn largest_school(&self) -> Option<(&str, usize)> {
        self.schools
            .iter()
            .max_by_key(|&(_, &n)| n)
            .map(|(school, &n)| (school.as_str(), n))
    }
}

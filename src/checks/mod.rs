//! Independent checks of an allocation file: data integrity plus gender,
//! school and CGPA balance of every team, summarized as a score.

pub use self::issue::{Area, Issue, Severity};
pub use self::score::Score;

mod issue;
mod score;

use self::issue::Issues;
use crate::algos::proportional_cap;
use crate::config::Strictness;
use crate::loaders::{AllocationRow, parse_cgpa};
use crate::model::Gender;
use crate::stats;
use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::fmt;

/// Team label as found in the file. Numeric labels sort numerically.
#[derive(Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum TeamLabel {
    Number(usize),
    Text(String),
}

impl TeamLabel {
    fn parse(s: &str) -> TeamLabel {
        s.parse().map_or_else(|_| TeamLabel::Text(s.to_owned()), TeamLabel::Number)
    }
}

impl fmt::Display for TeamLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TeamLabel::Number(n) => write!(f, "{n}"),
            TeamLabel::Text(s) => f.write_str(s),
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct GenderCaps {
    pub male_max: usize,
    pub female_max: usize,
}

#[derive(Clone, Debug)]
pub struct TeamReport {
    pub tutorial: String,
    pub team: TeamLabel,
    pub members: Vec<String>,
    pub male: usize,
    pub female: usize,
    pub largest_school: Option<(String, usize)>,
    pub cgpa_mean: Option<f64>,
    pub cgpa_std: Option<f64>,
    pub gender_ok: bool,
    pub school_ok: bool,
}

#[derive(Debug)]
pub struct Report {
    pub strictness: Strictness,
    pub team_size: usize,
    pub students: usize,
    pub tutorials: BTreeMap<String, GenderCaps>,
    pub teams: Vec<TeamReport>,
    pub issues: Vec<Issue>,
    pub score: Score,
}

impl Report {
    pub fn count(&self, severity: Severity) -> usize {
        self.issues.iter().filter(|i| i.severity == severity).count()
    }
}

pub struct Validator {
    team_size: usize,
    strictness: Strictness,
}

type Teams<'a> = BTreeMap<&'a str, BTreeMap<TeamLabel, Vec<&'a AllocationRow>>>;

impl Validator {
    pub fn new(team_size: usize, strictness: Strictness) -> Validator {
        Validator {
            team_size,
            strictness,
        }
    }

    pub fn validate(&self, rows: &[AllocationRow]) -> Report {
        let mut issues = Issues::default();
        check_records(rows, &mut issues);

        let mut by_tutorial: BTreeMap<&str, Vec<&AllocationRow>> = BTreeMap::new();
        let mut teams: Teams = BTreeMap::new();
        for row in rows {
            by_tutorial.entry(&row.tutorial).or_default().push(row);
            teams
                .entry(&row.tutorial)
                .or_default()
                .entry(TeamLabel::parse(&row.team))
                .or_default()
                .push(row);
        }
        let caps = by_tutorial
            .iter()
            .map(|(&tutorial, rows)| (tutorial.to_owned(), self.gender_caps(rows)))
            .collect::<BTreeMap<_, _>>();

        check_numbering(&teams, &mut issues);
        let reports = teams
            .iter()
            .flat_map(|(tutorial, teams)| {
                teams
                    .iter()
                    .map(move |(label, members)| (*tutorial, label, members))
            })
            .map(|(tutorial, label, members)| {
                self.check_team(tutorial, label, members, caps[tutorial], &mut issues)
            })
            .collect::<Vec<_>>();
        self.check_tutorials(&by_tutorial, &teams, &mut issues);

        let cgpa_stds = reports.iter().filter_map(|t| t.cgpa_std).collect::<Vec<_>>();
        let score = Score::compute(
            reports.len(),
            reports.iter().filter(|t| t.gender_ok).count(),
            reports.iter().filter(|t| t.school_ok).count(),
            &cgpa_stds,
            issues.count(Severity::Critical),
        );
        Report {
            strictness: self.strictness,
            team_size: self.team_size,
            students: rows.len(),
            tutorials: caps,
            teams: reports,
            issues: issues.into_sorted(),
            score,
        }
    }

    /// Gender caps of a tutorial group at the chosen strictness. A cap is
    /// only floored at 1 when both genders are present.
    pub fn gender_caps(&self, rows: &[&AllocationRow]) -> GenderCaps {
        let male = rows
            .iter()
            .filter(|r| Gender::parse(&r.gender) == Gender::Male)
            .count();
        let female = rows
            .iter()
            .filter(|r| Gender::parse(&r.gender) == Gender::Female)
            .count();
        let total = male + female;
        if total == 0 {
            let default_max = self.team_size.div_ceil(2);
            return GenderCaps {
                male_max: default_max,
                female_max: default_max,
            };
        }
        let tolerance = self.strictness.tolerance(self.team_size);
        let floor = usize::from(male > 0 && female > 0);
        GenderCaps {
            male_max: proportional_cap(male, total, self.team_size, tolerance).max(floor),
            female_max: proportional_cap(female, total, self.team_size, tolerance).max(floor),
        }
    }

    fn check_team(
        &self,
        tutorial: &str,
        label: &TeamLabel,
        members: &[&AllocationRow],
        caps: GenderCaps,
        issues: &mut Issues,
    ) -> TeamReport {
        let size = members.len();
        let at = format!("Tutorial {tutorial}, Team {label}");

        if size != self.team_size && self.strictness.is_severe() {
            if size.abs_diff(self.team_size) > 1 {
                issues.critical(
                    Area::TeamFormation,
                    format!(
                        "Team size {size} deviates significantly from expected {} ({at})",
                        self.team_size
                    ),
                );
            } else {
                issues.warning(
                    Area::TeamFormation,
                    format!("Team size {size} differs from expected {} ({at})", self.team_size),
                );
            }
        }

        let male = members
            .iter()
            .filter(|r| Gender::parse(&r.gender) == Gender::Male)
            .count();
        let female = members
            .iter()
            .filter(|r| Gender::parse(&r.gender) == Gender::Female)
            .count();
        let gender_ok = male <= caps.male_max && female <= caps.female_max;
        if !gender_ok {
            issues.warning(
                Area::GenderBalance,
                format!(
                    "{at}: M={male}, F={female} (max: {}M/{}F)",
                    caps.male_max, caps.female_max
                ),
            );
        }
        if self.strictness == Strictness::Nightmare && (male == 0 || female == 0) {
            issues.critical(
                Area::GenderBalance,
                format!("Single-gender team detected: {at} (M={male}, F={female})"),
            );
        }

        let mut schools: BTreeMap<&str, usize> = BTreeMap::new();
        for r in members.iter().filter(|r| !r.school.is_empty()) {
            *schools.entry(&r.school).or_insert(0) += 1;
        }
        let max_school = size / 2 + 1;
        let mut school_ok = true;
        for (school, &count) in &schools {
            if count > max_school {
                school_ok = false;
                issues.warning(
                    Area::SchoolDiversity,
                    format!("{at}: {school} has {count}/{size} members (max: {max_school})"),
                );
            }
        }
        if schools.len() == 1 && size > 1 {
            if let Some(school) = schools.keys().next() {
                issues.critical(
                    Area::SchoolDiversity,
                    format!("All members from same school: {at} ({school})"),
                );
            }
        }

        let cgpas = members
            .iter()
            .filter_map(|r| parse_cgpa(&r.cgpa).map(|c| (r, c)))
            .collect::<Vec<_>>();
        let values = cgpas.iter().map(|&(_, c)| c).collect::<Vec<_>>();
        let (cgpa_mean, cgpa_std) = if values.len() > 1 {
            let mean = stats::mean(&values).unwrap_or(0.0);
            let std = stats::std_dev(&values);
            let limit = if self.strictness == Strictness::Nightmare {
                0.6
            } else {
                0.7
            };
            if std >= limit {
                issues.warning(
                    Area::CgpaDistribution,
                    format!("High CGPA variance: {at} (std={std:.3})"),
                );
            }
            if self.strictness.is_severe() && std > 0.0 {
                for (r, c) in &cgpas {
                    if (c - mean).abs() > 2.0 * std {
                        issues.info(
                            Area::CgpaDistribution,
                            format!(
                                "Potential outlier: {} (CGPA {c:.2}) in {at} (mean={mean:.2}, std={std:.2})",
                                display_name(r)
                            ),
                        );
                    }
                }
            }
            (Some(mean), Some(std))
        } else {
            (stats::mean(&values), None)
        };

        TeamReport {
            tutorial: tutorial.to_owned(),
            team: label.clone(),
            members: members.iter().map(|r| display_name(r)).collect(),
            male,
            female,
            largest_school: schools
                .iter()
                .max_by_key(|&(_, &n)| n)
                .map(|(&s, &n)| (s.to_owned(), n)),
            cgpa_mean,
            cgpa_std,
            gender_ok,
            school_ok,
        }
    }

    fn check_tutorials(
        &self,
        by_tutorial: &BTreeMap<&str, Vec<&AllocationRow>>,
        teams: &Teams,
        issues: &mut Issues,
    ) {
        let sizes = by_tutorial.values().map(Vec::len).collect::<BTreeSet<_>>();
        if sizes.len() > 3 {
            let sample = by_tutorial
                .iter()
                .take(5)
                .map(|(t, rows)| format!("{t}: {}", rows.len()))
                .collect::<Vec<_>>();
            issues.warning(
                Area::DataQuality,
                format!("High variation in tutorial sizes: {}", sample.join(", ")),
            );
        }
        for (tutorial, rows) in by_tutorial {
            let expected = rows.len().div_ceil(self.team_size);
            let got = teams.get(tutorial).map_or(0, BTreeMap::len);
            if got != expected {
                issues.warning(
                    Area::TeamFormation,
                    format!("Tutorial {tutorial}: Expected {expected} teams, got {got}"),
                );
            }
        }
    }
}

fn display_name(row: &AllocationRow) -> String {
    if row.name.is_empty() {
        row.id.clone()
    } else {
        row.name.clone()
    }
}

fn check_records(rows: &[AllocationRow], issues: &mut Issues) {
    let mut ids = HashSet::new();
    let mut duplicates = BTreeSet::new();
    for row in rows {
        if !ids.insert(row.id.as_str()) && duplicates.insert(row.id.as_str()) {
            issues.critical(
                Area::DataIntegrity,
                format!("Duplicate Student ID: {} (line {})", row.id, row.line),
            );
        }
        match row.cgpa.parse::<f64>() {
            Ok(cgpa) if (0.0..=5.0).contains(&cgpa) => {}
            Ok(cgpa) => issues.critical(
                Area::DataIntegrity,
                format!("Invalid CGPA {cgpa} for student {} (line {})", row.id, row.line),
            ),
            Err(_) => issues.critical(
                Area::DataIntegrity,
                format!("Non-numeric CGPA for student {} (line {})", row.id, row.line),
            ),
        }
        if !Gender::parse(&row.gender).is_known() {
            issues.warning(
                Area::DataIntegrity,
                format!(
                    "Invalid gender '{}' for student {} (line {})",
                    row.gender, row.id, row.line
                ),
            );
        }
    }
}

fn check_numbering(teams: &Teams, issues: &mut Issues) {
    let mut numbers = BTreeSet::new();
    for (tutorial, teams) in teams {
        for label in teams.keys() {
            match label {
                TeamLabel::Number(n) => {
                    numbers.insert(*n);
                }
                TeamLabel::Text(t) => issues.warning(
                    Area::DataQuality,
                    format!("Non-numeric team number '{t}' in tutorial {tutorial}"),
                ),
            }
        }
    }
    if let Some(&max) = numbers.last() {
        let missing = (1..=max)
            .filter(|n| !numbers.contains(n))
            .take(10)
            .map(|n| n.to_string())
            .collect::<Vec<_>>();
        if !missing.is_empty() {
            issues.warning(
                Area::DataQuality,
                format!("Missing team numbers: {}", missing.join(", ")),
            );
        }
    }
}

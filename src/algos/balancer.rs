use super::constraints::{CgpaSpread, Constraint, RatioLimit, SchoolConcentration};
use super::{Axis, RatioCaps, team_sizes};
use crate::config::Config;
use crate::model::{Category, Roster, Student, StudentId, Team, TeamNumber};
use eyre::Result;
use rand::Rng;
use rand::seq::SliceRandom;
use std::collections::HashSet;
use tracing::{debug, info, trace};

/// Teams formed for one tutorial group, as lists of students.
#[derive(Debug, Default)]
pub struct GroupTeams {
    pub teams: Vec<Vec<StudentId>>,
    pub caps: Option<RatioCaps>,
    /// Placements that had to ignore the constraints.
    pub fallbacks: usize,
}

#[derive(Debug)]
pub struct TutorialOutcome {
    pub tutorial: String,
    pub students: usize,
    pub teams: Vec<TeamNumber>,
    pub caps: Option<RatioCaps>,
    pub fallbacks: usize,
}

/// Greedy team balancer: minority members of every axis are spread first,
/// then majority members go to the next team accepting them.
pub struct Balancer {
    team_size: usize,
    tolerance: f64,
    axes: Vec<Axis>,
    constraints: Vec<Box<dyn Constraint>>,
}

impl Balancer {
    pub fn new(team_size: usize, tolerance: f64, axes: Vec<Axis>) -> Balancer {
        Balancer {
            team_size,
            tolerance,
            axes,
            constraints: Vec::new(),
        }
    }

    pub fn from_config(config: &Config) -> Result<Balancer> {
        config.check()?;
        let mut balancer = Balancer::new(
            config.team_size,
            config.strictness.tolerance(config.team_size),
            config.axes.clone(),
        );
        if let Some(max_per_school) = config.max_per_school {
            balancer = balancer.with_constraint(SchoolConcentration { max_per_school });
        }
        if let Some(max_std) = config.max_cgpa_std {
            balancer = balancer.with_constraint(CgpaSpread { max_std });
        }
        Ok(balancer)
    }

    /// Add a constraint checked after the ratio caps, in insertion order.
    pub fn with_constraint(mut self, constraint: impl Constraint + 'static) -> Balancer {
        self.constraints.push(Box::new(constraint));
        self
    }

    /// Form teams for every tutorial group of the roster and record them,
    /// numbering teams consecutively across groups.
    pub fn assign<R: Rng + ?Sized>(&self, roster: &mut Roster, rng: &mut R) -> Vec<TutorialOutcome> {
        let mut next = 1;
        let mut outcomes = Vec::new();
        for tutorial in roster.tutorials().to_vec() {
            let group = self.form_teams(&roster.students_in(&tutorial), rng);
            let mut numbers = Vec::with_capacity(group.teams.len());
            for team in group.teams {
                let number = TeamNumber(next);
                next += 1;
                for student in team {
                    roster.assign_to(student, number);
                }
                numbers.push(number);
            }
            info!(
                tutorial = %tutorial.name,
                students = tutorial.students.len(),
                teams = numbers.len(),
                fallbacks = group.fallbacks,
                "tutorial group allocated"
            );
            outcomes.push(TutorialOutcome {
                tutorial: tutorial.name,
                students: tutorial.students.len(),
                teams: numbers,
                caps: group.caps,
                fallbacks: group.fallbacks,
            });
        }
        assert!(
            roster.unassigned_students().is_empty(),
            "every student must belong to a team"
        );
        outcomes
    }

    /// Form the teams of a single tutorial group.
    pub fn form_teams<R: Rng + ?Sized>(&self, students: &[&Student], rng: &mut R) -> GroupTeams {
        if students.is_empty() {
            return GroupTeams::default();
        }
        let caps = RatioCaps::compute(students, self.team_size, self.tolerance);
        debug!(?caps, tolerance = self.tolerance, "ratio caps");
        let ratio = RatioLimit::new(&self.axes, caps);
        let mut constraints: Vec<&dyn Constraint> = vec![&ratio];
        for constraint in &self.constraints {
            constraints.push(constraint.as_ref());
        }
        let mut placement = Placement::new(team_sizes(students.len(), self.team_size));

        // Smallest minority first so that it gets a clean round-robin, ties
        // in axis order.
        let mut splits = self
            .axes
            .iter()
            .map(|axis| axis.split(students))
            .collect::<Vec<_>>();
        splits.sort_by_key(|split| split.minority.len());
        for split in &splits {
            trace!(
                minority = %split.minority_category,
                count = split.minority.len(),
                "spreading minority"
            );
            placement.spread(&split.minority, split.minority_category);
        }
        for split in splits {
            let mut majority = split.majority;
            majority.shuffle(rng);
            trace!(
                majority = %split.majority_category,
                count = majority.len(),
                "placing majority"
            );
            for student in majority {
                placement.place(student, &constraints);
            }
        }
        let mut rest = students
            .iter()
            .copied()
            .filter(|s| !placement.is_placed(s))
            .collect::<Vec<_>>();
        if !rest.is_empty() {
            trace!(count = rest.len(), "placing students outside every axis");
            rest.shuffle(rng);
            for student in rest {
                placement.place(student, &constraints);
            }
        }

        GroupTeams {
            teams: placement
                .teams
                .iter()
                .map(|t| t.members().iter().map(|s| s.id).collect())
                .collect(),
            caps: Some(caps),
            fallbacks: placement.fallbacks,
        }
    }
}

struct Placement<'a> {
    teams: Vec<Team<'a>>,
    placed: HashSet<StudentId>,
    cursor: usize,
    fallbacks: usize,
}

impl<'a> Placement<'a> {
    fn new(sizes: Vec<usize>) -> Placement<'a> {
        Placement {
            teams: sizes.into_iter().map(Team::new).collect(),
            placed: HashSet::new(),
            cursor: 0,
            fallbacks: 0,
        }
    }

    fn is_placed(&self, student: &Student) -> bool {
        self.placed.contains(&student.id)
    }

    fn put(&mut self, idx: usize, student: &'a Student) {
        assert!(
            self.placed.insert(student.id),
            "student {student} placed twice"
        );
        self.teams[idx].push(student);
    }

    /// Teams in scanning order starting at `from`.
    fn rotation(&self, from: usize) -> impl Iterator<Item = usize> {
        let len = self.teams.len();
        (0..len).map(move |offset| (from + offset) % len)
    }

    /// Give each unplaced member to the team with the fewest members of
    /// `category`, rotating on ties. Alone, this is a round-robin.
    fn spread(&mut self, minority: &[&'a Student], category: Category) {
        let mut cursor = 0;
        for &student in minority {
            if self.is_placed(student) {
                continue;
            }
            let idx = self
                .rotation(cursor)
                .filter(|&i| self.teams[i].has_room())
                .min_by_key(|&i| self.teams[i].count(category))
                .expect("total capacity equals the group size");
            self.put(idx, student);
            cursor = (idx + 1) % self.teams.len();
        }
    }

    /// Put a student in the first team from the cursor accepting them, or in
    /// the team with the most room left when none does.
    fn place(&mut self, student: &'a Student, constraints: &[&dyn Constraint]) {
        if self.is_placed(student) {
            return;
        }
        let accepting = self.rotation(self.cursor).find(|&i| {
            let team = &self.teams[i];
            team.has_room() && constraints.iter().all(|c| c.accepts(team, student))
        });
        let idx = match accepting {
            Some(idx) => idx,
            None => {
                let idx = (0..self.teams.len())
                    .rev()
                    .max_by_key(|&i| self.teams[i].remaining())
                    .expect("a group has at least one team");
                let rejected_by = constraints
                    .iter()
                    .filter(|c| !c.accepts(&self.teams[idx], student))
                    .map(|c| c.name())
                    .collect::<Vec<_>>();
                debug!(
                    student = %student,
                    team = idx,
                    ?rejected_by,
                    "no team accepts student, placing in team with most room"
                );
                self.fallbacks += 1;
                idx
            }
        };
        self.put(idx, student);
        self.cursor = (idx + 1) % self.teams.len();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Gender, StemSchools};
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use std::collections::HashMap;

    const STEM: [&str; 3] = ["CCDS", "EEE", "MAE"];
    const SCHOOLS: [&str; 6] = ["CCDS", "EEE", "MAE", "NBS", "SSS", "ADM"];

    fn roster(tutorials: &[(&str, usize)], seed: u64) -> Vec<Student> {
        let stem = StemSchools::new(STEM);
        let mut rng = StdRng::seed_from_u64(seed);
        let mut students = Vec::new();
        for &(tutorial, n) in tutorials {
            for _ in 0..n {
                let i = students.len();
                let gender = if rng.random_bool(0.6) { "M" } else { "F" };
                let school = SCHOOLS[rng.random_range(0..SCHOOLS.len())];
                let cgpa = f64::from(rng.random_range(200..500_u32)) / 100.0;
                students.push(Student::new(
                    StudentId(i),
                    &format!("U{i:04}"),
                    tutorial,
                    &format!("Student {i}"),
                    school,
                    gender,
                    cgpa,
                    &stem,
                ));
            }
        }
        students
    }

    fn simple(id: usize, gender: &str, school: &str) -> Student {
        Student::new(
            StudentId(id),
            &id.to_string(),
            "T1",
            "x",
            school,
            gender,
            3.0,
            &StemSchools::new(STEM),
        )
    }

    #[test]
    fn test_twenty_students_make_four_teams() {
        let students = roster(&[("T1", 20)], 1);
        let refs = students.iter().collect::<Vec<_>>();
        let balancer = Balancer::new(5, 0.15, vec![Axis::Gender, Axis::SchoolCategory]);
        let group = balancer.form_teams(&refs, &mut StdRng::seed_from_u64(7));
        assert_eq!(group.teams.len(), 4);
        assert!(group.teams.iter().all(|t| t.len() == 5));
    }

    #[test]
    fn test_empty_group() {
        let balancer = Balancer::new(5, 0.15, vec![Axis::Gender]);
        let group = balancer.form_teams(&[], &mut StdRng::seed_from_u64(0));
        assert!(group.teams.is_empty());
        assert!(group.caps.is_none());
        assert_eq!(group.fallbacks, 0);
    }

    #[test]
    fn test_no_loss_no_duplicate_and_sizes() {
        for seed in 0..20 {
            let students = roster(&[("T1", 37), ("T2", 23), ("T3", 4)], seed);
            for team_size in 4..=10 {
                let mut allocated = Roster::new(students.clone());
                let balancer =
                    Balancer::new(team_size, 0.15, vec![Axis::Gender, Axis::SchoolCategory])
                        .with_constraint(SchoolConcentration { max_per_school: 2 });
                let outcomes = balancer.assign(&mut allocated, &mut StdRng::seed_from_u64(seed));
                for (tutorial, outcome) in allocated.tutorials().iter().zip(&outcomes) {
                    let sizes = outcome
                        .teams
                        .iter()
                        .map(|&t| allocated.members_of(t).len())
                        .collect::<Vec<_>>();
                    assert_eq!(sizes, team_sizes(tutorial.students.len(), team_size));
                    for &t in &outcome.teams {
                        for &s in allocated.members_of(t) {
                            assert_eq!(allocated.student(s).tutorial, tutorial.name);
                        }
                    }
                }
                let mut seen = HashSet::new();
                for &t in outcomes.iter().flat_map(|o| &o.teams) {
                    for &s in allocated.members_of(t) {
                        assert!(seen.insert(s));
                    }
                }
                assert_eq!(seen.len(), students.len());
            }
        }
    }

    #[test]
    fn test_minority_round_robin() {
        for seed in 0..20 {
            let students = roster(&[("T1", 43)], seed);
            let refs = students.iter().collect::<Vec<_>>();
            let females = students.iter().filter(|s| s.gender == Gender::Female).count();
            let males = students.len() - females;
            let minority = if males <= females { Gender::Male } else { Gender::Female };
            let n = males.min(females);
            let stem = students.iter().filter(|s| Category::Stem.matches(s)).count();
            if stem.min(students.len() - stem) < n {
                // The school minority is spread first
                continue;
            }
            let balancer = Balancer::new(5, 0.15, vec![Axis::Gender, Axis::SchoolCategory]);
            let group = balancer.form_teams(&refs, &mut StdRng::seed_from_u64(seed));
            let k = group.teams.len();
            for team in &group.teams {
                let count = team
                    .iter()
                    .filter(|&&s| students[s.0].gender == minority)
                    .count();
                assert!(count == n / k || count == n.div_ceil(k), "{count} for {n}/{k}");
            }
        }
    }

    #[test]
    fn test_smallest_minority_round_robin_on_school_axis() {
        let mut checked = 0;
        for seed in 0..200 {
            for team_size in 4..=10 {
                let mut rng = StdRng::seed_from_u64(seed);
                let n = rng.random_range(team_size..=45);
                let students = roster(&[("T1", n)], seed);
                let refs = students.iter().collect::<Vec<_>>();
                let count = |c: Category| students.iter().filter(|s| c.matches(s)).count();
                let gender_minority = count(Category::Male).min(count(Category::Female));
                let (stem, non_stem) = (count(Category::Stem), count(Category::NonStem));
                let school_minority = stem.min(non_stem);
                if school_minority >= gender_minority {
                    continue;
                }
                let minority = if stem <= non_stem {
                    Category::Stem
                } else {
                    Category::NonStem
                };
                checked += 1;
                let balancer = Balancer::new(team_size, 0.15, vec![Axis::Gender, Axis::SchoolCategory]);
                let group = balancer.form_teams(&refs, &mut rng);
                let k = group.teams.len();
                for team in &group.teams {
                    let c = team
                        .iter()
                        .filter(|&&s| minority.matches(&students[s.0]))
                        .count();
                    assert!(
                        c == school_minority / k || c == school_minority.div_ceil(k),
                        "seed {seed} size {team_size}: {c} for {school_minority}/{k}"
                    );
                }
            }
        }
        assert!(checked > 0);
    }

    #[test]
    fn test_deterministic_with_seed() {
        let students = roster(&[("T1", 30), ("T2", 28)], 3);
        let balancer = Balancer::new(6, 0.17, vec![Axis::Gender, Axis::SchoolCategory])
            .with_constraint(CgpaSpread { max_std: 0.8 });
        let run = || {
            let mut roster = Roster::new(students.clone());
            balancer.assign(&mut roster, &mut StdRng::seed_from_u64(99));
            roster
                .all_students()
                .into_iter()
                .map(|s| roster.team_for(s))
                .collect::<Vec<_>>()
        };
        assert_eq!(run(), run());
    }

    #[test]
    fn test_team_numbers_continue_across_tutorials() {
        let students = roster(&[("T1", 10), ("T2", 12)], 5);
        let mut roster = Roster::new(students);
        let balancer = Balancer::new(5, 0.15, vec![Axis::Gender]);
        let outcomes = balancer.assign(&mut roster, &mut StdRng::seed_from_u64(1));
        assert_eq!(outcomes[0].teams, vec![TeamNumber(1), TeamNumber(2)]);
        assert_eq!(
            outcomes[1].teams,
            vec![TeamNumber(3), TeamNumber(4), TeamNumber(5)]
        );
    }

    #[test]
    fn test_student_outside_every_axis_is_placed() {
        let students = vec![
            simple(0, "M", "CCDS"),
            simple(1, "F", "NBS"),
            simple(2, "M", "NBS"),
            simple(3, "F", "CCDS"),
            simple(4, "?", ""),
        ];
        let refs = students.iter().collect::<Vec<_>>();
        let balancer = Balancer::new(5, 0.15, vec![Axis::Gender, Axis::SchoolCategory]);
        let group = balancer.form_teams(&refs, &mut StdRng::seed_from_u64(0));
        assert_eq!(group.teams.len(), 1);
        assert_eq!(group.teams[0].len(), 5);
        assert!(group.teams[0].contains(&StudentId(4)));
    }

    #[test]
    fn test_blank_school_excluded_from_caps() {
        // A single student with no school still gets a slot
        let students = vec![simple(0, "F", "")];
        let refs = students.iter().collect::<Vec<_>>();
        let balancer = Balancer::new(4, 0.15, vec![Axis::Gender, Axis::SchoolCategory]);
        let group = balancer.form_teams(&refs, &mut StdRng::seed_from_u64(0));
        assert_eq!(group.teams, vec![vec![StudentId(0)]]);
        assert_eq!(group.caps.map(|c| c.stem_max), Some(2));
    }

    #[test]
    fn test_fallback_when_constraints_cannot_hold() {
        // Everyone from the same school with at most one per school per team
        let students = (0..8).map(|i| simple(i, "M", "NBS")).collect::<Vec<_>>();
        let refs = students.iter().collect::<Vec<_>>();
        let balancer = Balancer::new(4, 0.15, vec![Axis::Gender])
            .with_constraint(SchoolConcentration { max_per_school: 1 });
        let group = balancer.form_teams(&refs, &mut StdRng::seed_from_u64(0));
        assert!(group.fallbacks > 0);
        assert_eq!(
            group.teams.iter().map(Vec::len).collect::<Vec<_>>(),
            vec![4, 4]
        );
    }

    #[test]
    fn test_gender_balance_is_reached_when_possible() {
        let mut students = Vec::new();
        for i in 0..12 {
            students.push(simple(i, "M", "CCDS"));
        }
        for i in 12..20 {
            students.push(simple(i, "F", "NBS"));
        }
        let refs = students.iter().collect::<Vec<_>>();
        let balancer = Balancer::new(5, 0.15, vec![Axis::Gender]);
        let group = balancer.form_teams(&refs, &mut StdRng::seed_from_u64(11));
        assert_eq!(group.fallbacks, 0);
        let mut per_team = HashMap::new();
        for (t, team) in group.teams.iter().enumerate() {
            let males = team.iter().filter(|&&s| students[s.0].gender == Gender::Male).count();
            per_team.insert(t, males);
            assert!(males <= 4);
            assert!(team.len() - males <= 3);
        }
        assert_eq!(per_team.values().sum::<usize>(), 12);
    }
}

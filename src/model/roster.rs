use super::*;
use std::collections::{BTreeMap, HashMap};

#[derive(Clone, Debug)]
pub struct Tutorial {
    pub name: String,
    pub students: Vec<StudentId>,
}

/// All students of a run, their tutorial groups, and the teams they have
/// been given so far.
#[derive(Debug)]
pub struct Roster {
    pub students: Vec<Student>,
    tutorials: Vec<Tutorial>,
    assigned_to: Vec<Option<TeamNumber>>,
    assigned: BTreeMap<TeamNumber, Vec<StudentId>>,
}

impl Roster {
    pub fn new(mut students: Vec<Student>) -> Roster {
        // Work with normalized ids (starting at 0 and without gaps)
        for (idx, student) in students.iter_mut().enumerate() {
            student.id = StudentId(idx);
        }
        let mut index: HashMap<String, usize> = HashMap::new();
        let mut tutorials: Vec<Tutorial> = Vec::new();
        for student in &students {
            let idx = *index.entry(student.tutorial.clone()).or_insert_with(|| {
                tutorials.push(Tutorial {
                    name: student.tutorial.clone(),
                    students: Vec::new(),
                });
                tutorials.len() - 1
            });
            tutorials[idx].students.push(student.id);
        }
        let slen = students.len();
        Roster {
            students,
            tutorials,
            assigned_to: vec![None; slen],
            assigned: BTreeMap::new(),
        }
    }

    pub fn student(&self, StudentId(student): StudentId) -> &Student {
        &self.students[student]
    }

    pub fn all_students(&self) -> Vec<StudentId> {
        (0..self.students.len()).map(StudentId).collect()
    }

    /// Tutorial groups in order of first appearance.
    pub fn tutorials(&self) -> &[Tutorial] {
        &self.tutorials
    }

    pub fn students_in(&self, tutorial: &Tutorial) -> Vec<&Student> {
        tutorial.students.iter().map(|&s| self.student(s)).collect()
    }

    pub fn team_for(&self, StudentId(student): StudentId) -> Option<TeamNumber> {
        self.assigned_to[student]
    }

    pub fn assign_to(&mut self, student: StudentId, team: TeamNumber) {
        assert!(
            self.team_for(student).is_none(),
            "a team is already assigned to this student"
        );
        self.assigned_to[student.0] = Some(team);
        self.assigned.entry(team).or_default().push(student);
    }

    pub fn unassigned_students(&self) -> Vec<StudentId> {
        self.assigned_to
            .iter()
            .enumerate()
            .filter_map(|(id, assignment)| {
                if assignment.is_none() {
                    Some(StudentId(id))
                } else {
                    None
                }
            })
            .collect()
    }

    pub fn members_of(&self, team: TeamNumber) -> &[StudentId] {
        self.assigned.get(&team).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Students ordered by tutorial name then team number, keeping input
    /// order inside a team.
    pub fn output_order(&self) -> Vec<StudentId> {
        let mut order = self.all_students();
        order.sort_by(|&a, &b| {
            (&self.student(a).tutorial, self.team_for(a))
                .cmp(&(&self.student(b).tutorial, self.team_for(b)))
        });
        order
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn student(tutorial: &str, id: &str) -> Student {
        Student::new(
            StudentId(99),
            id,
            tutorial,
            id,
            "CCDS",
            "M",
            3.0,
            &StemSchools::default(),
        )
    }

    #[test]
    fn test_tutorials_in_first_appearance_order() {
        let roster = Roster::new(vec![
            student("T2", "a"),
            student("T1", "b"),
            student("T2", "c"),
        ]);
        let names = roster
            .tutorials()
            .iter()
            .map(|t| t.name.as_str())
            .collect::<Vec<_>>();
        assert_eq!(names, vec!["T2", "T1"]);
        assert_eq!(roster.tutorials()[0].students, vec![StudentId(0), StudentId(2)]);
        assert_eq!(roster.student(StudentId(2)).external_id, "c");
    }

    #[test]
    fn test_assign_and_output_order() {
        let mut roster = Roster::new(vec![
            student("T2", "a"),
            student("T1", "b"),
            student("T2", "c"),
            student("T1", "d"),
        ]);
        roster.assign_to(StudentId(0), TeamNumber(2));
        roster.assign_to(StudentId(2), TeamNumber(1));
        roster.assign_to(StudentId(1), TeamNumber(3));
        assert_eq!(roster.unassigned_students(), vec![StudentId(3)]);
        roster.assign_to(StudentId(3), TeamNumber(3));
        assert_eq!(roster.members_of(TeamNumber(3)), &[StudentId(1), StudentId(3)]);
        assert_eq!(
            roster.output_order(),
            vec![StudentId(1), StudentId(3), StudentId(2), StudentId(0)]
        );
    }

    #[test]
    #[should_panic(expected = "a team is already assigned to this student")]
    fn test_assign_twice() {
        let mut roster = Roster::new(vec![student("T1", "a")]);
        roster.assign_to(StudentId(0), TeamNumber(1));
        roster.assign_to(StudentId(0), TeamNumber(2));
    }
}

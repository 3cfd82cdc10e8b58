use csv::StringRecord;

/// Position of every known field in a CSV header. Header names vary between
/// files, so they are matched loosely.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct ColumnMap {
    pub tutorial: Option<usize>,
    pub id: Option<usize>,
    pub name: Option<usize>,
    pub school: Option<usize>,
    pub gender: Option<usize>,
    pub cgpa: Option<usize>,
    pub team: Option<usize>,
}

impl ColumnMap {
    pub fn detect(header: &StringRecord) -> ColumnMap {
        let names = header
            .iter()
            .map(|h| h.trim().to_lowercase())
            .collect::<Vec<_>>();
        ColumnMap {
            tutorial: position(&names, |n| n.contains("tutorial")),
            id: position(&names, |n| {
                (n.contains("student") && n.contains("id"))
                    || matches!(n, "id" | "student_id" | "studentid")
            }),
            name: position(&names, |n| matches!(n, "name" | "student name")),
            school: position(&names, |n| matches!(n, "school" | "school affiliation")),
            gender: position(&names, |n| matches!(n, "gender" | "sex")),
            cgpa: position(&names, |n| n == "gpa" || n.contains("cgpa")),
            team: names
                .iter()
                .rposition(|n| n.contains("team"))
                .or_else(|| names.len().checked_sub(1)),
        }
    }

    /// Names of the `required` fields that were not found.
    pub fn missing(&self, required: &[&'static str]) -> Vec<&'static str> {
        required
            .iter()
            .copied()
            .filter(|&field| self.get(field).is_none())
            .collect()
    }

    pub fn get(&self, field: &str) -> Option<usize> {
        match field {
            "tutorial" => self.tutorial,
            "id" => self.id,
            "name" => self.name,
            "school" => self.school,
            "gender" => self.gender,
            "cgpa" => self.cgpa,
            "team" => self.team,
            _ => None,
        }
    }

    /// Highest column index a row must reach to hold every `required` field.
    pub fn width(&self, required: &[&'static str]) -> usize {
        required
            .iter()
            .filter_map(|&field| self.get(field))
            .max()
            .map_or(0, |idx| idx + 1)
    }
}

fn position(names: &[String], pred: impl Fn(&str) -> bool) -> Option<usize> {
    names.iter().position(|n| pred(n.as_str()))
}

/// Trimmed field at `idx`, empty when absent.
pub fn field(record: &StringRecord, idx: Option<usize>) -> &str {
    idx.and_then(|idx| record.get(idx)).map_or("", str::trim)
}

use super::columns::{ColumnMap, field};
use crate::model::{StemSchools, Student, StudentId};
use eyre::{Result, WrapErr, ensure};
use std::collections::HashSet;
use std::fs::File;
use std::io;
use std::path::Path;
use tracing::{info, warn};

const REQUIRED: [&str; 4] = ["tutorial", "id", "gender", "cgpa"];
const ALL: [&str; 6] = ["tutorial", "id", "name", "school", "gender", "cgpa"];

pub fn parse_cgpa(s: &str) -> Option<f64> {
    s.trim()
        .parse::<f64>()
        .ok()
        .filter(|cgpa| (0.0..=5.0).contains(cgpa))
}

pub fn load_roster_file(path: &Path, stem: &StemSchools) -> Result<Vec<Student>> {
    let file = File::open(path).wrap_err_with(|| format!("cannot open roster {}", path.display()))?;
    load_roster(file, stem).wrap_err_with(|| format!("cannot load roster {}", path.display()))
}

/// Read students from CSV. Rows with a missing field or an invalid CGPA
/// are skipped with a warning.
pub fn load_roster<R: io::Read>(reader: R, stem: &StemSchools) -> Result<Vec<Student>> {
    let mut reader = csv::ReaderBuilder::new().flexible(true).from_reader(reader);
    let columns = ColumnMap::detect(reader.headers().wrap_err("cannot read header")?);
    let missing = columns.missing(&REQUIRED);
    ensure!(
        missing.is_empty(),
        "cannot detect required columns: {}",
        missing.join(", ")
    );
    let width = columns.width(&ALL);
    let mut students = Vec::new();
    let mut seen = HashSet::new();
    let mut skipped = 0;
    for record in reader.records() {
        let record = record.wrap_err("cannot read record")?;
        let line = record.position().map_or(0, |p| p.line());
        if record.iter().all(|f| f.trim().is_empty()) {
            continue;
        }
        if record.len() < width {
            warn!(line, "row has {} fields out of {}, skipped", record.len(), width);
            skipped += 1;
            continue;
        }
        let id = field(&record, columns.id);
        let tutorial = field(&record, columns.tutorial);
        if id.is_empty() || tutorial.is_empty() {
            warn!(line, student = id, tutorial, "missing student id or tutorial, skipped");
            skipped += 1;
            continue;
        }
        let raw_cgpa = field(&record, columns.cgpa);
        let Some(cgpa) = parse_cgpa(raw_cgpa) else {
            warn!(line, student = id, cgpa = raw_cgpa, "invalid CGPA, skipped");
            skipped += 1;
            continue;
        };
        if !seen.insert(id.to_owned()) {
            warn!(line, student = id, "duplicate student id");
        }
        students.push(Student::new(
            StudentId(students.len()),
            id,
            tutorial,
            field(&record, columns.name),
            field(&record, columns.school),
            field(&record, columns.gender),
            cgpa,
            stem,
        ));
    }
    ensure!(!students.is_empty(), "no valid student records");
    info!(students = students.len(), skipped, "roster loaded");
    Ok(students)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Category, Gender};

    fn stem() -> StemSchools {
        StemSchools::new(["CCDS", "EEE"])
    }

    #[test]
    fn test_load() {
        let data = "\
Tutorial Group,Student ID,School,Name,Gender,CGPA
G-1,5002,CCDS,Aaron Tan,Male,4.02
G-1,5003,NBS,Bella Lim,Female,3.55
G-2,5004,,Chen Wei,x,2.10
";
        let students = load_roster(data.as_bytes(), &stem()).unwrap();
        assert_eq!(students.len(), 3);
        assert_eq!(students[0].external_id, "5002");
        assert_eq!(students[0].tutorial, "G-1");
        assert_eq!(students[0].name, "Aaron Tan");
        assert_eq!(students[0].gender, Gender::Male);
        assert!(Category::Stem.matches(&students[0]));
        assert!(Category::NonStem.matches(&students[1]));
        assert!(students[2].category.is_none());
        assert_eq!(students[2].gender, Gender::Unknown);
        assert!((students[2].cgpa - 2.1).abs() < 1e-10);
        assert_eq!(students[2].id, StudentId(2));
    }

    #[test]
    fn test_bad_rows_are_skipped() {
        let data = "\
tutorial,id,name,school,gender,cgpa
T1,1,A,CCDS,M,abc
T1,2,B,CCDS,F,5.5
T1,3,C,CCDS
T1,4,D,EEE,F,3.0
,5,E,EEE,F,3.0
T1,,F,EEE,F,3.0
";
        let students = load_roster(data.as_bytes(), &stem()).unwrap();
        assert_eq!(students.len(), 1);
        assert_eq!(students[0].external_id, "4");
    }

    #[test]
    fn test_missing_column() {
        let data = "tutorial,id,name,school,gender\nT1,1,A,CCDS,M\n";
        let err = load_roster(data.as_bytes(), &stem()).unwrap_err();
        assert!(err.to_string().contains("cgpa"));
    }

    #[test]
    fn test_no_valid_records() {
        let data = "tutorial,id,gender,cgpa\nT1,1,M,nope\n";
        let err = load_roster(data.as_bytes(), &stem()).unwrap_err();
        assert_eq!(err.to_string(), "no valid student records");
    }

    #[test]
    fn test_parse_cgpa() {
        assert_eq!(parse_cgpa(" 3.5 "), Some(3.5));
        assert_eq!(parse_cgpa("0"), Some(0.0));
        assert_eq!(parse_cgpa("5"), Some(5.0));
        assert_eq!(parse_cgpa("-0.1"), None);
        assert_eq!(parse_cgpa(""), None);
        assert_eq!(parse_cgpa("NaN"), None);
    }
}

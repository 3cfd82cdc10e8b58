use super::columns::{ColumnMap, field};
use crate::model::Roster;
use eyre::{Result, WrapErr, ensure};
use serde::Serialize;
use std::fs::File;
use std::io;
use std::path::Path;
use tracing::{info, warn};

const REQUIRED: [&str; 6] = ["tutorial", "id", "school", "gender", "cgpa", "team"];

/// A row of an allocation file, kept as text so that the checks can report
/// malformed values instead of dropping them.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct AllocationRow {
    pub line: u64,
    pub tutorial: String,
    pub id: String,
    pub name: String,
    pub school: String,
    pub gender: String,
    pub cgpa: String,
    pub team: String,
}

#[derive(Serialize)]
struct OutputRow<'a> {
    tutorial: &'a str,
    id: &'a str,
    name: &'a str,
    school: &'a str,
    gender: &'a str,
    cgpa: f64,
    team: Option<usize>,
}

pub fn load_allocation_file(path: &Path) -> Result<Vec<AllocationRow>> {
    let file =
        File::open(path).wrap_err_with(|| format!("cannot open allocation {}", path.display()))?;
    load_allocation(file).wrap_err_with(|| format!("cannot load allocation {}", path.display()))
}

pub fn load_allocation<R: io::Read>(reader: R) -> Result<Vec<AllocationRow>> {
    let mut reader = csv::ReaderBuilder::new().flexible(true).from_reader(reader);
    let columns = ColumnMap::detect(reader.headers().wrap_err("cannot read header")?);
    let missing = columns.missing(&REQUIRED);
    ensure!(
        missing.is_empty(),
        "cannot detect required columns: {}",
        missing.join(", ")
    );
    let width = columns.width(&REQUIRED);
    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record.wrap_err("cannot read record")?;
        let line = record.position().map_or(0, |p| p.line());
        if record.iter().all(|f| f.trim().is_empty()) {
            continue;
        }
        if record.len() < width {
            warn!(line, "row has {} fields out of {}, skipped", record.len(), width);
            continue;
        }
        rows.push(AllocationRow {
            line,
            tutorial: field(&record, columns.tutorial).to_owned(),
            id: field(&record, columns.id).to_owned(),
            name: field(&record, columns.name).to_owned(),
            school: field(&record, columns.school).to_owned(),
            gender: field(&record, columns.gender).to_owned(),
            cgpa: field(&record, columns.cgpa).to_owned(),
            team: field(&record, columns.team).to_owned(),
        });
    }
    ensure!(!rows.is_empty(), "no valid student records");
    Ok(rows)
}

pub fn save_allocation_file(roster: &Roster, path: &Path) -> Result<()> {
    let file =
        File::create(path).wrap_err_with(|| format!("cannot create {}", path.display()))?;
    save_allocation(roster, file).wrap_err_with(|| format!("cannot save {}", path.display()))?;
    info!(path = %path.display(), "allocation saved");
    Ok(())
}

/// Write every student with their team, grouped by tutorial then team.
pub fn save_allocation<W: io::Write>(roster: &Roster, writer: W) -> Result<()> {
    let mut writer = csv::Writer::from_writer(writer);
    for s in roster.output_order() {
        let student = roster.student(s);
        writer.serialize(OutputRow {
            tutorial: &student.tutorial,
            id: &student.external_id,
            name: &student.name,
            school: &student.school,
            gender: &student.raw_gender,
            cgpa: student.cgpa,
            team: roster.team_for(s).map(|t| t.0),
        })?;
    }
    writer.flush()?;
    Ok(())
}

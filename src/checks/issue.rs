use std::fmt;

#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum Severity {
    Info,
    Warning,
    Critical,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Severity::Info => "INFO",
            Severity::Warning => "WARNING",
            Severity::Critical => "CRITICAL",
        };
        f.write_str(name)
    }
}

/// What an issue is about.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum Area {
    DataIntegrity,
    DataQuality,
    TeamFormation,
    GenderBalance,
    SchoolDiversity,
    CgpaDistribution,
}

impl fmt::Display for Area {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Area::DataIntegrity => "Data Integrity",
            Area::DataQuality => "Data Quality",
            Area::TeamFormation => "Team Formation",
            Area::GenderBalance => "Gender Balance",
            Area::SchoolDiversity => "School Diversity",
            Area::CgpaDistribution => "CGPA Distribution",
        };
        f.write_str(name)
    }
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Issue {
    pub severity: Severity,
    pub area: Area,
    pub message: String,
}

impl fmt::Display for Issue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.area, self.message)
    }
}

#[derive(Debug, Default)]
pub struct Issues(Vec<Issue>);

impl Issues {
    pub fn push(&mut self, severity: Severity, area: Area, message: impl Into<String>) {
        self.0.push(Issue {
            severity,
            area,
            message: message.into(),
        });
    }

    pub fn critical(&mut self, area: Area, message: impl Into<String>) {
        self.push(Severity::Critical, area, message);
    }

    pub fn warning(&mut self, area: Area, message: impl Into<String>) {
        self.push(Severity::Warning, area, message);
    }

    pub fn info(&mut self, area: Area, message: impl Into<String>) {
        self.push(Severity::Info, area, message);
    }

    pub fn count(&self, severity: Severity) -> usize {
        self.0.iter().filter(|i| i.severity == severity).count()
    }

    /// Most severe first, discovery order otherwise.
    pub fn into_sorted(mut self) -> Vec<Issue> {
        self.0.sort_by(|a, b| b.severity.cmp(&a.severity));
        self.0
    }
}

use std::fmt;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Grade {
    APlus,
    A,
    BPlus,
    B,
    CPlus,
    C,
    F,
}

impl Grade {
    pub fn of(score: f64) -> Grade {
        match score {
            s if s >= 95.0 => Grade::APlus,
            s if s >= 90.0 => Grade::A,
            s if s >= 85.0 => Grade::BPlus,
            s if s >= 80.0 => Grade::B,
            s if s >= 75.0 => Grade::CPlus,
            s if s >= 70.0 => Grade::C,
            _ => Grade::F,
        }
    }
}

impl fmt::Display for Grade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Grade::APlus => "A+ (Excellent)",
            Grade::A => "A  (Very Good)",
            Grade::BPlus => "B+ (Good)",
            Grade::B => "B  (Acceptable)",
            Grade::CPlus => "C+ (Needs Improvement)",
            Grade::C => "C  (Poor)",
            Grade::F => "F  (Failed)",
        };
        f.write_str(name)
    }
}

/// Standard deviation from which a team counts as unevenly spread.
pub const HIGH_VARIANCE: f64 = 0.5;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Score {
    pub gender_rate: f64,
    pub school_rate: f64,
    pub cgpa_score: f64,
    pub penalty: f64,
    pub overall: f64,
    pub grade: Grade,
}

impl Score {
    /// Weighted balance rates minus 2 points per critical issue, capped at
    /// 20 points.
    pub fn compute(
        teams: usize,
        gender_balanced: usize,
        school_balanced: usize,
        cgpa_stds: &[f64],
        criticals: usize,
    ) -> Score {
        let rate = |n: usize| {
            if teams == 0 {
                100.0
            } else {
                n as f64 * 100.0 / teams as f64
            }
        };
        let gender_rate = rate(gender_balanced);
        let school_rate = rate(school_balanced);
        let cgpa_score = if cgpa_stds.is_empty() {
            100.0
        } else {
            100.0 - rate(cgpa_stds.iter().filter(|&&s| s >= HIGH_VARIANCE).count())
        };
        let penalty = (criticals * 2).min(20) as f64;
        let overall = (gender_rate * 0.4 + school_rate * 0.4 + cgpa_score * 0.2 - penalty).max(0.0);
        Score {
            gender_rate,
            school_rate,
            cgpa_score,
            penalty,
            overall,
            grade: Grade::of(overall),
        }
    }
}

use crate::algos::Axis;
use crate::model::StemSchools;
use eyre::{Result, WrapErr, ensure};
use serde::Deserialize;
use std::fs;
use std::ops::RangeInclusive;
use std::path::{Path, PathBuf};

pub const TEAM_SIZES: RangeInclusive<usize> = 4..=10;

pub const DEFAULT_STEM_SCHOOLS: [&str; 9] = [
    "CCDS", "CCEB", "CoE", "EEE", "MAE", "SPMS", "SBS", "MSE", "CEE",
];

/// How far a team may drift from its tutorial group proportions.
#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Strictness {
    /// Tolerance grows with the team size, from 0.13 for teams of 4.
    #[default]
    Adaptive,
    Normal,
    Strict,
    Ultra,
    Nightmare,
}

impl Strictness {
    pub fn tolerance(self, team_size: usize) -> f64 {
        match self {
            Strictness::Adaptive => 0.15 + 0.02 * (team_size as f64 - 5.0),
            Strictness::Normal => 0.25,
            Strictness::Strict => 0.20,
            Strictness::Ultra => 0.15,
            Strictness::Nightmare => 0.10,
        }
    }

    /// Whether the extra checks of the two strictest tiers apply.
    pub fn is_severe(self) -> bool {
        matches!(self, Strictness::Ultra | Strictness::Nightmare)
    }
}

#[derive(Debug, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub team_size: usize,
    pub strictness: Strictness,
    pub seed: Option<u64>,
    pub axes: Vec<Axis>,
    pub max_per_school: Option<usize>,
    pub max_cgpa_std: Option<f64>,
    pub stem_schools: Vec<String>,
    pub output: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Config {
        Config {
            team_size: 5,
            strictness: Strictness::default(),
            seed: None,
            axes: vec![Axis::Gender, Axis::SchoolCategory],
            max_per_school: None,
            max_cgpa_std: None,
            stem_schools: DEFAULT_STEM_SCHOOLS.iter().map(|&s| s.to_owned()).collect(),
            output: None,
        }
    }
}

impl Config {
    pub fn load(file_name: &Path) -> Result<Config> {
        let content = fs::read_to_string(file_name)
            .wrap_err_with(|| format!("cannot load configuration file {}", file_name.display()))?;
        Config::parse(&content)
            .wrap_err_with(|| format!("cannot parse configuration file {}", file_name.display()))
    }

    /// Load `file_name` if given, else the default file if it exists, else
    /// the built-in defaults.
    pub fn load_or_default(file_name: Option<&Path>, default: &Path) -> Result<Config> {
        match file_name {
            Some(file_name) => Config::load(file_name),
            None if default.exists() => Config::load(default),
            None => Ok(Config::default()),
        }
    }

    pub fn parse(content: &str) -> Result<Config> {
        Ok(toml::from_str(content)?)
    }

    pub fn check(&self) -> Result<()> {
        ensure!(
            TEAM_SIZES.contains(&self.team_size),
            "team size must be between {} and {}, got {}",
            TEAM_SIZES.start(),
            TEAM_SIZES.end(),
            self.team_size
        );
        ensure!(!self.axes.is_empty(), "at least one balancing axis is required");
        if let Some(max_per_school) = self.max_per_school {
            ensure!(max_per_school > 0, "max_per_school must be positive");
        }
        if let Some(max_std) = self.max_cgpa_std {
            ensure!(max_std > 0.0, "max_cgpa_std must be positive");
        }
        Ok(())
    }

    pub fn stem_schools(&self) -> StemSchools {
        StemSchools::new(self.stem_schools.iter().cloned())
    }
}

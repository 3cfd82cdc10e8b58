use std::collections::HashSet;
use std::fmt;

#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct StudentId(pub usize);

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Gender {
    Male,
    Female,
    Unknown,
}

impl Gender {
    pub fn parse(s: &str) -> Gender {
        match s.trim().to_uppercase().as_str() {
            "M" | "MALE" => Gender::Male,
            "F" | "FEMALE" => Gender::Female,
            _ => Gender::Unknown,
        }
    }

    pub fn is_known(self) -> bool {
        self != Gender::Unknown
    }
}

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum SchoolCategory {
    Stem,
    NonStem,
}

/// Schools whose students count as STEM. A non-blank school outside this
/// set is non-STEM, a blank one has no category.
#[derive(Clone, Debug, Default)]
pub struct StemSchools(HashSet<String>);

impl StemSchools {
    pub fn new<I, S>(schools: I) -> StemSchools
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        StemSchools(
            schools
                .into_iter()
                .map(|s| s.into().trim().to_owned())
                .collect(),
        )
    }

    pub fn category_of(&self, school: &str) -> Option<SchoolCategory> {
        let school = school.trim();
        if school.is_empty() {
            None
        } else if self.0.contains(school) {
            Some(SchoolCategory::Stem)
        } else {
            Some(SchoolCategory::NonStem)
        }
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// One side of a balancing axis.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Category {
    Male,
    Female,
    Stem,
    NonStem,
}

impl Category {
    pub fn matches(self, student: &Student) -> bool {
        match self {
            Category::Male => student.gender == Gender::Male,
            Category::Female => student.gender == Gender::Female,
            Category::Stem => student.category == Some(SchoolCategory::Stem),
            Category::NonStem => student.category == Some(SchoolCategory::NonStem),
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Category::Male => "male",
            Category::Female => "female",
            Category::Stem => "STEM",
            Category::NonStem => "non-STEM",
        };
        f.write_str(name)
    }
}

#[derive(Clone, Debug)]
pub struct Student {
    pub id: StudentId,
    pub external_id: String,
    pub tutorial: String,
    pub name: String,
    pub school: String,
    pub gender: Gender,
    /// Gender as spelled in the input, written back unchanged.
    pub raw_gender: String,
    pub cgpa: f64,
    pub category: Option<SchoolCategory>,
}

impl Student {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        id: StudentId,
        external_id: &str,
        tutorial: &str,
        name: &str,
        school: &str,
        gender: &str,
        cgpa: f64,
        stem: &StemSchools,
    ) -> Student {
        Student {
            id,
            external_id: external_id.trim().to_owned(),
            tutorial: tutorial.trim().to_owned(),
            name: name.trim().to_owned(),
            school: school.trim().to_owned(),
            gender: Gender::parse(gender),
            raw_gender: gender.trim().to_owned(),
            cgpa,
            category: stem.category_of(school),
        }
    }
}

impl fmt::Display for Student {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.external_id)
    }
}

pub use self::roster::Roster;
pub use self::student::{Category, Gender, StemSchools, Student, StudentId};
pub use self::team::{Team, TeamNumber};

mod roster;
mod student;
mod team;

pub use self::allocation::{AllocationRow, load_allocation_file, save_allocation_file};
pub use self::roster::{load_roster_file, parse_cgpa};

mod allocation;
mod columns;
mod roster;

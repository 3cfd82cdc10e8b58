pub use self::axis::Axis;
pub use self::balancer::{Balancer, TutorialOutcome};
pub use self::ratio::{RatioCaps, proportional_cap};
pub use self::sizer::team_sizes;

mod axis;
mod balancer;
mod constraints;
mod ratio;
mod sizer;

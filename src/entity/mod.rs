//! plain records for the three tables;
//! related entities are reached through a `db::Repository`, never stored

pub mod climber;
pub mod expedition;
pub mod mountain;

pub use climber::Climber;
pub use expedition::Expedition;
pub use mountain::Mountain;

/// metres to feet
pub const FEET_PER_METRE : f64 = 3.28084;

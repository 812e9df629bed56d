pub mod backup;
pub mod rules;
pub mod stats;
pub mod trades;

pub use backup::*;
pub use rules::*;
pub use stats::*;
pub use trades::*;

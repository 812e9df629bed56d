pub mod rules;
pub mod stats;
pub mod trade;

pub use rules::*;
pub use stats::*;
pub use trade::*;

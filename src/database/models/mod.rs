pub mod delivery;
pub mod poll;
pub mod vote;

pub use delivery::*;
pub use poll::*;
pub use vote::*;

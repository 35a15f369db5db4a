pub mod market;
pub mod strategy;
pub mod timestamp;

pub use market::*;
pub use strategy::*;
pub use timestamp::*;

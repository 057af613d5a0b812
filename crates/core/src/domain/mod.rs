pub mod item;
pub mod options;
pub mod outfit;
pub mod weather;

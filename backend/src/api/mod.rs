pub mod harvest;

pub use harvest::*;

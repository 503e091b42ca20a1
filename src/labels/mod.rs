mod label;

pub use label::*;

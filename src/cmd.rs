pub mod clone;
pub mod completion;

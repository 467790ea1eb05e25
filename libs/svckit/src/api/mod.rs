pub mod problem;
pub mod validated;

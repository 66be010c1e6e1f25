pub mod problem;
pub mod progress;
pub mod user;

pub mod config;
pub mod doctor;
pub mod render;
pub mod runner;

pub use config::*;
pub use render::*;
pub use runner::*;

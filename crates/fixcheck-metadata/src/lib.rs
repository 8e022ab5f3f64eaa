pub mod cache;
pub mod dir;
pub mod traits;

pub use cache::*;
pub use dir::*;
pub use traits::*;

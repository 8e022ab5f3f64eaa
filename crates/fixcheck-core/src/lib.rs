pub mod error;
pub mod evaluate;
pub mod ids;
pub mod ledger;
pub mod memory;
pub mod model;
pub mod probe;
pub mod reduce;
pub mod scope;
pub mod topology;
pub mod types;

pub use error::*;
pub use evaluate::*;
pub use ids::*;
pub use ledger::*;
pub use model::*;
pub use probe::*;
pub use reduce::*;
pub use scope::*;
pub use topology::*;
pub use types::*;

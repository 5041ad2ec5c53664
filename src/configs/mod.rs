pub mod base;
pub mod hotstar;
pub mod logging;

pub use base::*;
pub use hotstar::*;
pub use logging::*;

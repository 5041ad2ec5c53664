pub mod api;
pub mod locator;
pub mod manager;
pub mod playlist;
pub mod reconciler;
pub mod session;
pub mod token;
pub mod transport;

pub use manager::HotstarSource;

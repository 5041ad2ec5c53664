pub mod hotstar;
pub mod manager;
pub mod plugin;

pub use manager::SourceManager;
pub use plugin::SourcePlugin;

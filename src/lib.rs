pub mod common;
pub mod configs;
pub mod manifest;
pub mod protocol;
pub mod sources;

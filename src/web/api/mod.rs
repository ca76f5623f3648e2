pub mod error;
pub mod interaction;
pub mod sky;
pub mod sources;

//! Migration services.

pub mod entity;
pub mod export;
pub mod import;

pub use entity::EntityService;
pub use export::ExportOrchestrator;
pub use import::ImportOrchestrator;

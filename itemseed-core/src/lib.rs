//! Core library for decoding game item templates into loot-list seed data.

pub mod classifier;
pub mod config;
pub mod database;
pub mod discovery;
pub mod error;
pub mod file_utils;
pub mod models;
pub mod slots;
pub mod spells;
pub mod stats;

pub use classifier::{Classification, Classifier, SkipReason};
pub use config::ImportConfig;
pub use database::{TemplateSnapshot, TemplateStore};
pub use discovery::{discover, ImportReport, Importer};
pub use error::{ItemSeedError, Result};

//! Course structure and learning-path sequencing.
//!
//! A course (or a snapshot published from it) owns a tree of folders and
//! leaf items plus a single linear learning path over its leaves. All
//! structural operations go through [`Engine`].

pub mod config;
pub mod db;
pub mod engine;
pub mod error;
pub mod models;
pub mod render;
pub mod store;

pub use config::EngineConfig;
pub use engine::{Container, Engine};
pub use error::{Error, Result};

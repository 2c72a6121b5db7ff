//! anno - Headless image annotation engine
//!
//! A text-annotation engine for images: rectangle drawing, validated
//! storage with undo history, weighted fuzzy search, viewport mathematics,
//! and JSON/CSV/training export. No rendering or I/O of its own; hosts
//! drive it with messages and read state back.

pub mod config;
pub mod engine;
pub mod format;
pub mod history;
pub mod interaction;
pub mod message;
pub mod model;
pub mod search;
pub mod stats;
pub mod store;
pub mod viewport;

pub use config::EngineConfig;
pub use engine::{Engine, ImageHandle};
pub use message::{EditMessage, PointerMessage, ViewMessage};
pub use model::{Annotation, AnnotationMeta, Point, Rect};
pub use store::{ReplaceReport, StoreError};

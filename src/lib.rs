pub mod animation;
pub mod client;
pub mod config;
pub mod controls;
pub mod error;
pub mod export;
pub mod geometry;
pub mod models;
pub mod prelude;
pub mod render;
pub mod scene;
pub mod stats;
pub mod surface;
pub mod view;
pub mod widget;

static UA: &str = "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/138.0.0.0 Safari/537.36";

pub use crate::models::*;

pub type Result<T> = std::result::Result<T, Error>;

pub use error::Error;

// Re-exporting some commonly used types
pub use async_trait::async_trait;
pub use ustr::{Ustr, ustr};

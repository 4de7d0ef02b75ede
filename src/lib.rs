pub mod director;
pub mod error;
pub mod focus;
pub mod gui;
pub mod math;
pub mod model;
pub mod session;

pub use error::{CatalogError, SceneError, SceneResult};

pub mod settings;

pub use settings::{Endpoints, Settings};

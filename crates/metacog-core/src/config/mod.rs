pub mod settings;

pub use settings::{MetacogConfig, HOME_ENV};

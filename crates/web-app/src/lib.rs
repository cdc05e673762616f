#![warn(clippy::pedantic)]
#![allow(clippy::missing_errors_doc)]

pub mod log;

mod active_workout;
mod service;
mod settings;

pub use active_workout::*;
pub use service::*;
pub use settings::*;

#![warn(clippy::pedantic)]
#![allow(clippy::missing_errors_doc)]

mod error;
mod exercise;
mod health;
mod name;
mod prefill;
mod service;
mod session;
mod set;
mod template;
mod user;
mod workout;

pub use error::*;
pub use exercise::*;
pub use health::*;
pub use name::*;
pub use prefill::*;
pub use service::*;
pub use session::*;
pub use set::*;
pub use template::*;
pub use user::*;
pub use workout::*;

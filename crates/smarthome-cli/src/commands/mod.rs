//! Command implementations for smarthome-cli

pub mod api;
pub mod demo;
pub mod status;
pub mod stream;

pub use api::api;
pub use demo::demo;
pub use status::status;
pub use stream::{interrupted, stream};

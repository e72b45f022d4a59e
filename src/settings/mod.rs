//! Settings Storage Shape
//!
//! Record layout for per-mode settings slots. Reading and writing the
//! storage device belongs to the caller.

pub mod store;

pub use store::{SettingsBank, StoreError, SETTINGS_VERSION};

//! Strong types shared across the crate

pub mod decimals;
pub mod spenders;
pub mod window;

pub use decimals::TokenDecimals;
pub use spenders::SpenderSet;
pub use window::{ScanWindow, WindowIterator};

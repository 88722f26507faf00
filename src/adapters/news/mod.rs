//! News Adapters
//!
//! Only the simulated feed exists today; a real news API would live
//! next to it and implement the same port.

pub mod simulated;

pub use simulated::SimulatedNews;

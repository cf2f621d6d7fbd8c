// Store Port (Interface)
// Defines what the domain needs from the storage backend

pub mod store;

pub use store::*;

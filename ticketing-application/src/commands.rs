// Application commands

pub mod compensation;
pub mod expiry_commands;
pub mod transaction_commands;

pub use compensation::*;
pub use expiry_commands::*;
pub use transaction_commands::*;

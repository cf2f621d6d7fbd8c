// Domain services

pub mod discount;
pub mod ledger;

pub use discount::*;
pub use ledger::*;

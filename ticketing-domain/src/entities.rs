// Domain entities

pub mod coupon;
pub mod event;
pub mod point_entry;
pub mod transaction;
pub mod voucher;

pub use coupon::*;
pub use event::*;
pub use point_entry::*;
pub use transaction::*;
pub use voucher::*;

// Application queries (read-only)

pub mod transaction_queries;

pub use transaction_queries::*;

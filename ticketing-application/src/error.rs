use thiserror::Error;

use ticketing_domain::services::{DiscountError, LedgerError};
use ticketing_domain::value_objects::TransactionStatus;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("not enough stock: {available} tickets available")]
    InsufficientStock { available: i64 },
    #[error("not enough points")]
    InsufficientPoints,
    #[error("coupon not available or expired")]
    CouponUnavailable,
    #[error("voucher not available or expired")]
    VoucherUnavailable,
    #[error("transaction not found")]
    TransactionNotFound,
    #[error("event not found")]
    EventNotFound,
    #[error("operation not allowed while transaction is {status}")]
    InvalidStatusForOperation { status: &'static str },
    #[error("unauthorized")]
    Unauthorized,
    #[error("bad request: {0}")]
    BadRequest(String),
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    /// A state-machine refusal, carrying the status that blocked the move.
    pub fn invalid_status(status: TransactionStatus) -> Self {
        AppError::InvalidStatusForOperation {
            status: status.as_str(),
        }
    }
}

impl From<DiscountError> for AppError {
    fn from(err: DiscountError) -> Self {
        match err {
            DiscountError::CouponUnavailable => AppError::CouponUnavailable,
            DiscountError::VoucherUnavailable => AppError::VoucherUnavailable,
        }
    }
}

impl From<LedgerError> for AppError {
    fn from(err: LedgerError) -> Self {
        match err {
            LedgerError::InsufficientPoints { .. } => AppError::InsufficientPoints,
        }
    }
}

// Discount calculation
//
// Pure: takes the base price, the customer's selection and the already
// fetched coupon/voucher records, and produces the three contributions.
// The contributions are computed independently and simply summed; clamping
// to the base price happens in `DiscountBreakdown`. Full stacking of
// points + coupon + voucher is permitted by design.

use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::entities::{Coupon, Voucher};
use crate::value_objects::{DiscountBreakdown, DiscountSelection};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum DiscountError {
    #[error("coupon not available or expired")]
    CouponUnavailable,
    #[error("voucher not available or expired")]
    VoucherUnavailable,
}

/// What the caller fetched for this purchase attempt.
#[derive(Debug, Clone, Copy)]
pub struct DiscountContext<'a> {
    pub base_price: i64,
    /// The user's current available point balance.
    pub available_points: i64,
    /// The user's usable coupon, if one exists at all.
    pub coupon: Option<&'a Coupon>,
    /// The event's voucher, if one exists at all.
    pub voucher: Option<&'a Voucher>,
}

pub fn compute_discount(
    selection: &DiscountSelection,
    ctx: &DiscountContext<'_>,
    now: DateTime<Utc>,
) -> Result<DiscountBreakdown, DiscountError> {
    let mut breakdown = DiscountBreakdown::default();

    let requested = selection.points_requested();
    if requested > 0 {
        // A balance can sit below zero while consumption entries outlive an
        // expired grant; it must never subtract from the other contributions.
        breakdown.points = requested
            .min(ctx.available_points.max(0))
            .min(ctx.base_price);
    }

    if selection.use_coupon {
        let coupon = ctx
            .coupon
            .filter(|coupon| coupon.is_valid(now))
            .ok_or(DiscountError::CouponUnavailable)?;
        breakdown.coupon = coupon.nominal;
    }

    if selection.use_voucher {
        let voucher = ctx
            .voucher
            .filter(|voucher| voucher.is_valid(now))
            .ok_or(DiscountError::VoucherUnavailable)?;
        breakdown.voucher = voucher.nominal;
    }

    Ok(breakdown)
}

// Discount selection and breakdown value objects

use serde::{Deserialize, Serialize};

/// What the customer asked to apply against the base price.
///
/// The points request carries its amount with it so "use points" can never
/// arrive without one. Coupon and voucher are all-or-nothing flags; the
/// matching records are looked up server-side.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DiscountSelection {
    pub points: Option<i64>,
    pub use_coupon: bool,
    pub use_voucher: bool,
}

impl DiscountSelection {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn points_requested(&self) -> i64 {
        self.points.unwrap_or(0)
    }

    /// A points request must name a positive amount.
    pub fn validate(&self) -> Result<(), String> {
        if let Some(amount) = self.points {
            if amount <= 0 {
                return Err(format!("points amount must be positive, got {amount}"));
            }
        }
        Ok(())
    }
}

/// The three contributions computed independently, before clamping.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiscountBreakdown {
    pub points: i64,
    pub coupon: i64,
    pub voucher: i64,
}

impl DiscountBreakdown {
    /// Total discount, clamped so it never exceeds the base price.
    pub fn total(&self, base_price: i64) -> i64 {
        (self.points + self.coupon + self.voucher).min(base_price)
    }

    pub fn final_price(&self, base_price: i64) -> i64 {
        base_price - self.total(base_price)
    }
}

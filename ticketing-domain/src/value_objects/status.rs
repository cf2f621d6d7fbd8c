// Transaction status value object
// Encodes the legal state machine: WaitingForPayment is the entry state,
// Done/Rejected/Expired/Canceled are terminal.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransactionStatus {
    WaitingForPayment,
    WaitingForAdminConfirmation,
    Done,
    Rejected,
    Expired,
    Canceled,
}

impl TransactionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionStatus::WaitingForPayment => "WaitingForPayment",
            TransactionStatus::WaitingForAdminConfirmation => "WaitingForAdminConfirmation",
            TransactionStatus::Done => "Done",
            TransactionStatus::Rejected => "Rejected",
            TransactionStatus::Expired => "Expired",
            TransactionStatus::Canceled => "Canceled",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            TransactionStatus::Done
                | TransactionStatus::Rejected
                | TransactionStatus::Expired
                | TransactionStatus::Canceled
        )
    }

    pub fn can_transition_to(&self, next: TransactionStatus) -> bool {
        use TransactionStatus::*;
        !self.is_terminal()
            && matches!(
                (self, next),
                (WaitingForPayment, WaitingForAdminConfirmation)
                    | (WaitingForPayment, Expired)
                    | (WaitingForAdminConfirmation, Done)
                    | (WaitingForAdminConfirmation, Rejected)
                    | (WaitingForAdminConfirmation, Canceled)
            )
    }
}

//! The frozen intent set
//!
//! Validator and executor match exhaustively on [`Intent`], so a new
//! variant fails to compile until every stage handles it.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Symbolic action requested by an utterance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Intent {
    CheckRate,
    UpdateRate,
    CheckStock,
    AddStockManual,
    TransferStock,
    CreateEstimate,
    CreateOrder,
    CheckOrderStatus,
    CheckLedger,
    AddPayment,
    ShareLedger,
    PaymentReminder,
    CalculateWeight,
    CalculatePrice,
    CancelAction,
    ConfirmAction,
}

impl Intent {
    /// All intents, in declaration order
    pub const ALL: [Intent; 16] = [
        Intent::CheckRate,
        Intent::UpdateRate,
        Intent::CheckStock,
        Intent::AddStockManual,
        Intent::TransferStock,
        Intent::CreateEstimate,
        Intent::CreateOrder,
        Intent::CheckOrderStatus,
        Intent::CheckLedger,
        Intent::AddPayment,
        Intent::ShareLedger,
        Intent::PaymentReminder,
        Intent::CalculateWeight,
        Intent::CalculatePrice,
        Intent::CancelAction,
        Intent::ConfirmAction,
    ];

    /// Wire name (`UPDATE_RATE`)
    pub fn as_str(&self) -> &'static str {
        match self {
            Intent::CheckRate => "CHECK_RATE",
            Intent::UpdateRate => "UPDATE_RATE",
            Intent::CheckStock => "CHECK_STOCK",
            Intent::AddStockManual => "ADD_STOCK_MANUAL",
            Intent::TransferStock => "TRANSFER_STOCK",
            Intent::CreateEstimate => "CREATE_ESTIMATE",
            Intent::CreateOrder => "CREATE_ORDER",
            Intent::CheckOrderStatus => "CHECK_ORDER_STATUS",
            Intent::CheckLedger => "CHECK_LEDGER",
            Intent::AddPayment => "ADD_PAYMENT",
            Intent::ShareLedger => "SHARE_LEDGER",
            Intent::PaymentReminder => "PAYMENT_REMINDER",
            Intent::CalculateWeight => "CALCULATE_WEIGHT",
            Intent::CalculatePrice => "CALCULATE_PRICE",
            Intent::CancelAction => "CANCEL_ACTION",
            Intent::ConfirmAction => "CONFIRM_ACTION",
        }
    }

    /// Intents that read or write the daily rate board
    pub fn is_rate_intent(&self) -> bool {
        matches!(self, Intent::CheckRate | Intent::UpdateRate)
    }

    /// Intents that read or move stock
    pub fn is_stock_intent(&self) -> bool {
        matches!(
            self,
            Intent::CheckStock | Intent::AddStockManual | Intent::TransferStock
        )
    }

    /// Intents resolved against the customer list by name
    pub fn resolves_customer(&self) -> bool {
        matches!(
            self,
            Intent::CheckLedger | Intent::AddPayment | Intent::ShareLedger | Intent::PaymentReminder
        )
    }

    /// Intents that need at least one product line to mean anything
    pub fn is_item_bearing(&self) -> bool {
        match self {
            Intent::CheckRate
            | Intent::UpdateRate
            | Intent::CheckStock
            | Intent::AddStockManual
            | Intent::TransferStock
            | Intent::CreateEstimate
            | Intent::CreateOrder
            | Intent::CalculateWeight
            | Intent::CalculatePrice => true,
            Intent::CheckOrderStatus
            | Intent::CheckLedger
            | Intent::AddPayment
            | Intent::ShareLedger
            | Intent::PaymentReminder
            | Intent::CancelAction
            | Intent::ConfirmAction => false,
        }
    }
}

impl fmt::Display for Intent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_intent_set_is_sixteen() {
        let unique: std::collections::HashSet<_> = Intent::ALL.iter().collect();
        assert_eq!(unique.len(), 16);
    }

    #[test]
    fn test_wire_name_matches_serde() {
        for intent in Intent::ALL {
            let json = serde_json::to_string(&intent).unwrap();
            assert_eq!(json, format!("\"{}\"", intent.as_str()));
        }
    }

    #[test]
    fn test_intent_classes() {
        assert!(Intent::UpdateRate.is_rate_intent());
        assert!(Intent::TransferStock.is_stock_intent());
        assert!(Intent::PaymentReminder.resolves_customer());
        assert!(!Intent::PaymentReminder.is_item_bearing());
        assert!(Intent::CheckRate.is_item_bearing());
    }
}

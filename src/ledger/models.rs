use chrono::{DateTime, Utc};
use std::fmt;

/// Journal entry direction. The sign of a balance change is carried here;
/// persisted amounts are always positive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TxType {
    Increase,
    Decrease,
}

impl TxType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TxType::Increase => "INCREASE",
            TxType::Decrease => "DECREASE",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "INCREASE" => Some(TxType::Increase),
            "DECREASE" => Some(TxType::Decrease),
            _ => None,
        }
    }
}

impl fmt::Display for TxType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Current balance row for one user. Never deleted; mutated only through the
/// ledger service operations.
#[derive(Debug, Clone)]
pub struct UserBalance {
    pub user_id: String,
    /// Minor units, invariant: `balance >= 0` at all committed states.
    pub balance: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Append-only journal row. `(tx_type, idempotency_key)` is unique.
#[derive(Debug, Clone)]
pub struct LedgerTransaction {
    pub id: i64,
    pub user_id: String,
    pub idempotency_key: String,
    pub tx_type: TxType,
    pub amount: i64,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tx_type_roundtrip() {
        for tx_type in [TxType::Increase, TxType::Decrease] {
            assert_eq!(TxType::from_str(tx_type.as_str()), Some(tx_type));
        }
    }

    #[test]
    fn test_tx_type_rejects_unknown() {
        assert_eq!(TxType::from_str("TRANSFER"), None);
        assert_eq!(TxType::from_str(""), None);
    }

    #[test]
    fn test_display() {
        assert_eq!(TxType::Increase.to_string(), "INCREASE");
        assert_eq!(TxType::Decrease.to_string(), "DECREASE");
    }
}

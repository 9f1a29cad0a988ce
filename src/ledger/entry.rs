use std::{fmt, str::FromStr};

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::amount::{non_negative, RawAmount, ValidationError};

/// Direction of a ledger entry. The amount itself is always a magnitude.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    Income,
    Expense,
}

impl EntryKind {
    /// Contribution of `amount` to the running balance.
    pub fn signed(self, amount: Decimal) -> Decimal {
        match self {
            EntryKind::Income => amount,
            EntryKind::Expense => -amount,
        }
    }
}

impl FromStr for EntryKind {
    type Err = ValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "income" => Ok(EntryKind::Income),
            "expense" => Ok(EntryKind::Expense),
            other => Err(ValidationError::new(format!(
                "kind must be `income` or `expense` (got `{other}`)"
            ))),
        }
    }
}

impl fmt::Display for EntryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            EntryKind::Income => "income",
            EntryKind::Expense => "expense",
        };
        f.write_str(label)
    }
}

/// One income or expense record.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LedgerEntry {
    pub id: Uuid,
    pub kind: EntryKind,
    pub description: String,
    pub amount: Decimal,
    pub timestamp: DateTime<Utc>,
}

impl LedgerEntry {
    /// Balance delta this entry contributes while it is part of the ledger.
    pub fn balance_effect(&self) -> Decimal {
        self.kind.signed(self.amount)
    }

    /// Spending delta this entry contributes while it is part of the ledger.
    pub fn spending_effect(&self) -> Decimal {
        match self.kind {
            EntryKind::Expense => self.amount,
            EntryKind::Income => Decimal::ZERO,
        }
    }
}

/// Caller-supplied fields for creating or editing an entry, before validation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EntryInput {
    pub kind: String,
    pub description: String,
    #[serde(default)]
    pub amount: Option<RawAmount>,
    #[serde(default)]
    pub timestamp: Option<DateTime<Utc>>,
}

impl EntryInput {
    pub fn new(kind: EntryKind, description: impl Into<String>, amount: impl Into<RawAmount>) -> Self {
        Self {
            kind: kind.to_string(),
            description: description.into(),
            amount: Some(amount.into()),
            timestamp: None,
        }
    }

    pub fn income(description: impl Into<String>, amount: impl Into<RawAmount>) -> Self {
        Self::new(EntryKind::Income, description, amount)
    }

    pub fn expense(description: impl Into<String>, amount: impl Into<RawAmount>) -> Self {
        Self::new(EntryKind::Expense, description, amount)
    }

    pub fn at(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = Some(timestamp);
        self
    }

    /// Validates every field and returns the normalized values.
    pub fn validate(&self) -> Result<ValidEntryFields, ValidationError> {
        let kind = self.kind.parse::<EntryKind>()?;
        let description = self.description.trim();
        if description.is_empty() {
            return Err(ValidationError::new("description must not be empty"));
        }
        let amount = non_negative(self.amount.as_ref(), "amount")?;
        Ok(ValidEntryFields {
            kind,
            description: description.to_string(),
            amount,
        })
    }

    /// Validates the input and builds a fresh entry with a new id.
    pub fn into_entry(self) -> Result<LedgerEntry, ValidationError> {
        let fields = self.validate()?;
        Ok(LedgerEntry {
            id: Uuid::new_v4(),
            kind: fields.kind,
            description: fields.description,
            amount: fields.amount,
            timestamp: self.timestamp.unwrap_or_else(Utc::now),
        })
    }
}

/// Mutable entry fields after validation.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidEntryFields {
    pub kind: EntryKind,
    pub description: String,
    pub amount: Decimal,
}

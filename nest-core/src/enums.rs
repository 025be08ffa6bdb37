//! Enum types for NestCRM custom fields

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ============================================================================
// FIELD CATEGORY
// ============================================================================

/// Category that a custom field set belongs to.
///
/// A tenant holds at most one field set per category. Deserialises through
/// [`FieldCategory::from_db_str`], so any casing is accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String")]
pub enum FieldCategory {
    Customer,
    Order,
    Payment,
    Interaction,
}

impl FieldCategory {
    /// Every category, in display order.
    pub const ALL: [FieldCategory; 4] = [
        FieldCategory::Customer,
        FieldCategory::Order,
        FieldCategory::Payment,
        FieldCategory::Interaction,
    ];

    /// Convert to the stored string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            FieldCategory::Customer => "Customer",
            FieldCategory::Order => "Order",
            FieldCategory::Payment => "Payment",
            FieldCategory::Interaction => "Interaction",
        }
    }

    /// Parse from the stored string representation (case-insensitive).
    pub fn from_db_str(s: &str) -> Result<Self, CategoryParseError> {
        match s.trim().to_lowercase().as_str() {
            "customer" => Ok(FieldCategory::Customer),
            "order" => Ok(FieldCategory::Order),
            "payment" => Ok(FieldCategory::Payment),
            "interaction" => Ok(FieldCategory::Interaction),
            _ => Err(CategoryParseError(s.to_string())),
        }
    }
}

impl fmt::Display for FieldCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for FieldCategory {
    type Err = CategoryParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_db_str(s)
    }
}

impl TryFrom<String> for FieldCategory {
    type Error = CategoryParseError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::from_db_str(&s)
    }
}

/// Error when parsing an invalid field category string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryParseError(pub String);

impl fmt::Display for CategoryParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Invalid field category: {} (expected Customer, Order, Payment or Interaction)",
            self.0
        )
    }
}

impl std::error::Error for CategoryParseError {}

// ============================================================================
// STORE TABLE
// ============================================================================

/// Logical table inside a tenant's storage namespace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StoreTable {
    /// Field sets and the tenant's field mapping.
    CustomFields,
    /// Raw customer records.
    Customers,
}

impl StoreTable {
    pub fn as_str(&self) -> &'static str {
        match self {
            StoreTable::CustomFields => "CustomFields",
            StoreTable::Customers => "Customers",
        }
    }
}

impl fmt::Display for StoreTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

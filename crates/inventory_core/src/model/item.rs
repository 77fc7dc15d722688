//! Item domain model.
//!
//! # Responsibility
//! - Define the single inventory record shape.
//! - Describe field conventions for opt-in write validation.
//!
//! # Invariants
//! - `id` is the primary key; at most one stored record per `id`.
//! - By convention `price` is finite and non-negative and `quantity` is
//!   non-negative. Storage does not enforce this unless asked to.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Primary key of an inventory record.
pub type ItemId = i64;

/// One inventory record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    /// Caller-assigned primary key.
    pub id: ItemId,
    /// Display label.
    pub name: String,
    /// Unit price in the application's currency.
    pub price: f64,
    /// Units in stock.
    pub quantity: i64,
}

/// Validation errors for item field conventions.
#[derive(Debug, Clone, PartialEq)]
pub enum ItemValidationError {
    BlankName,
    InvalidPrice(f64),
    NegativeQuantity(i64),
}

impl Display for ItemValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::BlankName => write!(f, "item name must not be blank"),
            Self::InvalidPrice(price) => {
                write!(f, "item price must be finite and non-negative, got {price}")
            }
            Self::NegativeQuantity(quantity) => {
                write!(f, "item quantity must be non-negative, got {quantity}")
            }
        }
    }
}

impl Error for ItemValidationError {}

impl Item {
    pub fn new(id: ItemId, name: impl Into<String>, price: f64, quantity: i64) -> Self {
        Self {
            id,
            name: name.into(),
            price,
            quantity,
        }
    }

    /// Checks field conventions.
    ///
    /// # Errors
    /// - `BlankName` when `name` is empty after trimming.
    /// - `InvalidPrice` when `price` is NaN, infinite, or negative.
    /// - `NegativeQuantity` when `quantity < 0`.
    pub fn validate(&self) -> Result<(), ItemValidationError> {
        validate_fields(&self.name, self.price, self.quantity)
    }
}

pub(crate) fn validate_fields(
    name: &str,
    price: f64,
    quantity: i64,
) -> Result<(), ItemValidationError> {
    if name.trim().is_empty() {
        return Err(ItemValidationError::BlankName);
    }
    if !price.is_finite() || price < 0.0 {
        return Err(ItemValidationError::InvalidPrice(price));
    }
    if quantity < 0 {
        return Err(ItemValidationError::NegativeQuantity(quantity));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{Item, ItemValidationError};

    #[test]
    fn valid_item_passes() {
        assert!(Item::new(1, "Apples", 10.0, 20).validate().is_ok());
        assert!(Item::new(2, "Free sample", 0.0, 0).validate().is_ok());
    }

    #[test]
    fn blank_name_is_rejected() {
        let err = Item::new(1, "   ", 1.0, 1).validate().unwrap_err();
        assert_eq!(err, ItemValidationError::BlankName);
    }

    #[test]
    fn negative_or_non_finite_price_is_rejected() {
        assert!(matches!(
            Item::new(1, "Apples", -0.5, 1).validate(),
            Err(ItemValidationError::InvalidPrice(_))
        ));
        assert!(matches!(
            Item::new(1, "Apples", f64::NAN, 1).validate(),
            Err(ItemValidationError::InvalidPrice(_))
        ));
        assert!(matches!(
            Item::new(1, "Apples", f64::INFINITY, 1).validate(),
            Err(ItemValidationError::InvalidPrice(_))
        ));
    }

    #[test]
    fn negative_quantity_is_rejected() {
        let err = Item::new(1, "Apples", 1.0, -3).validate().unwrap_err();
        assert_eq!(err, ItemValidationError::NegativeQuantity(-3));
    }

    #[test]
    fn serializes_with_plain_field_names() {
        let json = serde_json::to_value(Item::new(1, "Apples", 10.0, 20)).unwrap();
        assert_eq!(json["id"], 1);
        assert_eq!(json["name"], "Apples");
        assert_eq!(json["price"], 10.0);
        assert_eq!(json["quantity"], 20);
    }
}

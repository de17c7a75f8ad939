//! Prices
//!
//! Display arithmetic only. Prices arrive already computed, from catalog
//! records or from the backend; nothing here applies tax or discounts.

use rust_decimal::Decimal;
use rusty_money::{Money, iso};
use thiserror::Error;

use crate::items::LineItem;

/// Errors raised while formatting amounts.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormatError {
    /// The currency code is not a known ISO 4217 code.
    #[error("unknown currency code: {0}")]
    UnknownCurrency(String),
}

impl LineItem {
    /// Unit price multiplied by quantity, saturating at the `Decimal` bounds.
    pub fn line_total(&self) -> Decimal {
        self.unit_price
            .checked_mul(Decimal::from(self.quantity))
            .unwrap_or_else(|| saturated(self.unit_price))
    }
}

/// Calculates the total price of a list of items, saturating at the
/// `Decimal` bounds.
pub fn total_price(items: &[LineItem]) -> Decimal {
    items.iter().map(LineItem::line_total).fold(Decimal::ZERO, |total, line| {
        total.checked_add(line).unwrap_or_else(|| saturated(line))
    })
}

fn saturated(sign_of: Decimal) -> Decimal {
    if sign_of.is_sign_negative() {
        Decimal::MIN
    } else {
        Decimal::MAX
    }
}

/// Looks up an ISO currency by code, case-insensitively.
///
/// # Errors
///
/// - [`FormatError::UnknownCurrency`]: the code is not known.
pub fn currency(code: &str) -> Result<&'static iso::Currency, FormatError> {
    iso::find(&code.trim().to_ascii_uppercase())
        .ok_or_else(|| FormatError::UnknownCurrency(code.to_string()))
}

/// Renders an amount in the storefront currency, e.g. `₹1,200.00`.
pub fn format_amount(amount: Decimal, currency: &'static iso::Currency) -> String {
    Money::from_decimal(amount, currency).to_string()
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use crate::{
        ids::VariantId,
        items::{ItemDetails, ItemDisplay, NewLineItem, ProductLine, TemporaryId, VariantSelections},
    };

    use super::*;

    fn item(price: Decimal, quantity: u32) -> LineItem {
        NewLineItem {
            quantity,
            unit_price: price,
            display: ItemDisplay {
                name: "Compost".to_string(),
                image: None,
            },
            details: ItemDetails::Product(ProductLine {
                variant_id: VariantId::new(1),
                product_id: None,
                sku: None,
                selections: VariantSelections::default(),
            }),
        }
        .with_id(TemporaryId::new())
    }

    #[test]
    fn test_total_price() {
        let items = [item(Decimal::new(100, 0), 3), item(Decimal::new(250, 2), 2)];

        assert_eq!(total_price(&items), Decimal::new(305, 0));
    }

    #[test]
    fn test_total_price_empty() {
        assert_eq!(total_price(&[]), Decimal::ZERO);
    }

    #[test]
    fn oversized_totals_saturate() {
        let huge = item(Decimal::MAX, u32::MAX);

        assert_eq!(huge.line_total(), Decimal::MAX);
        assert_eq!(total_price(&[huge.clone(), huge]), Decimal::MAX);
        assert_eq!(
            total_price(&[item(Decimal::MIN, 2), item(Decimal::MIN, 1)]),
            Decimal::MIN
        );
    }

    #[test]
    fn currency_lookup_is_case_insensitive() -> TestResult {
        assert_eq!(currency("usd")?, iso::USD);
        assert!(matches!(
            currency("ZZZ"),
            Err(FormatError::UnknownCurrency(_))
        ));

        Ok(())
    }

    #[test]
    fn formats_with_currency_symbol() {
        assert_eq!(format_amount(Decimal::new(30_000, 2), iso::USD), "$300.00");
    }
}

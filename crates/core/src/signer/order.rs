use std::collections::BTreeSet;

use thiserror::Error;

use super::{Signer, SignerForm};
use crate::form::FieldValue;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SignerOrderError {
    #[error("At least one signer required")]
    Empty,

    #[error("Every signer needs a valid order number")]
    NoValidOrders,

    #[error("Signer order must be a contiguous sequence (e.g. 1, 2, 3); {missing} is missing")]
    NotContiguous { missing: i64 },
}

/// Checks that a signer list is non-empty and its orders leave no gaps.
///
/// Orders that are not integers are ignored. Duplicates are allowed.
pub struct SignerOrderValidator;

impl SignerOrderValidator {
    pub fn validate(signers: &[Signer]) -> Result<(), SignerOrderError> {
        Self::validate_orders(signers.iter().map(|s| Some(i64::from(s.order))))
    }

    /// Validate drafts as submitted, before their fields are parsed.
    pub fn validate_forms(forms: &[SignerForm]) -> Result<(), SignerOrderError> {
        Self::validate_orders(
            forms
                .iter()
                .map(|form| form.signatory_order.as_ref().and_then(coerce_order)),
        )
    }

    /// `None` entries stand for orders that were not numeric.
    ///
    /// Blank text and fractional values count as non-numeric here, so they
    /// are discarded rather than read as `0` or kept as fractions.
    pub fn validate_orders(
        orders: impl IntoIterator<Item = Option<i64>>,
    ) -> Result<(), SignerOrderError> {
        let mut seen = 0usize;
        let mut valid = BTreeSet::new();
        for order in orders {
            seen += 1;
            if let Some(order) = order {
                valid.insert(order);
            }
        }

        if seen == 0 {
            return Err(SignerOrderError::Empty);
        }

        let (Some(&min), Some(&max)) = (valid.first(), valid.last()) else {
            return Err(SignerOrderError::NoValidOrders);
        };

        // Distinct values fill [min, max] exactly when their count equals the span.
        if i128::from(max) - i128::from(min) + 1 == valid.len() as i128 {
            return Ok(());
        }

        let missing = (min..=max)
            .find(|n| !valid.contains(n))
            .unwrap_or(max);
        Err(SignerOrderError::NotContiguous { missing })
    }
}

fn coerce_order(value: &FieldValue) -> Option<i64> {
    match value {
        FieldValue::Number(n) => Some(*n),
        FieldValue::Text(s) => s.trim().parse().ok(),
        FieldValue::Choices(_) => None,
    }
}

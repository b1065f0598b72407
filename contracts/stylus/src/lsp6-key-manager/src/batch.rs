//! Value accounting and sequencing for batched key manager calls.

use alloc::vec::Vec;

use stylus_sdk::alloy_primitives::U256;

use crate::errors::{KeyManagerError, LSP6BatchInsufficientValueSent};

/// Sum of per-call values; `None` on overflow.
pub fn total_value(values: &[U256]) -> Option<U256> {
    values.iter().try_fold(U256::ZERO, |acc, v| acc.checked_add(*v))
}

/// The attached value must equal the sum of per-call values exactly.
pub fn check_value_conservation(values: &[U256], attached: U256) -> Result<(), KeyManagerError> {
    // no attachable amount can cover an overflowing sum
    let total = match total_value(values) {
        Some(total) => total,
        None => {
            return Err(KeyManagerError::BatchInsufficientValueSent(LSP6BatchInsufficientValueSent {
                totalValues: U256::MAX,
                msgValue: attached,
            }))
        }
    };
    if total != attached {
        return Err(KeyManagerError::batch_value_mismatch(total, attached));
    }
    Ok(())
}

/// Run `each` over the batch in order, stopping at the first failure.
///
/// Callers run inside a single transaction: a failure reverts the effects of
/// every element that already ran.
pub fn run_batch<T, F>(values: &[U256], attached: U256, mut each: F) -> Result<Vec<T>, KeyManagerError>
where
    F: FnMut(usize, U256) -> Result<T, KeyManagerError>,
{
    check_value_conservation(values, attached)?;
    let mut results = Vec::with_capacity(values.len());
    for (i, value) in values.iter().enumerate() {
        results.push(each(i, *value)?);
    }
    Ok(results)
}

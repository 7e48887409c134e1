//! Reference generation for orders, order items and payments.
//!
//! A reference is `prefix + unix millis + (counter mod 10000, 4 digits) + 8 hex
//! chars`. The counter is process-wide, so two callers in one process never
//! share a (timestamp, counter) pair until 10000 references are minted in the
//! same millisecond. Across processes, uniqueness is probabilistic and rests on
//! the 32 random bits.

use crate::errors::{Error, Result};
use rand::{RngCore, rngs::OsRng};
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::error;

/// Prefix for order references
pub const ORDER_PREFIX: &str = "ORDER";
/// Prefix for order item references
pub const ORDER_ITEM_PREFIX: &str = "OI";
/// Prefix for payment references
pub const PAYMENT_PREFIX: &str = "PAY";

static COUNTER: AtomicU64 = AtomicU64::new(0);

/// Generates a new reference starting with `prefix`.
///
/// # Errors
/// Returns a `Conflict` error if the OS random source fails. The caller's
/// transaction may be retried as a whole.
pub fn generate(prefix: &str) -> Result<String> {
    let timestamp = chrono::Utc::now().timestamp_millis();
    let counter = COUNTER.fetch_add(1, Ordering::Relaxed).wrapping_add(1);

    let mut random = [0u8; 4];
    OsRng.try_fill_bytes(&mut random).map_err(|e| {
        error!("random source failed while generating a reference: {e}");
        Error::conflict(format!("reference generation failed: {e}"))
    })?;

    Ok(format!(
        "{prefix}{timestamp}{:04}{}",
        counter % 10_000,
        hex::encode(random)
    ))
}

/// Moves the process-wide counter, so tests can force the 4-digit wrap.
#[cfg(test)]
pub(crate) fn set_counter(value: u64) {
    COUNTER.store(value, Ordering::Relaxed);
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_reference_layout() {
        let reference = generate(ORDER_PREFIX).unwrap();
        let rest = reference.strip_prefix("ORDER").unwrap();

        // 13 digit millis + 4 digit counter + 8 hex chars
        assert_eq!(rest.len(), 13 + 4 + 8);
        assert!(rest[..17].chars().all(|c| c.is_ascii_digit()));
        assert!(rest[17..].chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_prefixes_are_kept() {
        assert!(generate(ORDER_ITEM_PREFIX).unwrap().starts_with("OI"));
        assert!(generate(PAYMENT_PREFIX).unwrap().starts_with("PAY"));
    }

    #[test]
    fn test_no_duplicates_under_concurrency() {
        const THREADS: usize = 8;
        const PER_THREAD: usize = 1250;

        let batches: Vec<Vec<String>> = std::thread::scope(|scope| {
            let handles: Vec<_> = (0..THREADS)
                .map(|_| {
                    scope.spawn(|| {
                        (0..PER_THREAD)
                            .map(|_| generate(ORDER_PREFIX).unwrap())
                            .collect::<Vec<_>>()
                    })
                })
                .collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });

        let all: HashSet<String> = batches.into_iter().flatten().collect();
        assert_eq!(all.len(), THREADS * PER_THREAD);
    }
}

//! Granice indeksów derywacji

use crate::error::{AlfaBip85Error, Result};

/// Pierwszy niedozwolony indeks (2^31)
pub const INDEX_LIMIT: i64 = 1 << 31;

/// Domyślny próg ostrzeżenia (2^30)
pub const HIGH_INDEX_THRESHOLD: u32 = 1 << 30;

/// Odrzuca indeks spoza 0..2^31; dla indeksu >= 2^30 tylko loguje ostrzeżenie
pub fn validate_index_boundaries(index: i64, operation_name: &str) -> Result<()> {
    validate_index_boundaries_with(index, operation_name, HIGH_INDEX_THRESHOLD)
}

pub fn validate_index_boundaries_with(
    index: i64,
    operation_name: &str,
    warn_threshold: u32,
) -> Result<()> {
    if !(0..INDEX_LIMIT).contains(&index) {
        return Err(AlfaBip85Error::IndexOutOfRange {
            index,
            operation: operation_name.to_string(),
        });
    }

    if is_high_index(index, warn_threshold) {
        tracing::warn!(
            index,
            operation = operation_name,
            "security advisory: unusually high derivation index"
        );
    }

    Ok(())
}

pub fn is_high_index(index: i64, warn_threshold: u32) -> bool {
    index >= warn_threshold as i64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_indices() {
        assert!(validate_index_boundaries(0, "test").is_ok());
        assert!(validate_index_boundaries(INDEX_LIMIT - 1, "test").is_ok());
    }

    #[test]
    fn test_out_of_range() {
        let err = validate_index_boundaries(INDEX_LIMIT, "hex").unwrap_err();
        assert!(matches!(
            err,
            AlfaBip85Error::IndexOutOfRange { index, ref operation } if index == INDEX_LIMIT && operation == "hex"
        ));
        assert!(validate_index_boundaries(-1, "hex").is_err());
    }

    #[test]
    fn test_high_index_is_advisory_only() {
        assert!(is_high_index(1 << 30, HIGH_INDEX_THRESHOLD));
        assert!(!is_high_index((1 << 30) - 1, HIGH_INDEX_THRESHOLD));
        assert!(validate_index_boundaries(1 << 30, "mnemonic").is_ok());
    }
}

use crate::error::WriteSafetyViolation;

/// Guard run on the serialized output before a document is overwritten.
/// The output must still hold records and be at least half the original size.
pub fn check_write_safety(
    record_count: usize,
    original_len: usize,
    serialized_len: usize,
) -> Result<(), WriteSafetyViolation> {
    if record_count == 0 {
        return Err(WriteSafetyViolation::NoRecords);
    }
    if serialized_len.saturating_mul(2) < original_len {
        return Err(WriteSafetyViolation::OutputShrank {
            original: original_len,
            serialized: serialized_len,
        });
    }
    Ok(())
}

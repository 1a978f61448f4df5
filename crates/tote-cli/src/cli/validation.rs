/// Parse a `--batch-size` value.
///
/// # Errors
///
/// Returns an error message for non-numbers and zero.
pub fn parse_batch_size(s: &str) -> Result<usize, String> {
    let size: usize = s
        .parse()
        .map_err(|_| format!("Batch size must be a positive integer: '{}'", s))?;

    if size == 0 {
        return Err("Batch size must be at least 1".to_string());
    }

    Ok(size)
}

/// Parse an export condition name.
///
/// Conditions are matched literally against `exports` keys, so empty names
/// and names with whitespace can never match.
pub fn parse_condition(s: &str) -> Result<String, String> {
    if s.is_empty() {
        return Err("Condition name cannot be empty".to_string());
    }

    if s.chars().any(char::is_whitespace) {
        return Err(format!("Condition name cannot contain whitespace: '{}'", s));
    }

    Ok(s.to_string())
}

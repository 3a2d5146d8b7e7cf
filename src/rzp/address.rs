//! Free-text address normalization
//!
//! Registry addresses come back as `"Street 479/8, 181 00, Praha 8 - Troja"`;
//! the address search endpoint wants the street part and the municipality
//! without the postal code.

/// Normalize a free-text address into the registry's searchable form
///
/// Returns `None` when the text has no recognizable street-and-number part or
/// no municipality after it.
pub fn searchable_address(text: &str) -> Option<String> {
    let parts: Vec<String> = text
        .split(',')
        .map(|part| part.split_whitespace().collect::<Vec<_>>().join(" "))
        .filter(|part| !part.is_empty())
        .filter(|part| !is_postal_code(part))
        .collect();

    let street = parts.first()?;
    if parts.len() < 2 || !street.chars().any(|c| c.is_ascii_digit()) {
        return None;
    }

    Some(parts.join(", "))
}

/// `110 00` or `11000`
fn is_postal_code(part: &str) -> bool {
    let digits: String = part.chars().filter(|c| !c.is_whitespace()).collect();
    digits.len() == 5 && digits.chars().all(|c| c.is_ascii_digit())
}

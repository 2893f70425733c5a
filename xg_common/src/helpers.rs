/// Parse a boolean flag from a string value, or return the given default value otherwise.
pub fn parse_boolean_flag(value: Option<String>, default: bool) -> bool {
    let value = match value {
        Some(v) => v,
        None => return default,
    };
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => true,
        "0" | "false" | "no" | "off" => false,
        _ => default,
    }
}

/// Currency codes are stored upper-case. Returns `None` if the code is empty, too long, or contains anything other
/// than ASCII letters and digits.
pub fn normalize_currency_code(code: &str) -> Option<String> {
    let code = code.trim();
    let valid = !code.is_empty() && code.len() <= 10 && code.chars().all(|c| c.is_ascii_alphanumeric());
    valid.then(|| code.to_ascii_uppercase())
}

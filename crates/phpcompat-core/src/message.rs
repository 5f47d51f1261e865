//! Message templating and code normalisation
//!
//! Rules build messages as a template with `%s` placeholders plus an ordered
//! data array. Formatting happens once, when a finding is handed to the
//! reporter.

/// Substitute `%s` placeholders with `data` in order.
///
/// `%%` produces a literal `%`. Placeholders without a matching data entry
/// are left as-is so a template/data mismatch stays visible in the output.
pub fn format_message(template: &str, data: &[String]) -> String {
    let mut out = String::with_capacity(template.len() + data.iter().map(String::len).sum::<usize>());
    let mut values = data.iter();
    let mut chars = template.chars().peekable();

    while let Some(c) = chars.next() {
        if c != '%' {
            out.push(c);
            continue;
        }

        match chars.peek() {
            Some('s') => {
                chars.next();
                match values.next() {
                    Some(value) => out.push_str(value),
                    None => out.push_str("%s"),
                }
            }
            Some('%') => {
                chars.next();
                out.push('%');
            }
            _ => out.push('%'),
        }
    }

    out
}

/// Normalise a feature name into a code fragment.
///
/// Lowercases and replaces anything outside `[a-z0-9_]` with `_`, so
/// `Array_Fill_Keys` and `array_fill_keys` share a code.
pub fn error_code(base: &str) -> String {
    base.chars()
        .map(|c| {
            let c = c.to_ascii_lowercase();
            if c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect()
}

//! POSIX shell quoting for values substituted into generated scripts.

use std::borrow::Cow;

/// Returns `value` in a form that a POSIX shell reads back as one literal
/// word.
///
/// Values made only of characters with no special meaning to the shell are
/// returned unchanged; everything else is wrapped in single quotes, with
/// embedded single quotes written as `'\''`.
#[must_use]
pub fn shell_quote(value: &str) -> Cow<'_, str> {
    if !value.is_empty() && value.chars().all(is_shell_safe) {
        return Cow::Borrowed(value);
    }

    let mut quoted = String::with_capacity(value.len() + 2);
    quoted.push('\'');
    for ch in value.chars() {
        if ch == '\'' {
            quoted.push_str("'\\''");
        } else {
            quoted.push(ch);
        }
    }
    quoted.push('\'');
    Cow::Owned(quoted)
}

const fn is_shell_safe(ch: char) -> bool {
    ch.is_ascii_alphanumeric() || matches!(ch, '_' | '-' | '.' | '/' | ':' | '@' | '%' | '+' | ',' | '=')
}

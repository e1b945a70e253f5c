//! Positional placeholder substitution.
//!
//! Templates use `%1`..`%9` for arguments, `%n` for the plural count and `%%` for a literal
//! percent sign. Substitution is a single left-to-right pass, so `%%1` yields the literal
//! text `%1` and substituted argument text is never rescanned.

use std::collections::BTreeSet;
use std::fmt::{
    self,
    Write as _,
};

/// Argument list accepted by the formatter.
pub type Args<'a> = [&'a dyn fmt::Display];

/// Substitutes `%1`..`%9` with `args` and `%%` with `%`.
///
/// A placeholder without a matching argument is left untouched.
///
/// # Examples
/// ```
/// use ts_catalog::format::format;
///
/// assert_eq!(format("%1 of %2", &[&3, &5]), "3 of 5");
/// assert_eq!(format("100%%", &[]), "100%");
/// assert_eq!(format("%1", &[]), "%1");
/// ```
#[must_use]
pub fn format(template: &str, args: &Args<'_>) -> String {
    format_with_count(template, None, args)
}

/// Like [`format`], additionally replacing `%n` with `count` when one is given.
#[must_use]
pub fn format_with_count(template: &str, count: Option<i64>, args: &Args<'_>) -> String {
    let mut out = String::with_capacity(template.len());
    let mut chars = template.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch != '%' {
            out.push(ch);
            continue;
        }
        match chars.peek().copied() {
            Some('%') => {
                chars.next();
                out.push('%');
            }
            Some('n') if count.is_some() => {
                chars.next();
                if let Some(n) = count {
                    let _ = write!(out, "{n}");
                }
            }
            Some(digit @ '1'..='9') => match argument_index(digit).and_then(|i| args.get(i)) {
                Some(arg) => {
                    chars.next();
                    let _ = write!(out, "{arg}");
                }
                // the digit is copied on the next iteration
                None => out.push('%'),
            },
            _ => out.push('%'),
        }
    }
    out
}

/// Argument numbers (`1` for `%1`) referenced by `text`, ignoring `%%` escapes.
#[must_use]
pub fn placeholders(text: &str) -> BTreeSet<u8> {
    let mut found = BTreeSet::new();
    let mut chars = text.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch != '%' {
            continue;
        }
        match chars.peek().copied() {
            Some('%') => {
                chars.next();
            }
            Some(digit @ '1'..='9') => {
                chars.next();
                if let Some(number) = digit.to_digit(10).and_then(|d| u8::try_from(d).ok()) {
                    found.insert(number);
                }
            }
            _ => {}
        }
    }
    found
}

/// Zero-based argument index for a placeholder digit.
fn argument_index(digit: char) -> Option<usize> {
    let number = digit.to_digit(10)?;
    usize::try_from(number).ok()?.checked_sub(1)
}

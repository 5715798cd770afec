//! Option strings.
//!
//! ```text
//! options ::= option? ("," option?)*
//! option  ::= key (":" value)?
//! key     ::= (char except ',' and ':')*
//! value   ::= (char except ',')*
//! ```
//!
//! Each key is dispatched to the [`OptionParser`] registered for it. Parsers
//! are built with the constructors in this module and write their result
//! through an [`OptionTarget`], usually a `&mut` to the field being
//! configured.

use std::cell::Cell;

use crate::error::OptionsError;

/// Parses the value of one option key.
///
/// The argument is `None` when the option has no `:value` part. On failure
/// the parser returns a description of the valid values.
pub type OptionParser<'a> = Box<dyn FnMut(Option<&str>) -> Result<(), String> + 'a>;

/// Where a parser stores the value it parsed.
pub trait OptionTarget<T> {
    /// Store `value`.
    fn set(&mut self, value: T);
}

impl<T> OptionTarget<T> for &mut T {
    #[inline]
    fn set(&mut self, value: T) {
        **self = value;
    }
}

/// Lets several parsers (e.g. both halves of [`alt_option`]) share a target.
impl<T> OptionTarget<T> for &Cell<T> {
    #[inline]
    fn set(&mut self, value: T) {
        Cell::set(*self, value);
    }
}

/// Parse `text`, calling the parser registered for each key in order.
///
/// Empty options (`"a,,b"`) are skipped. Parsing stops at the first failure;
/// options before it keep their effect.
///
/// # Errors
///
/// [`OptionsError::UnknownKey`] for a key without a parser,
/// [`OptionsError::InvalidValue`] when a parser rejects its value.
pub fn parse_options(
    parsers: &mut [(&str, OptionParser<'_>)],
    text: &str,
) -> Result<(), OptionsError> {
    for option in text.split(',') {
        if option.is_empty() {
            continue;
        }
        let (key, value) = match option.split_once(':') {
            Some((key, value)) => (key, Some(value)),
            None => (option, None),
        };
        let Some(index) = parsers.iter().position(|(name, _)| *name == key) else {
            return Err(OptionsError::UnknownKey {
                key: key.into(),
                valid_keys: parsers
                    .iter()
                    .map(|(name, _)| *name)
                    .collect::<Vec<_>>()
                    .join(", "),
            });
        };
        (parsers[index].1)(value).map_err(|valid_values| OptionsError::InvalidValue {
            key: key.into(),
            value: value.unwrap_or_default().into(),
            valid_values,
        })?;
    }
    Ok(())
}

fn option_parser<'a>(
    parser: impl FnMut(Option<&str>) -> Result<(), String> + 'a,
) -> OptionParser<'a> {
    Box::new(parser)
}

/// Accept one of the listed texts and store the value paired with it.
///
/// An empty text also matches an option given without `:value`.
pub fn enum_option<'a, T, I>(mut out: impl OptionTarget<T> + 'a, possible_values: I) -> OptionParser<'a>
where
    T: Clone + 'a,
    I: IntoIterator<Item = (&'a str, T)>,
{
    let possible_values: Vec<(&'a str, T)> = possible_values.into_iter().collect();
    option_parser(move |value| {
        let value = value.unwrap_or_default();
        if let Some((_, matched)) = possible_values.iter().find(|(text, _)| *text == value) {
            out.set(matched.clone());
            return Ok(());
        }
        Err(possible_values
            .iter()
            .map(|(text, _)| if text.is_empty() { "(empty)" } else { *text })
            .collect::<Vec<_>>()
            .join(", "))
    })
}

/// Accept an integer in `min_value..=max_value`.
pub fn int_option<'a>(
    mut out: impl OptionTarget<i32> + 'a,
    min_value: i32,
    max_value: i32,
) -> OptionParser<'a> {
    option_parser(move |value| {
        match value.and_then(|value| value.parse::<i32>().ok()) {
            Some(parsed) if (min_value..=max_value).contains(&parsed) => {
                out.set(parsed);
                Ok(())
            }
            _ => Err(format!("integers {min_value}..{max_value}")),
        }
    })
}

/// Accept a byte count in `min_value..=max_value`, written as a real number
/// with an optional binary magnitude suffix: `B` (or `b`), `k`/`K`, `M`,
/// `G`, `T`, `P`, `E`. `"1.5k"` is 1536.
pub fn bytes_option<'a>(
    mut out: impl OptionTarget<u64> + 'a,
    min_value: u64,
    max_value: u64,
) -> OptionParser<'a> {
    option_parser(move |value| match value.and_then(parse_bytes) {
        Some(parsed) if (min_value..=max_value).contains(&parsed) => {
            out.set(parsed);
            Ok(())
        }
        _ => Err(format!(
            "integers expressed as reals with optional suffix [BkKMGTPE], {min_value}..{max_value}"
        )),
    })
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss, clippy::cast_precision_loss)]
fn parse_bytes(text: &str) -> Option<u64> {
    let (number, shift) = match text.as_bytes().last()? {
        b'B' | b'b' => (&text[..text.len() - 1], 0),
        b'k' | b'K' => (&text[..text.len() - 1], 10),
        b'M' => (&text[..text.len() - 1], 20),
        b'G' => (&text[..text.len() - 1], 30),
        b'T' => (&text[..text.len() - 1], 40),
        b'P' => (&text[..text.len() - 1], 50),
        b'E' => (&text[..text.len() - 1], 60),
        _ => (text, 0),
    };
    let number: f64 = number.parse().ok()?;
    let scaled = (number * (1u64 << shift) as f64).round();
    // Also rejects NaN.
    if !(0.0..u64::MAX as f64).contains(&scaled) {
        return None;
    }
    Some(scaled as u64)
}

/// Accept a real number in `min_value..=max_value`.
pub fn real_option<'a>(
    mut out: impl OptionTarget<f64> + 'a,
    min_value: f64,
    max_value: f64,
) -> OptionParser<'a> {
    option_parser(move |value| {
        match value.and_then(|value| value.parse::<f64>().ok()) {
            Some(parsed) if (min_value..=max_value).contains(&parsed) => {
                out.set(parsed);
                Ok(())
            }
            _ => Err(format!("reals {min_value}..{max_value}")),
        }
    })
}

/// Try `first`, then `second`; the first success wins.
pub fn alt_option<'a>(mut first: OptionParser<'a>, mut second: OptionParser<'a>) -> OptionParser<'a> {
    option_parser(move |value| match first(value) {
        Ok(()) => Ok(()),
        Err(first_valid) => {
            second(value).map_err(|second_valid| format!("{first_valid}, or {second_valid}"))
        }
    })
}

/// Register `key` so that its options are copied verbatim into `text`, to be
/// parsed later by a separate [`parse_options`] call.
pub fn copy_option<'a>(key: &'a str, text: &'a mut String) -> (&'a str, OptionParser<'a>) {
    let parser = option_parser(move |value| {
        if !text.is_empty() {
            text.push(',');
        }
        text.push_str(key);
        if let Some(value) = value {
            text.push(':');
            text.push_str(value);
        }
        Ok(())
    });
    (key, parser)
}

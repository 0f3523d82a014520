//! printf-style formatting of a single floating point value
//!
//! Supports one `%[flags][width][.precision][l|L](f|F|e|E|g|G)` conversion
//! plus literal text and `%%`. Flags: `-`, `+`, space, `0`.

use thiserror::Error;

/// Largest accepted field width or precision
pub const MAX_FIELD: usize = 64;

/// Errors in a format specification
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormatError {
    #[error("no floating point conversion")]
    MissingConversion,

    #[error("more than one conversion")]
    MultipleConversions,

    #[error("unsupported conversion '%{0}'")]
    UnsupportedConversion(char),

    #[error("incomplete conversion at end of specification")]
    Incomplete,

    #[error("field width exceeds {}", MAX_FIELD)]
    WidthTooLarge,

    #[error("precision exceeds {}", MAX_FIELD)]
    PrecisionTooLarge,
}

#[derive(Debug, Default, Clone, Copy)]
struct Conversion {
    left_align: bool,
    plus: bool,
    space: bool,
    zero_pad: bool,
    width: usize,
    precision: Option<usize>,
    kind: char,
}

enum Piece {
    Literal(String),
    Value(Conversion),
}

/// Format `value` according to a printf-style specification
pub fn format_value(spec: &str, value: f64) -> Result<String, FormatError> {
    let pieces = parse(spec)?;
    let mut out = String::new();
    for piece in pieces {
        match piece {
            Piece::Literal(text) => out.push_str(&text),
            Piece::Value(conv) => out.push_str(&render(&conv, value)),
        }
    }
    Ok(out)
}

fn parse(spec: &str) -> Result<Vec<Piece>, FormatError> {
    let mut pieces = Vec::new();
    let mut literal = String::new();
    let mut found = false;
    let mut chars = spec.chars().peekable();

    while let Some(c) = chars.next() {
        if c != '%' {
            literal.push(c);
            continue;
        }
        if chars.peek() == Some(&'%') {
            chars.next();
            literal.push('%');
            continue;
        }

        let mut conv = Conversion::default();
        while let Some(&flag) = chars.peek() {
            match flag {
                '-' => conv.left_align = true,
                '+' => conv.plus = true,
                ' ' => conv.space = true,
                '0' => conv.zero_pad = true,
                _ => break,
            }
            chars.next();
        }
        conv.width = take_number(&mut chars, FormatError::WidthTooLarge)?.unwrap_or(0);
        if chars.peek() == Some(&'.') {
            chars.next();
            conv.precision =
                Some(take_number(&mut chars, FormatError::PrecisionTooLarge)?.unwrap_or(0));
        }
        while matches!(chars.peek(), Some('l' | 'L')) {
            chars.next();
        }

        let kind = chars.next().ok_or(FormatError::Incomplete)?;
        if !matches!(kind, 'f' | 'F' | 'e' | 'E' | 'g' | 'G') {
            return Err(FormatError::UnsupportedConversion(kind));
        }
        if found {
            return Err(FormatError::MultipleConversions);
        }
        found = true;
        conv.kind = kind;

        if !literal.is_empty() {
            pieces.push(Piece::Literal(std::mem::take(&mut literal)));
        }
        pieces.push(Piece::Value(conv));
    }

    if !found {
        return Err(FormatError::MissingConversion);
    }
    if !literal.is_empty() {
        pieces.push(Piece::Literal(literal));
    }
    Ok(pieces)
}

/// Read a run of digits. `None` when there are none; `too_large` when the
/// number exceeds [`MAX_FIELD`].
fn take_number(
    chars: &mut std::iter::Peekable<std::str::Chars<'_>>,
    too_large: FormatError,
) -> Result<Option<usize>, FormatError> {
    let mut digits = String::new();
    while let Some(&c) = chars.peek() {
        if !c.is_ascii_digit() {
            break;
        }
        digits.push(c);
        chars.next();
    }
    if digits.is_empty() {
        return Ok(None);
    }
    match digits.parse::<usize>() {
        Ok(n) if n <= MAX_FIELD => Ok(Some(n)),
        _ => Err(too_large),
    }
}

fn render(conv: &Conversion, value: f64) -> String {
    let upper = conv.kind.is_ascii_uppercase();
    let precision = conv.precision.unwrap_or(6);
    let magnitude = value.abs();

    let body = if value.is_nan() {
        String::from("nan")
    } else if value.is_infinite() {
        String::from("inf")
    } else {
        match conv.kind.to_ascii_lowercase() {
            'e' => exponential(magnitude, precision),
            'g' => general(magnitude, precision),
            _ => format!("{magnitude:.precision$}"),
        }
    };
    let body = if upper { body.to_uppercase() } else { body };

    let sign = if value.is_sign_negative() && !value.is_nan() {
        "-"
    } else if conv.plus {
        "+"
    } else if conv.space {
        " "
    } else {
        ""
    };

    let len = sign.len() + body.len();
    if len >= conv.width {
        return format!("{sign}{body}");
    }
    let pad = conv.width - len;
    if conv.left_align {
        format!("{sign}{body}{}", " ".repeat(pad))
    } else if conv.zero_pad && value.is_finite() {
        format!("{sign}{}{body}", "0".repeat(pad))
    } else {
        format!("{}{sign}{body}", " ".repeat(pad))
    }
}

/// C-style exponent notation: at least two exponent digits with explicit sign
fn exponential(magnitude: f64, precision: usize) -> String {
    let raw = format!("{magnitude:.precision$e}");
    let (mantissa, exponent) = raw.split_once('e').unwrap_or((raw.as_str(), "0"));
    let exponent: i32 = exponent.parse().unwrap_or(0);
    let sign = if exponent < 0 { '-' } else { '+' };
    format!("{mantissa}e{sign}{:02}", exponent.abs())
}

fn general(magnitude: f64, precision: usize) -> String {
    let significant = precision.max(1);
    let exponent = if magnitude == 0.0 {
        0
    } else {
        let raw = format!("{:.*e}", significant - 1, magnitude);
        raw.split_once('e')
            .and_then(|(_, e)| e.parse::<i32>().ok())
            .unwrap_or(0)
    };

    if exponent < -4 || exponent >= significant as i32 {
        let formatted = exponential(magnitude, significant - 1);
        match formatted.split_once('e') {
            Some((mantissa, exp)) => format!("{}e{exp}", strip_zeros(mantissa)),
            None => formatted,
        }
    } else {
        let decimals = (significant as i32 - 1 - exponent).max(0) as usize;
        strip_zeros(&format!("{magnitude:.decimals$}")).to_string()
    }
}

fn strip_zeros(text: &str) -> &str {
    if text.contains('.') {
        text.trim_end_matches('0').trim_end_matches('.')
    } else {
        text
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed() {
        assert_eq!(format_value("%.2f", 10.0).unwrap(), "10.00");
        assert_eq!(format_value("%.0f", 2.5001).unwrap(), "3");
        assert_eq!(format_value("%f", 1.5).unwrap(), "1.500000");
        assert_eq!(format_value("%.3lf", 0.1234).unwrap(), "0.123");
    }

    #[test]
    fn test_flags_and_width() {
        assert_eq!(format_value("%8.2f", 3.14159).unwrap(), "    3.14");
        assert_eq!(format_value("%-8.2f|", 3.14159).unwrap(), "3.14    |");
        assert_eq!(format_value("%08.2f", -3.14159).unwrap(), "-0003.14");
        assert_eq!(format_value("%+.1f", 2.0).unwrap(), "+2.0");
    }

    #[test]
    fn test_literals() {
        assert_eq!(format_value("L = %.1f", 4.26).unwrap(), "L = 4.3");
        assert_eq!(format_value("%.0f%%", 50.0).unwrap(), "50%");
    }

    #[test]
    fn test_exponential() {
        assert_eq!(format_value("%.2e", 1234.5).unwrap(), "1.23e+03");
        assert_eq!(format_value("%.1E", 0.00012).unwrap(), "1.2E-04");
    }

    #[test]
    fn test_general() {
        assert_eq!(format_value("%g", 10.0).unwrap(), "10");
        assert_eq!(format_value("%g", 0.5).unwrap(), "0.5");
        assert_eq!(format_value("%g", 1234567.0).unwrap(), "1.23457e+06");
        assert_eq!(format_value("%.3g", 0.00001234).unwrap(), "1.23e-05");
    }

    #[test]
    fn test_errors() {
        assert_eq!(format_value("abc", 1.0), Err(FormatError::MissingConversion));
        assert_eq!(
            format_value("%f %f", 1.0),
            Err(FormatError::MultipleConversions)
        );
        assert_eq!(
            format_value("%d", 1.0),
            Err(FormatError::UnsupportedConversion('d'))
        );
        assert_eq!(format_value("%.2", 1.0), Err(FormatError::Incomplete));
    }

    #[test]
    fn test_field_limits() {
        assert_eq!(
            format_value("%99999999999999f", 1.25),
            Err(FormatError::WidthTooLarge)
        );
        assert_eq!(
            format_value("%.99999999999999999999f", 1.25),
            Err(FormatError::PrecisionTooLarge)
        );
        assert_eq!(format_value("%.65f", 1.0), Err(FormatError::PrecisionTooLarge));

        let widest = format_value("%64.64f", 1.0).unwrap();
        assert_eq!(widest.len(), 66);
    }
}

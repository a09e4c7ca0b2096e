//! Number presentation helpers shared by the counters.

/// U+2009 THIN SPACE, the default thousands separator.
pub const THIN_SPACE: char = '\u{2009}';
/// U+200A HAIR SPACE between a sign and the digits.
pub const HAIR_SPACE: char = '\u{200A}';
/// U+2212 MINUS SIGN.
pub const MINUS: char = '\u{2212}';

/// Separators and sign policy for [`format_number`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NumberFormat {
    pub group_separator: String,
    pub fraction_separator: String,
    pub show_plus_sign: bool,
}

impl Default for NumberFormat {
    fn default() -> Self {
        Self {
            group_separator: THIN_SPACE.to_string(),
            fraction_separator: ",".to_string(),
            show_plus_sign: false,
        }
    }
}

/// Group the integer part by thousands (only when it has more than four
/// digits) and prefix a typographic sign.
///
/// `format_number(-12345.5, &NumberFormat::default())` gives `"−\u{200A}12\u{2009}345,5"`.
/// Integers past 2^53 lose digits here; use [`format_integer`] for them.
pub fn format_number(number: f64, format: &NumberFormat) -> String {
    let digits = number.abs().to_string();
    let (integer, fraction) = match digits.split_once('.') {
        Some((integer, fraction)) => (integer, Some(fraction)),
        None => (digits.as_str(), None),
    };

    let sign = if number > 0.0 && format.show_plus_sign {
        Some('+')
    } else if number < 0.0 {
        Some(MINUS)
    } else {
        None
    };
    decorate(integer, fraction, sign, format)
}

/// [`format_number`] for integers, exact over the whole `i64` range.
pub fn format_integer(number: i64, format: &NumberFormat) -> String {
    let sign = if number > 0 && format.show_plus_sign {
        Some('+')
    } else if number < 0 {
        Some(MINUS)
    } else {
        None
    };
    decorate(&number.unsigned_abs().to_string(), None, sign, format)
}

/// Grouped digits of a magnitude, without any sign.
pub fn format_digits(magnitude: u64, format: &NumberFormat) -> String {
    decorate(&magnitude.to_string(), None, None, format)
}

fn decorate(integer: &str, fraction: Option<&str>, sign: Option<char>, format: &NumberFormat) -> String {
    let mut result = if integer.len() <= 4 {
        integer.to_string()
    } else {
        group_thousands(integer, &format.group_separator)
    };

    if let Some(fraction) = fraction {
        result.push_str(&format.fraction_separator);
        result.push_str(fraction);
    }

    match sign {
        Some(sign) => format!("{sign}{HAIR_SPACE}{result}"),
        None => result,
    }
}

fn group_thousands(integer: &str, separator: &str) -> String {
    let head = match integer.len() % 3 {
        0 => 3,
        n => n,
    };
    let mut out = String::with_capacity(integer.len() + separator.len() * (integer.len() / 3));
    out.push_str(&integer[..head]);

    let mut rest = &integer[head..];
    while !rest.is_empty() {
        out.push_str(separator);
        out.push_str(&rest[..3]);
        rest = &rest[3..];
    }
    out
}

/// Parse the integer an element's text shows, ignoring everything except
/// digits, `.` and `-`. The kept characters must still read as a number;
/// the fraction is truncated.
///
/// ```
/// use ui_behaviors::format::clean_to_number;
/// assert_eq!(clean_to_number("1 234 руб."), Some(1234));
/// assert_eq!(clean_to_number("n/a"), None);
/// ```
pub fn clean_to_number(source: &str) -> Option<i64> {
    let kept: String = source
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.' || *c == '-')
        .collect();

    if kept.is_empty() || kept.parse::<f64>().is_err() {
        return None;
    }

    let (negative, unsigned) = match kept.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, kept.as_str()),
    };
    let end = unsigned
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(unsigned.len());
    let value: i64 = unsigned[..end].parse().ok()?;

    Some(if negative { -value } else { value })
}

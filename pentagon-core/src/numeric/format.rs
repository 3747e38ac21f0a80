//! Decimal output formatting
//!
//! Backends render numbers in whatever decimal form they like
//! (`6.87e-1`, `0.687`, `-1.5E+3`). [`format_significant`] parses any of
//! those and re-renders with a fixed number of significant digits, rounding
//! half away from zero, with trailing zeros stripped.

/// Fixed-point rendering is used while the decimal exponent stays in this range
const MIN_FIXED_EXPONENT: i64 = -5;

/// Round a decimal string to `digits` significant digits.
///
/// Returns `None` if the input is not a finite decimal number or `digits` is 0.
pub fn format_significant(decimal: &str, digits: usize) -> Option<String> {
    if digits == 0 {
        return None;
    }
    let parsed = ParsedDecimal::parse(decimal.trim())?;
    if parsed.digits.is_empty() {
        return Some("0.0".to_string());
    }
    let (mantissa, point) = round_digits(&parsed.digits, parsed.point, digits);
    let body = render(&mantissa, point, digits);
    Some(if parsed.negative { format!("-{}", body) } else { body })
}

struct ParsedDecimal {
    negative: bool,
    /// Significant digits, no leading zeros
    digits: Vec<u8>,
    /// Value is `0.d1d2d3... × 10^point`
    point: i64,
}

impl ParsedDecimal {
    fn parse(s: &str) -> Option<Self> {
        let (negative, s) = match s.as_bytes().first()? {
            b'-' => (true, &s[1..]),
            b'+' => (false, &s[1..]),
            _ => (false, s),
        };
        let (mantissa, exponent) = match s.find(|c: char| c == 'e' || c == 'E') {
            Some(i) => (&s[..i], s[i + 1..].parse::<i64>().ok()?),
            None => (s, 0),
        };
        let (int_part, frac_part) = match mantissa.find('.') {
            Some(i) => (&mantissa[..i], &mantissa[i + 1..]),
            None => (mantissa, ""),
        };
        if int_part.is_empty() && frac_part.is_empty() {
            return None;
        }

        let mut digits = Vec::with_capacity(int_part.len() + frac_part.len());
        for c in int_part.bytes().chain(frac_part.bytes()) {
            if !c.is_ascii_digit() {
                return None;
            }
            digits.push(c - b'0');
        }
        let mut point = int_part.len() as i64 + exponent;
        let leading = digits.iter().take_while(|d| **d == 0).count();
        digits.drain(..leading);
        point -= leading as i64;
        while digits.last() == Some(&0) {
            digits.pop();
        }
        Some(Self {
            negative,
            digits,
            point,
        })
    }
}

fn round_digits(digits: &[u8], point: i64, keep: usize) -> (Vec<u8>, i64) {
    if digits.len() <= keep {
        return (digits.to_vec(), point);
    }
    let mut kept = digits[..keep].to_vec();
    let mut point = point;
    if digits[keep] >= 5 {
        let mut i = keep;
        loop {
            if i == 0 {
                kept.insert(0, 1);
                kept.truncate(keep);
                point += 1;
                break;
            }
            i -= 1;
            if kept[i] == 9 {
                kept[i] = 0;
            } else {
                kept[i] += 1;
                break;
            }
        }
    }
    while kept.last() == Some(&0) {
        kept.pop();
    }
    (kept, point)
}

fn render(mantissa: &[u8], point: i64, digits: usize) -> String {
    let text: String = mantissa.iter().map(|d| char::from(b'0' + d)).collect();
    let len = text.len() as i64;

    if point > MIN_FIXED_EXPONENT && point <= digits as i64 {
        if point <= 0 {
            format!("0.{}{}", "0".repeat((-point) as usize), text)
        } else if point >= len {
            format!("{}{}.0", text, "0".repeat((point - len) as usize))
        } else {
            let (int, frac) = text.split_at(point as usize);
            format!("{}.{}", int, frac)
        }
    } else {
        let (first, rest) = text.split_at(1);
        let rest = if rest.is_empty() { "0" } else { rest };
        format!("{}.{}e{}", first, rest, point - 1)
    }
}

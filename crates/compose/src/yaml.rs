//! YAML 스칼라 표기 헬퍼
//!
//! 합성기는 YAML 라이브러리 없이 텍스트를 직접 만들기 때문에,
//! 값이 다른 타입으로 해석되거나 구조를 깨뜨릴 수 있을 때만 따옴표로 감쌉니다.

use std::borrow::Cow;

/// plain 스칼라의 첫 글자로 올 수 없는 문자
const INDICATORS: &[char] = &[
    '-', '?', ':', ',', '[', ']', '{', '}', '#', '&', '*', '!', '|', '>', '\'', '"', '%', '@',
    '`',
];

/// bool/null로 해석될 수 있는 단어 (소문자 비교)
const RESERVED: &[&str] = &[
    "true", "false", "yes", "no", "y", "n", "on", "off", "null", "~",
];

/// 필요할 때만 큰따옴표로 감싼 스칼라
pub fn scalar(value: &str) -> Cow<'_, str> {
    if needs_quotes(value) {
        Cow::Owned(double_quoted(value))
    } else {
        Cow::Borrowed(value)
    }
}

/// 항상 큰따옴표로 감싼 스칼라 (`"`, `\`, 제어 문자 이스케이프)
pub fn double_quoted(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('"');
    for c in value.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            '\r' => out.push_str("\\r"),
            c if c.is_control() => out.push_str(&format!("\\u{:04X}", c as u32)),
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

/// 작은따옴표 스칼라 (`'`는 `''`로)
pub fn single_quoted(value: &str) -> String {
    format!("'{}'", value.replace('\'', "''"))
}

fn needs_quotes(value: &str) -> bool {
    let Some(first) = value.chars().next() else {
        return true;
    };

    if first.is_whitespace() || value.ends_with(char::is_whitespace) {
        return true;
    }
    if INDICATORS.contains(&first) {
        return true;
    }
    if value.contains(": ") || value.contains(" #") || value.ends_with(':') {
        return true;
    }
    if value.contains("${") {
        return true;
    }
    if value.chars().any(char::is_control) {
        return true;
    }

    let lower = value.to_ascii_lowercase();
    RESERVED.contains(&lower.as_str()) || reads_as_special_number(&lower)
}

/// 평범한 10진수가 아닌 숫자 표기 (`.inf`, `.nan`, `0x1F`, `0o17`, `0b11`, `1e3`)
///
/// 그대로 두면 다른 값으로 읽히므로 따옴표 대상입니다. `80`, `0.5` 같은 10진수는
/// 숫자로 읽혀도 표기가 같으므로 그대로 둡니다.
fn reads_as_special_number(lower: &str) -> bool {
    let unsigned = lower.strip_prefix(['+', '-']).unwrap_or(lower);
    if matches!(unsigned, ".inf" | ".nan") {
        return true;
    }

    let radix_digits = [("0x", 16), ("0o", 8), ("0b", 2)]
        .into_iter()
        .find_map(|(prefix, radix)| unsigned.strip_prefix(prefix).map(|d| (d, radix)));
    if let Some((digits, radix)) = radix_digits {
        return !digits.is_empty() && digits.chars().all(|c| c.is_digit(radix));
    }

    unsigned.contains('e') && unsigned.parse::<f64>().is_ok()
}

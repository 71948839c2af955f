//! Parser for one line of a secrets file.
//!
//! Each physical line is parsed on its own. A quote that is never closed is
//! an error for that line only; it never swallows the lines after it.

use thiserror::Error;

/// Why a line could not be parsed. Messages carry positions, never the text
/// of the line, since that text may be a secret.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LineError {
    #[error("line has no key")]
    EmptyKey,
    #[error("expected `=` at column {0}")]
    MissingEquals(usize),
    #[error("quote opened at column {0} is never closed")]
    UnterminatedQuote(usize),
    #[error("unexpected text after the closing quote at column {0}")]
    TrailingCharacters(usize),
}

/// Parse one line into a `(key, value)` pair.
///
/// Blank lines and `#` comments give `Ok(None)`. Accepted forms:
/// `KEY=value`, `KEY = value`, `export KEY=value`, `KEY="double quoted"`
/// (with `\n`, `\t`, `\"` and `\\` escapes) and `KEY='single quoted'`.
/// Unquoted values end at a ` #` comment and are trimmed.
///
/// `${NAME}` and `${NAME:-default}` in unquoted and double-quoted values are
/// replaced using `lookup`. Any other `$` is kept as written.
pub fn parse_line<F>(line: &str, lookup: F) -> Result<Option<(String, String)>, LineError>
where
    F: Fn(&str) -> Option<String>,
{
    let trimmed = line.trim_start();
    if trimmed.is_empty() || trimmed.starts_with('#') {
        return Ok(None);
    }

    let rest = strip_export(trimmed);
    let key_end = rest
        .find(|c: char| c == '=' || c.is_whitespace())
        .unwrap_or(rest.len());
    let key = &rest[..key_end];
    if key.is_empty() {
        return Err(LineError::EmptyKey);
    }

    let after_key = rest[key_end..].trim_start();
    let raw_value = after_key
        .strip_prefix('=')
        .ok_or_else(|| LineError::MissingEquals(column(line, after_key)))?
        .trim_start();

    let value = match raw_value.chars().next() {
        Some(quote @ ('"' | '\'')) => {
            let (inner, tail) = split_quoted(raw_value, quote)
                .ok_or_else(|| LineError::UnterminatedQuote(column(line, raw_value)))?;
            let tail_start = tail.trim_start();
            if !tail_start.is_empty() && !tail_start.starts_with('#') {
                return Err(LineError::TrailingCharacters(column(line, tail_start)));
            }
            if quote == '"' {
                expand(&unescape(inner, true), &lookup)
            } else {
                unescape(inner, false)
            }
        }
        _ => expand(strip_inline_comment(raw_value).trim_end(), &lookup),
    };

    Ok(Some((key.to_string(), value)))
}

/// 1-based character column of `suffix` within `line`
fn column(line: &str, suffix: &str) -> usize {
    line[..line.len() - suffix.len()].chars().count() + 1
}

fn strip_export(text: &str) -> &str {
    match text.strip_prefix("export") {
        Some(rest) if rest.starts_with([' ', '\t']) => rest.trim_start(),
        _ => text,
    }
}

/// Split `"inner"tail` at the closing quote; `None` when it is missing
fn split_quoted(text: &str, quote: char) -> Option<(&str, &str)> {
    let body = &text[quote.len_utf8()..];
    let mut escaped = false;
    for (idx, c) in body.char_indices() {
        if escaped {
            escaped = false;
        } else if c == '\\' {
            escaped = true;
        } else if c == quote {
            return Some((&body[..idx], &body[idx + c.len_utf8()..]));
        }
    }
    None
}

fn unescape(inner: &str, double_quoted: bool) -> String {
    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match (chars.next(), double_quoted) {
            (Some('\\'), _) => out.push('\\'),
            (Some('\''), _) => out.push('\''),
            (Some('"'), true) => out.push('"'),
            (Some('n'), true) => out.push('\n'),
            (Some('r'), true) => out.push('\r'),
            (Some('t'), true) => out.push('\t'),
            (Some(other), _) => {
                out.push('\\');
                out.push(other);
            }
            (None, _) => out.push('\\'),
        }
    }
    out
}

/// Cut an unquoted value at the first `#` preceded by whitespace
fn strip_inline_comment(value: &str) -> &str {
    let mut previous_is_space = false;
    for (idx, c) in value.char_indices() {
        if c == '#' && previous_is_space {
            return &value[..idx];
        }
        previous_is_space = c.is_whitespace();
    }
    value
}

fn expand<F>(value: &str, lookup: &F) -> String
where
    F: Fn(&str) -> Option<String>,
{
    let mut out = String::with_capacity(value.len());
    let mut rest = value;

    while let Some(start) = rest.find("${") {
        let Some(len) = rest[start + 2..].find('}') else {
            break;
        };
        let inner = &rest[start + 2..start + 2 + len];
        let (name, default) = match inner.split_once(":-") {
            Some((name, default)) => (name, default),
            None => (inner, ""),
        };

        out.push_str(&rest[..start]);
        out.push_str(&lookup(name).unwrap_or_else(|| default.to_string()));
        rest = &rest[start + 2 + len + 1..];
    }

    out.push_str(rest);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(line: &str) -> Result<Option<(String, String)>, LineError> {
        parse_line(line, |_| None)
    }

    fn pair(key: &str, value: &str) -> Option<(String, String)> {
        Some((key.to_string(), value.to_string()))
    }

    #[test]
    fn test_blank_and_comment_lines() {
        assert_eq!(parse(""), Ok(None));
        assert_eq!(parse("   "), Ok(None));
        assert_eq!(parse("  # API_KEY=commented"), Ok(None));
    }

    #[test]
    fn test_unquoted_values() {
        assert_eq!(parse("FOO=bar"), Ok(pair("FOO", "bar")));
        assert_eq!(parse("FOO = bar  "), Ok(pair("FOO", "bar")));
        assert_eq!(parse("FOO=bar # note"), Ok(pair("FOO", "bar")));
        assert_eq!(parse("FOO=a#b"), Ok(pair("FOO", "a#b")));
        assert_eq!(parse("FOO="), Ok(pair("FOO", "")));
        assert_eq!(parse("export FOO=bar"), Ok(pair("FOO", "bar")));
        assert_eq!(parse("export=1"), Ok(pair("export", "1")));
    }

    #[test]
    fn test_quoted_values() {
        assert_eq!(parse(r#"A="two words""#), Ok(pair("A", "two words")));
        assert_eq!(parse(r#"A="line\nbreak""#), Ok(pair("A", "line\nbreak")));
        assert_eq!(parse(r#"A="say \"hi\"" # c"#), Ok(pair("A", "say \"hi\"")));
        assert_eq!(parse(r"A='raw\n $HOME'"), Ok(pair("A", r"raw\n $HOME")));
    }

    #[test]
    fn test_dollar_kept_unless_braced() {
        assert_eq!(parse("PASSWORD=p$ssw0rd"), Ok(pair("PASSWORD", "p$ssw0rd")));
        assert_eq!(parse("PRICE=$5"), Ok(pair("PRICE", "$5")));
        assert_eq!(parse("OPEN=${never closed"), Ok(pair("OPEN", "${never closed")));
    }

    #[test]
    fn test_braced_references_use_lookup() {
        let lookup = |name: &str| (name == "HOST").then(|| "example.org".to_string());

        assert_eq!(
            parse_line("URL=https://${HOST}/v1", lookup),
            Ok(pair("URL", "https://example.org/v1"))
        );
        assert_eq!(
            parse_line(r#"URL="${MISSING:-localhost}:8080""#, lookup),
            Ok(pair("URL", "localhost:8080"))
        );
        assert_eq!(
            parse_line("URL='${HOST}'", lookup),
            Ok(pair("URL", "${HOST}"))
        );
        assert_eq!(parse_line("URL=${MISSING}", lookup), Ok(pair("URL", "")));
    }

    #[test]
    fn test_malformed_lines() {
        assert_eq!(parse("JUSTAKEY"), Err(LineError::MissingEquals(9)));
        assert_eq!(parse("this is not valid"), Err(LineError::MissingEquals(6)));
        assert_eq!(parse("=value"), Err(LineError::EmptyKey));
        assert_eq!(
            parse(r#"BAD="unterminated"#),
            Err(LineError::UnterminatedQuote(5))
        );
        assert_eq!(
            parse(r#"BAD="closed" trailing"#),
            Err(LineError::TrailingCharacters(14))
        );
    }

    #[test]
    fn test_error_message_hides_value() {
        let err = parse(r#"TOKEN="sk-secret"#).unwrap_err();
        assert!(!err.to_string().contains("sk-secret"));
    }
}

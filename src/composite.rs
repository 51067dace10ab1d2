//! Textual composite-value syntax.
//!
//! When a driver has no structured binding, arrays arrive as `{a,b,"c d"}`
//! and records as `(a,b,"c d")`. Splitting is a single left-to-right pass
//! tracking quote state and brace/paren depth, so nested arrays and records
//! survive as raw text for the element codec to recurse into.

/// Split the top level of a `{...}` array literal. `None` elements are
/// unquoted `NULL` markers.
pub fn parse_array(s: &str) -> Result<Vec<Option<String>>, String> {
    let inner = strip_delimiters(s, '{', '}')?;
    if inner.is_empty() {
        return Ok(vec![]);
    }
    let raw = split_top_level(inner)?;
    Ok(raw
        .into_iter()
        .map(|(text, quoted)| {
            if !quoted && text.eq_ignore_ascii_case("NULL") {
                None
            } else {
                Some(text)
            }
        })
        .collect())
}

/// Split the top level of a `(...)` record literal. `None` fields are
/// empty unquoted positions (`(a,,c)`).
pub fn parse_record(s: &str) -> Result<Vec<Option<String>>, String> {
    let inner = strip_delimiters(s, '(', ')')?;
    if inner.is_empty() {
        return Ok(vec![None]);
    }
    let raw = split_top_level(inner)?;
    Ok(raw
        .into_iter()
        .map(|(text, quoted)| {
            if !quoted && text.is_empty() {
                None
            } else {
                Some(text)
            }
        })
        .collect())
}

fn strip_delimiters(s: &str, open: char, close: char) -> Result<&str, String> {
    let s = s.trim();
    if !s.starts_with(open) || !s.ends_with(close) || s.len() < 2 {
        return Err(format!("expected '{}...{}', got '{}'", open, close, s));
    }
    Ok(&s[1..s.len() - 1])
}

/// Split comma-separated elements, honoring double quotes, backslash
/// escapes, and nested `{}`/`()` groups. Returns each element's unescaped
/// text plus whether it was quoted.
fn split_top_level(inner: &str) -> Result<Vec<(String, bool)>, String> {
    let mut out = Vec::new();
    let mut current = String::new();
    let mut quoted = false;
    let mut in_quotes = false;
    let mut depth = 0usize;
    let mut chars = inner.chars().peekable();

    while let Some(c) = chars.next() {
        if in_quotes {
            // At the top level the quoted text is unescaped into the
            // element; inside a nested group it stays verbatim so the
            // recursive reparse still sees the quoting.
            let verbatim = depth > 0;
            match c {
                '\\' => {
                    let next = chars
                        .next()
                        .ok_or_else(|| "dangling backslash".to_string())?;
                    if verbatim {
                        current.push('\\');
                    }
                    current.push(next);
                }
                '"' => {
                    // A doubled quote inside quotes is a literal quote.
                    if chars.peek() == Some(&'"') {
                        chars.next();
                        if verbatim {
                            current.push('"');
                        }
                        current.push('"');
                    } else {
                        if verbatim {
                            current.push('"');
                        }
                        in_quotes = false;
                    }
                }
                _ => current.push(c),
            }
            continue;
        }

        match c {
            '"' => {
                in_quotes = true;
                if depth == 0 {
                    quoted = true;
                } else {
                    current.push('"');
                }
            }
            '{' | '(' => {
                depth += 1;
                current.push(c);
            }
            '}' | ')' => {
                depth = depth
                    .checked_sub(1)
                    .ok_or_else(|| format!("unbalanced '{}' in '{}'", c, inner))?;
                current.push(c);
            }
            ',' if depth == 0 => {
                out.push((std::mem::take(&mut current), quoted));
                quoted = false;
            }
            _ => current.push(c),
        }
    }

    if in_quotes {
        return Err(format!("unterminated quote in '{}'", inner));
    }
    if depth != 0 {
        return Err(format!("unbalanced group in '{}'", inner));
    }
    out.push((current, quoted));
    Ok(out)
}

/// Encode array elements back to `{...}` form.
pub fn encode_array(elements: &[Option<String>]) -> String {
    let body: Vec<String> = elements
        .iter()
        .map(|e| match e {
            None => "NULL".to_string(),
            Some(s) => quote_element(s, false),
        })
        .collect();
    format!("{{{}}}", body.join(","))
}

/// Encode record fields back to `(...)` form. Null fields are empty.
pub fn encode_record(fields: &[Option<String>]) -> String {
    let body: Vec<String> = fields
        .iter()
        .map(|e| match e {
            None => String::new(),
            Some(s) => quote_element(s, true),
        })
        .collect();
    format!("({})", body.join(","))
}

fn quote_element(s: &str, record: bool) -> String {
    let needs_quotes = s.is_empty()
        || s.eq_ignore_ascii_case("NULL")
        || s.chars().any(|c| {
            matches!(c, ',' | '"' | '\\' | '{' | '}' | '(' | ')') || c.is_whitespace()
        })
        || (record && s.is_empty());
    if needs_quotes {
        format!("\"{}\"", s.replace('\\', "\\\\").replace('"', "\\\""))
    } else {
        s.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_array_simple() {
        assert_eq!(parse_array("{}").unwrap(), vec![]);
        assert_eq!(
            parse_array("{a,b,c}").unwrap(),
            vec![Some("a".into()), Some("b".into()), Some("c".into())]
        );
    }

    #[test]
    fn test_parse_array_quoted_and_null() {
        assert_eq!(
            parse_array(r#"{"hello, world",NULL,"NULL"}"#).unwrap(),
            vec![Some("hello, world".into()), None, Some("NULL".into())]
        );
    }

    #[test]
    fn test_parse_array_nested_stays_raw() {
        assert_eq!(
            parse_array("{{1,2},{3,4}}").unwrap(),
            vec![Some("{1,2}".into()), Some("{3,4}".into())]
        );
        assert_eq!(
            parse_array(r#"{"(1,a)","(2,b)"}"#).unwrap(),
            vec![Some("(1,a)".into()), Some("(2,b)".into())]
        );
    }

    #[test]
    fn test_nested_quoted_delimiters_stay_raw() {
        // Braces inside a quoted element of a nested group must not move
        // the depth counter, and the quoting survives for the reparse.
        assert_eq!(
            parse_array(r#"{{a,"x}y"}}"#).unwrap(),
            vec![Some(r#"{a,"x}y"}"#.into())]
        );
        assert_eq!(
            parse_array(r#"{(1,"a)b"),(2,c)}"#).unwrap(),
            vec![Some(r#"(1,"a)b")"#.into()), Some("(2,c)".into())]
        );
        // The kept quoting unescapes correctly one level down.
        assert_eq!(
            parse_array(r#"{a,"x}y"}"#).unwrap(),
            vec![Some("a".into()), Some("x}y".into())]
        );
    }

    #[test]
    fn test_parse_record() {
        assert_eq!(
            parse_record("(1,,abc)").unwrap(),
            vec![Some("1".into()), None, Some("abc".into())]
        );
        assert_eq!(
            parse_record(r#"(1,"a,b")"#).unwrap(),
            vec![Some("1".into()), Some("a,b".into())]
        );
    }

    #[test]
    fn test_encode_round_trip() {
        let elems = vec![Some("a b".to_string()), None, Some(r#"q"t"#.to_string())];
        let encoded = encode_array(&elems);
        assert_eq!(parse_array(&encoded).unwrap(), elems);

        let fields = vec![Some("1".to_string()), None, Some("x,y".to_string())];
        let encoded = encode_record(&fields);
        assert_eq!(parse_record(&encoded).unwrap(), fields);
    }

    #[test]
    fn test_malformed() {
        assert!(parse_array("1,2").is_err());
        assert!(parse_array("{\"unterminated}").is_err());
        assert!(parse_array("{{a}").is_err());
    }
}

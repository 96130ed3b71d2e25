//! Content-line decoding.

use crate::{Param, Property, VCard, VCardError};

pub(crate) fn parse(data: &[u8]) -> Result<VCard, VCardError> {
    let text = std::str::from_utf8(data).map_err(|_| VCardError::InvalidUtf8)?;
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);

    let mut lines = unfold(text).into_iter().filter(|(_, l)| !l.is_empty());

    let (_, first) = lines.next().ok_or(VCardError::Empty)?;
    if !first.eq_ignore_ascii_case("BEGIN:VCARD") {
        return Err(VCardError::MissingBegin(first));
    }

    let mut properties = Vec::new();
    let mut ended = false;
    for (line_no, line) in lines {
        if ended {
            return Err(VCardError::TrailingContent(line_no));
        }
        if line.eq_ignore_ascii_case("END:VCARD") {
            ended = true;
            continue;
        }

        let property = parse_line(&line, line_no)?;
        if property.name == "BEGIN" || property.name == "END" {
            return Err(VCardError::NestedComponent(line_no));
        }
        properties.push(property);
    }

    if !ended {
        return Err(VCardError::MissingEnd);
    }

    Ok(VCard { properties })
}

/// Joins folded lines. Each logical line keeps the 1-based number of the
/// physical line it started on.
fn unfold(text: &str) -> Vec<(usize, String)> {
    let mut out: Vec<(usize, String)> = Vec::new();
    for (idx, raw) in text.split('\n').enumerate() {
        let line = raw.strip_suffix('\r').unwrap_or(raw);
        if let Some(rest) = line.strip_prefix(|c: char| c == ' ' || c == '\t') {
            if let Some((_, previous)) = out.last_mut() {
                previous.push_str(rest);
                continue;
            }
        }
        out.push((idx + 1, line.to_string()));
    }
    out
}

fn parse_line(line: &str, line_no: usize) -> Result<Property, VCardError> {
    let malformed = |reason| VCardError::MalformedLine {
        line: line_no,
        reason,
    };

    let colon = find_unquoted(line, ':').ok_or_else(|| malformed("missing ':' separator"))?;
    let (head, value) = (&line[..colon], &line[colon + 1..]);

    let mut segments = split_unquoted(head, ';').into_iter();
    let name_part = segments.next().unwrap_or_default();
    let (group, name) = match name_part.split_once('.') {
        Some((group, name)) => (Some(group), name),
        None => (None, name_part),
    };

    if name.is_empty() || !is_token(name) {
        return Err(malformed("invalid property name"));
    }
    if let Some(group) = group {
        if group.is_empty() || !is_token(group) {
            return Err(malformed("invalid group name"));
        }
    }

    let mut params = Vec::new();
    for segment in segments {
        if segment.is_empty() {
            return Err(malformed("empty parameter"));
        }
        let param = match segment.split_once('=') {
            Some((name, value)) => Param {
                name: name.to_ascii_uppercase(),
                value: Some(unquote(value).to_string()),
            },
            None => Param {
                name: segment.to_ascii_uppercase(),
                value: None,
            },
        };
        if param.name.is_empty() {
            return Err(malformed("empty parameter name"));
        }
        params.push(param);
    }

    Ok(Property {
        group: group.map(str::to_string),
        name: name.to_ascii_uppercase(),
        params,
        value: value.to_string(),
    })
}

fn is_token(s: &str) -> bool {
    s.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
}

fn unquote(s: &str) -> &str {
    s.strip_prefix('"')
        .and_then(|inner| inner.strip_suffix('"'))
        .unwrap_or(s)
}

fn find_unquoted(s: &str, needle: char) -> Option<usize> {
    let mut in_quotes = false;
    for (idx, c) in s.char_indices() {
        match c {
            '"' => in_quotes = !in_quotes,
            c if c == needle && !in_quotes => return Some(idx),
            _ => {}
        }
    }
    None
}

fn split_unquoted(s: &str, sep: char) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut start = 0;
    let mut in_quotes = false;
    for (idx, c) in s.char_indices() {
        match c {
            '"' => in_quotes = !in_quotes,
            c if c == sep && !in_quotes => {
                parts.push(&s[start..idx]);
                start = idx + c.len_utf8();
            }
            _ => {}
        }
    }
    parts.push(&s[start..]);
    parts
}

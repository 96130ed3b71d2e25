//! Canonical encoding.

use crate::VCard;

/// Maximum octets per physical line, excluding the CRLF.
const MAX_LINE_OCTETS: usize = 75;

pub(crate) fn write(card: &VCard) -> Vec<u8> {
    let mut out = String::from("BEGIN:VCARD\r\n");

    for property in &card.properties {
        let mut line = String::new();
        if let Some(group) = &property.group {
            line.push_str(group);
            line.push('.');
        }
        line.push_str(&property.name);
        for param in &property.params {
            line.push(';');
            line.push_str(&param.name);
            if let Some(value) = &param.value {
                line.push('=');
                if value.contains(|c: char| matches!(c, ':' | ';' | ',')) {
                    line.push('"');
                    line.push_str(value);
                    line.push('"');
                } else {
                    line.push_str(value);
                }
            }
        }
        line.push(':');
        line.push_str(&property.value);
        fold_into(&mut out, &line);
    }

    out.push_str("END:VCARD\r\n");
    out.into_bytes()
}

/// Appends `line` folded on UTF-8 boundaries. Continuation lines start with
/// a single space, which counts toward their octet budget.
fn fold_into(out: &mut String, line: &str) {
    let mut rest = line;
    let mut budget = MAX_LINE_OCTETS;
    while rest.len() > budget {
        let mut cut = budget;
        while !rest.is_char_boundary(cut) {
            cut -= 1;
        }
        out.push_str(&rest[..cut]);
        out.push_str("\r\n ");
        rest = &rest[cut..];
        budget = MAX_LINE_OCTETS - 1;
    }
    out.push_str(rest);
    out.push_str("\r\n");
}

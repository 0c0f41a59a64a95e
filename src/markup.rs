//! Markup entity decoding.
//!
//! Decompiler backends emit markup-escaped source text, and the template
//! engine escapes substituted values a second time. Both layers are undone
//! with [`decode_entities`] so downstream prompts carry literal source
//! syntax.

/// Decodes named and numeric markup entities in a single pass.
///
/// Text that contains no entities comes back unchanged, which makes the
/// decode idempotent on already-literal input. Unrecognized entities are
/// left as written.
pub fn decode_entities(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut rest = input;

    while let Some(pos) = rest.find('&') {
        out.push_str(&rest[..pos]);
        let tail = &rest[pos..];

        // Entity names are short; anything past a handful of characters
        // without a terminator is literal text.
        match tail[1..].find(';') {
            Some(len) if (1..=8).contains(&len) => {
                let entity = &tail[1..1 + len];
                match decode_one(entity) {
                    Some(ch) => {
                        out.push(ch);
                        rest = &tail[len + 2..];
                    }
                    None => {
                        out.push('&');
                        rest = &tail[1..];
                    }
                }
            }
            _ => {
                out.push('&');
                rest = &tail[1..];
            }
        }
    }

    out.push_str(rest);
    out
}

fn decode_one(entity: &str) -> Option<char> {
    match entity {
        "lt" => Some('<'),
        "gt" => Some('>'),
        "amp" => Some('&'),
        "quot" => Some('"'),
        "apos" => Some('\''),
        "nbsp" => Some('\u{a0}'),
        _ => {
            let num = entity.strip_prefix('#')?;
            let code = match num.strip_prefix(['x', 'X']) {
                Some(hex) => u32::from_str_radix(hex, 16).ok()?,
                None => num.parse::<u32>().ok()?,
            };
            char::from_u32(code)
        }
    }
}

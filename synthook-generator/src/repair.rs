//! Local repair of generator output
//!
//! Models often wrap the payload in Markdown fences or a sentence of prose.
//! One pass strips that; whether the result is valid JSON is left to the
//! schema registry.

use synthook_schema::CandidatePayload;

/// Wrap raw service text, keeping the first JSON object when one is found
pub fn repair(raw: impl Into<String>) -> CandidatePayload {
    let raw = raw.into();
    match extract_json_object(&raw) {
        Some(object) if object != raw => {
            let object = object.to_string();
            CandidatePayload::repaired(raw, object)
        }
        _ => CandidatePayload::new(raw),
    }
}

/// Find the first balanced `{...}` span, looking inside a code fence first
///
/// A fence without an object falls back to the whole text. Braces inside
/// string literals are ignored. Returns `None` when the text holds no
/// complete object.
pub fn extract_json_object(text: &str) -> Option<&str> {
    fenced_body(text)
        .and_then(first_object)
        .or_else(|| first_object(text))
}

fn first_object(body: &str) -> Option<&str> {
    let start = body.find('{')?;

    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (offset, c) in body[start..].char_indices() {
        if in_string {
            match c {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }

        match c {
            '"' => in_string = true,
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(&body[start..=start + offset]);
                }
            }
            _ => {}
        }
    }

    None
}

/// Content of the first ``` fence, without its language tag
fn fenced_body(text: &str) -> Option<&str> {
    let open = text.find("```")?;
    let after = &text[open + 3..];
    let content_start = after.find('\n').map_or(after.len(), |i| i + 1);
    let content = &after[content_start..];
    let close = content.find("```").unwrap_or(content.len());
    Some(&content[..close])
}

//! Content truncation for context windows

/// Shorten long content to a header and footer around an expansion marker
///
/// Content of `threshold` characters or fewer is returned unchanged. The
/// marker names the event stamp so a caller can ask for the full text.
/// Lengths are counted in characters, never splitting a code point.
pub fn truncate_content(
    content: &str,
    stamp: &str,
    threshold: usize,
    header_len: usize,
    footer_len: usize,
) -> String {
    let total = content.chars().count();
    if total <= threshold || total <= header_len + footer_len {
        return content.to_string();
    }

    let omitted = total - header_len - footer_len;
    let header: String = content.chars().take(header_len).collect();
    let footer: String = content.chars().skip(total - footer_len).collect();

    format!(
        "{}\n\n[...TRUNCATED: {} chars omitted. To expand, request stamp: {}...]\n\n{}",
        header,
        group_thousands(omitted),
        stamp,
        footer
    )
}

fn group_thousands(n: usize) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

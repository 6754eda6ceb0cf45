/// Longest chat message relayed to the room
pub const MAX_CHAT_LENGTH: usize = 35;

/// Remove anything that looks like a markup tag (`<...>` with at least one
/// character inside). A lone `<` with no closing `>` is kept.
pub fn strip_tags(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut rest = raw;

    while let Some(open) = rest.find('<') {
        let after = &rest[open + 1..];
        match after.find('>') {
            Some(close) if close > 0 => {
                out.push_str(&rest[..open]);
                rest = &after[close + 1..];
            }
            _ => {
                out.push_str(&rest[..=open]);
                rest = after;
            }
        }
    }
    out.push_str(rest);
    out
}

/// Truncate to `max` characters (not bytes)
pub fn truncate_chars(raw: &str, max: usize) -> String {
    raw.chars().take(max).collect()
}

/// Clean a chat line the way it is relayed: tags stripped, then truncated
pub fn sanitize_chat(sender: &str, message: &str) -> (String, String) {
    (
        strip_tags(sender),
        truncate_chars(&strip_tags(message), MAX_CHAT_LENGTH),
    )
}

//! HTML rendering helpers for chat payloads

use std::borrow::Cow;

/// Escape the five HTML metacharacters, leaving everything else literal
///
/// Emoji and other non-ASCII text pass through untouched. Escaped brackets
/// and parentheses also stop markdown link/image syntax from rendering.
///
/// ```
/// use litty_logs::payload::html::escape;
///
/// assert_eq!(escape("<b>\"hi\" & 'bye'</b> 🔥"),
///            "&lt;b&gt;&quot;hi&quot; &amp; &#39;bye&#39;&lt;/b&gt; 🔥");
/// ```
pub fn escape(text: &str) -> Cow<'_, str> {
    if !text.contains(['&', '<', '>', '"', '\'']) {
        return Cow::Borrowed(text);
    }

    let mut escaped = String::with_capacity(text.len() + 16);
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    Cow::Owned(escaped)
}

/// Split a webhook message into its log line and fenced error block
///
/// The webhook sink renders an attached error as
/// ``"line\n```\ndetail\n```"``; anything else yields `None`.
pub fn split_fenced(message: &str) -> Option<(&str, &str)> {
    let (line, rest) = message.split_once("\n```\n")?;
    let code = rest.strip_suffix("\n```")?;
    Some((line, code))
}

/// One webhook message as HTML
///
/// The error block becomes `<pre><code>…</code></pre>`; any other line
/// break becomes `<br/>`.
pub fn message_to_html(message: &str) -> String {
    match split_fenced(message) {
        Some((line, code)) => format!(
            "{}<pre><code>{}</code></pre>",
            escape(line).replace('\n', "<br/>"),
            escape(code)
        ),
        None => escape(message).replace('\n', "<br/>"),
    }
}

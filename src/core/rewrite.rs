//! Message rewrite table
//!
//! Well-known host lifecycle and request messages are swapped for their
//! embellished version. Lookup is by prefix; the first matching row wins
//! and anything after the prefix is spliced into the replacement.

use std::borrow::Cow;

type Rewrite = fn(&str) -> String;

/// `(prefix, rewrite)`; the rewrite receives the text after the prefix
const TABLE: &[(&str, Rewrite)] = &[
    (
        "Application started. Press Ctrl+C to shut down.",
        |_| "app is bussin and ready to slay bestie 💅 yeet Ctrl+C to dip out no cap".to_string(),
    ),
    ("Application is shutting down...", |_| {
        "app said aight imma head out 💀".to_string()
    }),
    ("Now listening on: ", |rest| {
        format!("we vibing on {} fr fr 🎧", rest)
    }),
    ("Content root path: ", |rest| {
        format!("content root living at {} bestie 📁", rest)
    }),
    ("Hosting environment: ", |rest| {
        format!("we in our {} era rn ✨", rest)
    }),
    ("Hosting starting", |_| {
        "booting up, lets get this bread 🍞".to_string()
    }),
    ("Hosting started", |_| {
        "fully locked in and ready to slay 💅".to_string()
    }),
    ("Hosting stopping", |_| {
        "yeeting ourselves out of existence 🫡".to_string()
    }),
    ("Hosting stopped", |_| {
        "we out, peace was never an option ✌️".to_string()
    }),
    ("Request starting ", |rest| {
        format!("yo a request just slid in: {} 👀", rest)
    }),
    ("Request finished ", |rest| {
        format!("request finished cooking: {} 🍳", rest)
    }),
    // the endpoint rows keep the opening quote of the endpoint name
    ("Request matched endpoint '", |rest| {
        format!("request found its bestie endpoint '{} 🤝", rest)
    }),
    ("Executing endpoint '", |rest| {
        format!("finna execute endpoint '{} lets gooo 🚀", rest)
    }),
    ("Executed endpoint '", |rest| {
        format!("endpoint '{} just ate and left no crumbs 💅", rest)
    }),
];

/// Rewrite a known message, or `None` when no row matches
pub fn try_rewrite(message: &str) -> Option<String> {
    TABLE
        .iter()
        .find_map(|(prefix, apply)| message.strip_prefix(prefix).map(apply))
}

/// Rewrite a known message, passing anything else through unchanged
pub fn rewrite(message: &str) -> Cow<'_, str> {
    match try_rewrite(message) {
        Some(rewritten) => Cow::Owned(rewritten),
        None => Cow::Borrowed(message),
    }
}

use std::{borrow::Cow, sync::LazyLock};

use base64::{Engine, engine::general_purpose::STANDARD};
use rand::{Rng, distr::Alphanumeric};
use regex::Regex;

use crate::types::Credentials;

static FEAT_SEGMENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)[(\[]feat.*?[)\]] ?").expect("valid feat pattern"));
static BRACKET_SEGMENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[(\[].*?[)\]] ?").expect("valid bracket pattern"));
static WILDCARD_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\*\S*").expect("valid wildcard pattern"));

/// Cleans a track title or artist name before it is used as search input.
///
/// Drops `(feat. ...)` / `[feat. ...]` credits, masks every non-whitespace run
/// that follows a `*` with an equal number of `*` so the search API never sees
/// a wildcard operator, and trims the result.
///
/// ```text
/// "Song (feat. X)"   -> "Song"
/// "Go *NSYNC remix"  -> "Go ****** remix"
/// ```
pub fn sanitize_query(s: &str) -> String {
    sanitize_with(&FEAT_SEGMENT, s)
}

/// Like [`sanitize_query`] but drops every bracketed segment. Used to compare a
/// candidate's name with the title that was searched for.
pub fn sanitize_string(s: &str) -> String {
    sanitize_with(&BRACKET_SEGMENT, s)
}

fn sanitize_with(segment: &Regex, s: &str) -> String {
    // Removing one segment can join two halves into a new one, e.g.
    // "((feat. a)feat. b)", so strip until nothing matches.
    let mut stripped = s.to_string();
    loop {
        match segment.replace_all(&stripped, "") {
            Cow::Borrowed(_) => break,
            Cow::Owned(next) => stripped = next,
        }
    }

    let masked = WILDCARD_RUN.replace_all(&stripped, |caps: &regex::Captures| {
        "*".repeat(caps[0].chars().count())
    });

    masked.trim().to_string()
}

/// Query sent to the destination search. Artists joined with `&` are
/// turned into a comma separated list; `None` drops the artist term.
pub fn build_search_query(title: &str, artist: Option<&str>) -> String {
    let title = sanitize_query(title);
    match artist.map(sanitize_query).filter(|a| !a.is_empty()) {
        Some(artist) => format!("{}: {}", title, artist.replace("& ", ",")),
        None => title,
    }
}

/// Case-insensitive comparison of a candidate name against a searched title.
pub fn names_match(candidate: &str, title: &str) -> bool {
    sanitize_string(candidate).to_lowercase() == sanitize_string(title).to_lowercase()
}

/// `Basic` authorization header value for the client-credentials grant.
pub fn basic_auth_value(credentials: &Credentials) -> String {
    let raw = format!("{}:{}", credentials.client_id, credentials.client_secret);
    format!("Basic {}", STANDARD.encode(raw))
}

/// Random `state` parameter for the authorize redirect.
pub fn generate_state() -> String {
    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(32)
        .map(char::from)
        .collect()
}

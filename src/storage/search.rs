//! Query text handling for full-text search

/// Builds an FTS5 `MATCH` expression from free-form query text
///
/// The query is lower-cased and split on anything that is not alphanumeric.
/// Single-character tokens are dropped, duplicates removed, and each remaining
/// term is quoted and OR-joined. Returns `None` when no term survives.
///
/// # Arguments
///
/// * `query` - Free text typed by a user
///
/// # Returns
///
/// * `Some(String)` - An FTS5 `MATCH` expression
/// * `None` - The query has no searchable terms
///
/// # Examples
///
/// ```
/// use tidecrawl::storage::match_expression;
///
/// assert_eq!(match_expression("Rust language!").as_deref(), Some("\"rust\" OR \"language\""));
/// assert_eq!(match_expression("a ?"), None);
/// ```
pub fn match_expression(query: &str) -> Option<String> {
    let lowered = query.to_lowercase();
    let mut terms: Vec<&str> = Vec::new();

    for token in lowered.split(|c: char| !c.is_alphanumeric()) {
        if token.chars().count() > 1 && !terms.contains(&token) {
            terms.push(token);
        }
    }

    if terms.is_empty() {
        return None;
    }

    Some(
        terms
            .iter()
            .map(|term| format!("\"{}\"", term))
            .collect::<Vec<_>>()
            .join(" OR "),
    )
}

use url::Url;

/// Extracts the registrable (scope) domain of a URL
///
/// The host is lowercased, an explicit port is kept, and a single leading
/// `www.` is removed. Two URLs belong to the same site exactly when their
/// registrable domains are equal; subdomains other than `www` are separate sites.
///
/// # Arguments
///
/// * `url` - An absolute URL
///
/// # Returns
///
/// * `Some(String)` - The scope domain
/// * `None` - The URL does not parse or has no host
///
/// # Examples
///
/// ```
/// use tidecrawl::url::registrable_domain;
///
/// assert_eq!(registrable_domain("https://www.Example.com/a"), Some("example.com".to_string()));
/// assert_eq!(registrable_domain("https://blog.example.com/"), Some("blog.example.com".to_string()));
/// assert_eq!(registrable_domain("mailto:someone@example.com"), None);
/// ```
pub fn registrable_domain(url: &str) -> Option<String> {
    let parsed = Url::parse(url).ok()?;
    let host = parsed.host_str()?.to_lowercase();
    let host = host.strip_prefix("www.").unwrap_or(&host);

    match parsed.port() {
        Some(port) => Some(format!("{}:{}", host, port)),
        None => Some(host.to_string()),
    }
}

/// Returns true when `candidate` is on the same site as `scope_domain`
pub fn is_same_site(scope_domain: &str, candidate: &str) -> bool {
    registrable_domain(candidate).is_some_and(|domain| domain == scope_domain)
}

/// Returns `scheme://host[:port]` for a URL
pub fn origin_of(url: &str) -> Option<String> {
    let parsed = Url::parse(url).ok()?;
    let origin = parsed.origin();
    if origin.is_tuple() {
        Some(origin.ascii_serialization())
    } else {
        None
    }
}

/// Returns the scheme of a URL (`http`, `https`, ...)
pub fn scheme_of(url: &str) -> Option<String> {
    Url::parse(url).ok().map(|u| u.scheme().to_string())
}

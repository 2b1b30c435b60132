use url::Url;

/// Return `true` if `raw` parses as an absolute URL with both a scheme and a
/// non-empty host. Reachability is never checked.
///
/// Relative references ("/a/b", "example.com"), free text and the empty
/// string are rejected, as are host-less absolute forms such as
/// `mailto:someone@example.com` or `file:///etc/hosts`.
pub fn validate(raw: &str) -> bool {
    match Url::parse(raw) {
        Ok(url) => url.host_str().is_some_and(|host| !host.is_empty()),
        Err(_) => false,
    }
}

/// Host (and port) part of a URL, for display.
pub fn hostname_from_url(u: &str) -> String {
    let s = u.trim();
    if s.is_empty() {
        return "".into();
    }
    let s = match s.find("://") {
        Some(idx) => &s[idx + 3..],
        None => s,
    };
    let authority = s.split(['/', '?', '#']).next().unwrap_or(s);
    // Never show credentials embedded in the URL.
    match authority.rsplit_once('@') {
        Some((_, host)) => host.to_string(),
        None => authority.to_string(),
    }
}

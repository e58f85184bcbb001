/// Reduce a track reference to its bare catalog identifier.
///
/// Accepts a bare id, a web URL `.../track/{id}[?...]` or a URI
/// `scheme:track:{id}`; anything else comes back unchanged.
pub fn normalize(input: &str) -> String {
    from_url(input)
        .or_else(|| from_uri(input))
        .unwrap_or(input)
        .to_owned()
}

fn from_url(input: &str) -> Option<&str> {
    if !(input.starts_with("https://") || input.starts_with("http://")) {
        return None;
    }
    let without_query = input.split(['?', '#']).next().unwrap_or(input);
    let (_, tail) = without_query.rsplit_once("/track/")?;
    let id = tail.trim_end_matches('/');
    // an id with ':' would be re-parsed as a URI on a second pass
    (!id.is_empty() && !id.contains(['/', ':'])).then_some(id)
}

fn from_uri(input: &str) -> Option<&str> {
    let mut parts = input.split(':');
    let scheme = parts.next()?;
    let kind = parts.next()?;
    let id = parts.next()?;
    if parts.next().is_some() || scheme.is_empty() || kind != "track" || id.is_empty() {
        return None;
    }
    Some(id)
}

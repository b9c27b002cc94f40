use url::Url;

/// Add a scheme to bare hosts so they can be parsed as URLs
pub fn ensure_scheme(url: &str) -> String {
    let trimmed = url.trim();

    if trimmed.contains("://") || trimmed.starts_with("data:") || trimmed.starts_with("about:") {
        return trimmed.to_string();
    }

    // localhost special case - use http by default
    if trimmed.starts_with("localhost") || trimmed.starts_with("127.0.0.1") {
        return format!("http://{}", trimmed);
    }

    format!("https://{}", trimmed)
}

/// Cache key for a site: lower-cased hostname without a leading `www.`.
///
/// Accepts full URLs, scheme-less URLs, and bare domains.
pub fn normalize_domain(domain_or_url: &str) -> String {
    let trimmed = domain_or_url.trim();
    let host = Url::parse(&ensure_scheme(trimmed))
        .ok()
        .and_then(|u| u.host_str().map(str::to_string))
        .unwrap_or_else(|| trimmed.split('/').next().unwrap_or_default().to_string());

    let host = host.to_ascii_lowercase();
    match host.strip_prefix("www.") {
        Some(stripped) => stripped.to_string(),
        None => host,
    }
}

/// Path component of a URL; relative URLs are returned without query or fragment.
/// Empty when the input has no usable path.
pub fn url_path(url: &str) -> String {
    let trimmed = url.trim();
    if trimmed.starts_with('/') {
        let end = trimmed.find(['?', '#']).unwrap_or(trimmed.len());
        return trimmed[..end].to_string();
    }

    match Url::parse(trimmed) {
        Ok(parsed) => parsed.path().to_string(),
        Err(_) => String::new(),
    }
}

/// Truncate to at most `max` characters without splitting a code point
pub fn truncate_chars(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((idx, _)) => text[..idx].to_string(),
        None => text.to_string(),
    }
}

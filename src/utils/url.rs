// src/utils/url.rs

//! URL manipulation utilities.

use url::Url;

use crate::error::Result;

/// Resolve a potentially relative href against a base URL.
pub fn resolve(base: &Url, href: &str) -> Result<Url> {
    Ok(base.join(href)?)
}

/// Whether two URLs share the same host.
pub fn same_domain(a: &Url, b: &Url) -> bool {
    match (a.host_str(), b.host_str()) {
        (Some(ha), Some(hb)) => ha.eq_ignore_ascii_case(hb),
        _ => false,
    }
}

//! Client identifier extraction for rate limiting.

use std::collections::HashMap;
use std::hash::BuildHasher;

/// Shared bucket for requests that carry no address headers.
pub const UNKNOWN_CLIENT: &str = "unknown";

/// Read access to request headers. Names are matched case-insensitively.
pub trait RequestHeaders {
    fn header(&self, name: &str) -> Option<&str>;
}

impl<S: BuildHasher> RequestHeaders for HashMap<String, String, S> {
    fn header(&self, name: &str) -> Option<&str> {
        self.iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

impl<'a> RequestHeaders for [(&'a str, &'a str)] {
    fn header(&self, name: &str) -> Option<&str> {
        self.iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| *value)
    }
}

/// First `x-forwarded-for` hop, else `x-real-ip`, else [`UNKNOWN_CLIENT`].
pub fn client_identifier<H: RequestHeaders + ?Sized>(headers: &H) -> String {
    let forwarded = headers
        .header("x-forwarded-for")
        .and_then(|value| value.split(',').next())
        .map(str::trim)
        .filter(|ip| !ip.is_empty());
    if let Some(ip) = forwarded {
        return ip.to_string();
    }

    headers
        .header("x-real-ip")
        .map(str::trim)
        .filter(|ip| !ip.is_empty())
        .unwrap_or(UNKNOWN_CLIENT)
        .to_string()
}

//! Security headers middleware.
//!
//! Adds security headers to all responses:
//! - Content-Security-Policy
//! - X-Content-Type-Options
//! - X-Frame-Options
//!
//! The editor loads MathJax from a CDN, so the policy admits the origin of
//! the configured loader URL for scripts and fonts.

use axum::http::HeaderValue;
use axum::http::header::{HeaderName, InvalidHeaderValue};
use tower_http::set_header::SetResponseHeaderLayer;

/// Origin (`scheme://host[:port]`) of an absolute http(s) URL.
pub(crate) fn origin_of(url: &str) -> Option<&str> {
    let scheme_end = url.find("://")?;
    let scheme = &url[..scheme_end];
    if scheme != "http" && scheme != "https" {
        return None;
    }
    let host_start = scheme_end + 3;
    let host_end = url[host_start..]
        .find(['/', '?', '#'])
        .map_or(url.len(), |i| host_start + i);
    if host_end == host_start {
        return None;
    }
    Some(&url[..host_end])
}

/// Content-Security-Policy value admitting `script_origin`.
pub(crate) fn csp_value(script_origin: Option<&str>) -> String {
    let extra = script_origin.map(|o| format!(" {o}")).unwrap_or_default();
    format!(
        "default-src 'self'; \
         script-src 'self'{extra}; \
         style-src 'self' 'unsafe-inline'; \
         font-src 'self' data:{extra}; \
         img-src 'self' data:; \
         connect-src 'self'{extra}; \
         frame-ancestors 'none'"
    )
}

/// Create layer that adds Content-Security-Policy header.
pub(crate) fn csp_layer(
    mathjax_url: &str,
) -> Result<SetResponseHeaderLayer<HeaderValue>, InvalidHeaderValue> {
    let value = HeaderValue::from_str(&csp_value(origin_of(mathjax_url)))?;
    Ok(SetResponseHeaderLayer::overriding(
        HeaderName::from_static("content-security-policy"),
        value,
    ))
}

/// Create layer that adds X-Content-Type-Options header.
pub(crate) fn content_type_options_layer() -> SetResponseHeaderLayer<HeaderValue> {
    SetResponseHeaderLayer::overriding(
        HeaderName::from_static("x-content-type-options"),
        HeaderValue::from_static("nosniff"),
    )
}

/// Create layer that adds X-Frame-Options header.
pub(crate) fn frame_options_layer() -> SetResponseHeaderLayer<HeaderValue> {
    SetResponseHeaderLayer::overriding(
        HeaderName::from_static("x-frame-options"),
        HeaderValue::from_static("DENY"),
    )
}

//! Response header rewriting.
//!
//! # Responsibilities
//! - Point `Location` redirects back at the public host and prefix
//! - Re-scope `Set-Cookie` Path/Domain attributes to the public site
//!
//! # Design Decisions
//! - Both rewrites are best-effort transforms over the header map; absence
//!   or malformed values leave the header untouched
//! - Redirects to third-party hosts are never rewritten
//! - Each `Set-Cookie` value in a response is rewritten independently

use axum::http::{header, HeaderMap, HeaderValue};
use url::Url;

use crate::config::RouteConfig;

/// Host part of an authority, dropping any port.
fn authority_host(authority: &str) -> &str {
    authority.rsplit_once(':').map_or(authority, |(host, port)| {
        if port.bytes().all(|b| b.is_ascii_digit()) {
            host
        } else {
            authority
        }
    })
}

/// Rewrite a `Location` header that targets the upstream so it targets
/// `{public_origin}{prefix}` instead.
///
/// The header value is resolved against the upstream authority, so both
/// absolute and relative redirect targets are handled. Unparseable values
/// and third-party targets are left unmodified.
pub fn rewrite_location(headers: &mut HeaderMap, public_origin: &str, route: &RouteConfig) {
    let Some(location) = headers.get(header::LOCATION).and_then(|v| v.to_str().ok()) else {
        return;
    };
    let Ok(base) = Url::parse(&format!("http://{}/", route.upstream_authority)) else {
        return;
    };
    let Ok(resolved) = base.join(location) else {
        return;
    };

    if resolved.host_str() != Some(authority_host(&route.upstream_authority)) {
        return;
    }

    let mut target = format!(
        "{}{}{}",
        public_origin,
        route.reserved_prefix,
        resolved.path()
    );
    if let Some(query) = resolved.query() {
        target.push('?');
        target.push_str(query);
    }
    if let Some(fragment) = resolved.fragment() {
        target.push('#');
        target.push_str(fragment);
    }

    if let Ok(value) = HeaderValue::from_str(&target) {
        headers.insert(header::LOCATION, value);
    }
}

/// Rewrite one `Set-Cookie` value for the public host and prefix.
///
/// `Path=` values outside the reserved prefix become `{prefix}/`; a
/// `Domain=` equal to the (optionally dot-prefixed) upstream host becomes
/// the public host. Attribute names match case-insensitively.
fn rewrite_cookie(cookie: &str, route: &RouteConfig) -> String {
    let prefix = &route.reserved_prefix;
    let upstream_host = authority_host(&route.upstream_authority);

    cookie
        .split(';')
        .enumerate()
        .map(|(i, segment)| {
            // the first segment is the name=value pair, never an attribute
            if i == 0 {
                return segment.to_string();
            }
            let attr = segment.trim_start();
            let pad = &segment[..segment.len() - attr.len()];
            let Some((name, value)) = attr.split_once('=') else {
                return segment.to_string();
            };
            if name.eq_ignore_ascii_case("path") {
                let keeps_scope =
                    value == prefix || value.starts_with(&format!("{}/", prefix));
                if !keeps_scope {
                    return format!("{}Path={}/", pad, prefix);
                }
            } else if name.eq_ignore_ascii_case("domain") {
                let domain = value.strip_prefix('.').unwrap_or(value);
                if domain.eq_ignore_ascii_case(upstream_host) {
                    return format!("{}Domain={}", pad, route.public_host);
                }
            }
            segment.to_string()
        })
        .collect::<Vec<_>>()
        .join(";")
}

/// Rewrite every `Set-Cookie` header independently. No-op unless cookie
/// rewriting is enabled for the route.
pub fn rewrite_set_cookie(headers: &mut HeaderMap, route: &RouteConfig) {
    if !route.rewrite_cookies {
        return;
    }
    let originals: Vec<HeaderValue> = headers
        .get_all(header::SET_COOKIE)
        .iter()
        .cloned()
        .collect();
    if originals.is_empty() {
        return;
    }

    headers.remove(header::SET_COOKIE);
    for original in originals {
        let rewritten = original
            .to_str()
            .ok()
            .map(|cookie| rewrite_cookie(cookie, route))
            .and_then(|cookie| HeaderValue::from_str(&cookie).ok());
        // non-UTF-8 cookie values pass through untouched
        headers.append(header::SET_COOKIE, rewritten.unwrap_or(original));
    }
}

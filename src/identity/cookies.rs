use std::time::Duration;

use anyhow::anyhow;
use axum::http::{header::COOKIE, HeaderMap, HeaderValue};

pub const ACCESS_COOKIE: &str = "access_token";
pub const REFRESH_COOKIE: &str = "refresh_token";

/// The refresh cookie is scoped to the refresh endpoint so the long-lived
/// token never rides along on unrelated requests.
pub const REFRESH_COOKIE_PATH: &str = "/api/identity/refresh";

/// Build a Set-Cookie value with the hardened attribute set shared by both
/// session cookies.
pub fn build_cookie(
    name: &str,
    value: &str,
    max_age: Duration,
    path: &str,
) -> anyhow::Result<HeaderValue> {
    let cookie = format!(
        "{}={}; Max-Age={}; Path={}; HttpOnly; Secure; SameSite=Strict",
        name,
        value,
        max_age.as_secs(),
        path
    );
    HeaderValue::from_str(&cookie).map_err(|e| anyhow!("invalid cookie value: {}", e))
}

/// Extract a cookie value by name from the Cookie request header.
pub fn get_cookie(headers: &HeaderMap, cookie_name: &str) -> Option<String> {
    headers
        .get(COOKIE)
        .and_then(|v| v.to_str().ok())
        .and_then(|cookies| {
            cookies.split(';').find_map(|cookie| {
                let mut parts = cookie.trim().splitn(2, '=');
                let name = parts.next()?.trim();
                let value = parts.next()?.trim();
                (name == cookie_name).then(|| value.to_string())
            })
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn build_cookie_sets_hardened_attributes() {
        let header = build_cookie(ACCESS_COOKIE, "tok", Duration::from_secs(900), "/")
            .expect("cookie should build");
        let value = header.to_str().unwrap();
        assert!(value.starts_with("access_token=tok;"));
        assert!(value.contains("Max-Age=900"));
        assert!(value.contains("Path=/"));
        assert!(value.contains("HttpOnly"));
        assert!(value.contains("Secure"));
        assert!(value.contains("SameSite=Strict"));
    }

    #[test]
    fn refresh_cookie_is_path_restricted() {
        let header = build_cookie(
            REFRESH_COOKIE,
            "tok",
            Duration::from_secs(604_800),
            REFRESH_COOKIE_PATH,
        )
        .expect("cookie should build");
        let value = header.to_str().unwrap();
        assert!(value.contains("Path=/api/identity/refresh"));
        assert!(value.contains("Max-Age=604800"));
    }

    #[test]
    fn get_cookie_finds_named_cookie_among_many() {
        let mut headers = HeaderMap::new();
        headers.insert(
            COOKIE,
            HeaderValue::from_static("theme=dark; refresh_token=abc.def.ghi; lang=en"),
        );
        assert_eq!(
            get_cookie(&headers, REFRESH_COOKIE).as_deref(),
            Some("abc.def.ghi")
        );
        assert_eq!(get_cookie(&headers, "theme").as_deref(), Some("dark"));
    }

    #[test]
    fn get_cookie_returns_none_when_absent() {
        let headers = HeaderMap::new();
        assert_eq!(get_cookie(&headers, REFRESH_COOKIE), None);

        let mut headers = HeaderMap::new();
        headers.insert(COOKIE, HeaderValue::from_static("theme=dark"));
        assert_eq!(get_cookie(&headers, REFRESH_COOKIE), None);
    }
}

// ABOUTME: Cookie helpers for session and CSRF cookies
// ABOUTME: Reads values from the Cookie header and formats Set-Cookie values

use axum::http::{header, HeaderMap};

/// Get a cookie value by name from the request headers
#[must_use]
pub fn get_cookie_value(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| *key == name)
        .map(|(_, value)| value.to_owned())
}

/// `Set-Cookie` value for the HttpOnly session cookie
#[must_use]
pub fn session_cookie(name: &str, token: &str, max_age_secs: i64, secure: bool) -> String {
    let secure = if secure { "; Secure" } else { "" };
    format!("{name}={token}; HttpOnly{secure}; Path=/; SameSite=Lax; Max-Age={max_age_secs}")
}

/// `Set-Cookie` value for the script-readable CSRF cookie
#[must_use]
pub fn readable_cookie(name: &str, value: &str, max_age_secs: i64, secure: bool) -> String {
    let secure = if secure { "; Secure" } else { "" };
    format!("{name}={value}{secure}; Path=/; SameSite=Lax; Max-Age={max_age_secs}")
}

/// `Set-Cookie` value that deletes a cookie
#[must_use]
pub fn expired_cookie(name: &str) -> String {
    format!("{name}=; HttpOnly; Path=/; SameSite=Lax; Max-Age=0")
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_get_cookie_value() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::COOKIE,
            HeaderValue::from_static("csrftoken=abc; auth_token=xyz"),
        );
        assert_eq!(get_cookie_value(&headers, "auth_token").as_deref(), Some("xyz"));
        assert_eq!(get_cookie_value(&headers, "csrftoken").as_deref(), Some("abc"));
        assert_eq!(get_cookie_value(&headers, "missing"), None);
    }

    #[test]
    fn test_session_cookie_attributes() {
        let cookie = session_cookie("auth_token", "t", 3600, true);
        assert!(cookie.contains("HttpOnly"));
        assert!(cookie.contains("; Secure"));
        assert!(cookie.ends_with("Max-Age=3600"));
        assert!(!readable_cookie("csrftoken", "v", 60, false).contains("HttpOnly"));
    }
}

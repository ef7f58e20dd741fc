use axum::{
    body::Body,
    extract::State,
    http::{HeaderMap, Request, StatusCode, header::ORIGIN},
    middleware::Next,
    response::Response,
};

use crate::{
    errors::HttpError,
    state::{HttpState, TOKEN_HEADER},
};

const LOOPBACK_HOSTS: [&str; 3] = ["127.0.0.1", "localhost", "[::1]"];

/// Guards the `/api` routes: browsers may only call from a loopback page,
/// and every caller must present this process's API token.
pub async fn require_api_token(
    State(state): State<HttpState>,
    req: Request<Body>,
    next: Next,
) -> Result<Response, HttpError> {
    check_origin(req.headers())?;
    let presented = req
        .headers()
        .get(TOKEN_HEADER)
        .and_then(|value| value.to_str().ok());
    if presented != Some(state.api_token.as_str()) {
        return Err(HttpError::new(
            StatusCode::UNAUTHORIZED,
            format!("missing or invalid {TOKEN_HEADER} header"),
            Some("token_invalid".to_string()),
        ));
    }
    Ok(next.run(req).await)
}

fn check_origin(headers: &HeaderMap) -> Result<(), HttpError> {
    let Some(origin) = headers.get(ORIGIN) else {
        return Ok(());
    };
    let rejected = |status, message: &str| {
        HttpError::new(status, message, Some("invalid_origin".to_string()))
    };
    let origin = origin
        .to_str()
        .map_err(|_| rejected(StatusCode::BAD_REQUEST, "invalid Origin header"))?;
    if origin_host(origin).is_some_and(|host| LOOPBACK_HOSTS.contains(&host)) {
        Ok(())
    } else {
        Err(rejected(StatusCode::FORBIDDEN, "origin is not a loopback address"))
    }
}

/// Host part of `scheme://host:port`; the port is required.
fn origin_host(origin: &str) -> Option<&str> {
    let rest = origin
        .strip_prefix("http://")
        .or_else(|| origin.strip_prefix("https://"))?;
    let (host, port) = rest.rsplit_once(':')?;
    port.parse::<u16>().ok()?;
    Some(host)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn origin_host_requires_scheme_and_port() {
        assert_eq!(origin_host("http://localhost:3210"), Some("localhost"));
        assert_eq!(origin_host("https://[::1]:8443"), Some("[::1]"));
        assert_eq!(origin_host("http://127.0.0.1"), None);
        assert_eq!(origin_host("ftp://127.0.0.1:21"), None);
        assert_eq!(origin_host("http://localhost.evil.example:80"), Some("localhost.evil.example"));
    }
}

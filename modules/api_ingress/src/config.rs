use anyhow::{Context, Result};
use axum::http::{HeaderName, HeaderValue, Method};
use runtime::CorsConfig;
use tower_http::cors::{AllowHeaders, AllowMethods, AllowOrigin, Any, CorsLayer};

/// Build the CORS layer from config. Empty lists mean "any".
pub fn cors_layer(cfg: &CorsConfig) -> Result<CorsLayer> {
    let origins = if cfg.allow_origins.is_empty() || cfg.allow_origins.iter().any(|o| o == "*") {
        AllowOrigin::from(Any)
    } else {
        let list = cfg
            .allow_origins
            .iter()
            .map(|o| HeaderValue::from_str(o).with_context(|| format!("invalid CORS origin '{o}'")))
            .collect::<Result<Vec<_>>>()?;
        AllowOrigin::list(list)
    };

    let methods = if cfg.allow_methods.is_empty() {
        AllowMethods::from(Any)
    } else {
        let list = cfg
            .allow_methods
            .iter()
            .map(|m| {
                Method::from_bytes(m.to_ascii_uppercase().as_bytes())
                    .with_context(|| format!("invalid CORS method '{m}'"))
            })
            .collect::<Result<Vec<_>>>()?;
        AllowMethods::list(list)
    };

    let headers = if cfg.allow_headers.is_empty() {
        AllowHeaders::from(Any)
    } else {
        let list = cfg
            .allow_headers
            .iter()
            .map(|h| HeaderName::from_bytes(h.as_bytes()).with_context(|| format!("invalid CORS header '{h}'")))
            .collect::<Result<Vec<_>>>()?;
        AllowHeaders::list(list)
    };

    Ok(CorsLayer::new()
        .allow_origin(origins)
        .allow_methods(methods)
        .allow_headers(headers))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_malformed_entries() {
        let cfg = CorsConfig {
            enabled: true,
            allow_methods: vec!["GE T".into()],
            ..CorsConfig::default()
        };
        assert!(cors_layer(&cfg).is_err());

        let cfg = CorsConfig {
            enabled: true,
            allow_origins: vec!["https://app.example.com".into()],
            allow_methods: vec!["get".into(), "post".into()],
            allow_headers: vec!["content-type".into()],
        };
        assert!(cors_layer(&cfg).is_ok());
    }
}

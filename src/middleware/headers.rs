use axum::http::{header, HeaderValue};
use tower_http::set_header::SetResponseHeaderLayer;

/// Placeholder for the Supabase origin in [`CSP_TEMPLATE`]
const SUPABASE_SOURCE: &str = "{supabase}";

/// Directives of the Content-Security-Policy sent with every response
const CSP_TEMPLATE: &[(&str, &[&str])] = &[
    ("default-src", &["'self'"]),
    ("img-src", &["'self'", "blob:", "data:", SUPABASE_SOURCE]),
    ("script-src", &["'self'", "'unsafe-eval'", "'unsafe-inline'"]),
    ("style-src", &["'self'", "'unsafe-inline'"]),
    ("font-src", &["'self'"]),
    ("connect-src", &["'self'", SUPABASE_SOURCE]),
    ("frame-src", &["'self'"]),
    ("media-src", &["'self'"]),
];

/// Render the policy, substituting the Supabase origin where the template
/// asks for it. Without an origin the placeholder is dropped.
pub fn content_security_policy(supabase_origin: Option<&str>) -> String {
    CSP_TEMPLATE
        .iter()
        .map(|(directive, sources)| {
            let sources: Vec<&str> = sources
                .iter()
                .filter_map(|source| match *source {
                    SUPABASE_SOURCE => supabase_origin,
                    other => Some(other),
                })
                .collect();
            format!("{} {};", directive, sources.join(" "))
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Layer that sets the rendered policy on every response
pub fn csp_layer(
    supabase_origin: Option<&str>,
) -> Result<SetResponseHeaderLayer<HeaderValue>, header::InvalidHeaderValue> {
    let value = HeaderValue::from_str(&content_security_policy(supabase_origin))?;
    Ok(SetResponseHeaderLayer::overriding(header::CONTENT_SECURITY_POLICY, value))
}

//! Default security response headers.
//!
//! The same set a Spring Security resource server writes out of the box:
//! no caching of authenticated responses, no MIME sniffing, no framing,
//! legacy XSS auditor disabled. Set only when a handler did not set them.

use axum::Router;
use axum::http::header::{self, HeaderName, HeaderValue};
use tower_http::set_header::SetResponseHeaderLayer;

fn defaults() -> [(HeaderName, &'static str); 7] {
    [
        (
            header::CACHE_CONTROL,
            "no-cache, no-store, max-age=0, must-revalidate",
        ),
        (header::PRAGMA, "no-cache"),
        (header::EXPIRES, "0"),
        (header::X_CONTENT_TYPE_OPTIONS, "nosniff"),
        (header::X_FRAME_OPTIONS, "DENY"),
        (header::X_XSS_PROTECTION, "0"),
        (header::REFERRER_POLICY, "no-referrer"),
    ]
}

/// Apply the default security headers to all responses, 401s included.
pub fn apply(mut router: Router) -> Router {
    for (name, value) in defaults() {
        router = router.layer(SetResponseHeaderLayer::if_not_present(
            name,
            HeaderValue::from_static(value),
        ));
    }
    router
}

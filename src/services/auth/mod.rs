pub mod bearer;
pub mod claims;
pub mod error;
pub mod factory;
pub mod gate;
pub mod keys;
pub mod rules;
pub mod verifier;

pub use claims::Claims;
pub use error::{AuthError, Reason};
pub use factory::build_request_gate;
pub use gate::{AuthResult, Decision, Denial, RequestGate};
pub use verifier::{JwtVerifier, TokenVerifier, ValidationPolicy};

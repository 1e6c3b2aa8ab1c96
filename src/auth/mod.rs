//! Authentication subsystem for the Cashfree APIs
//!
//! Three cooperating pieces: RSA-OAEP signature generation over a
//! timestamped client identifier, a one-shot bearer-token exchange against
//! the Payout authorize endpoint, and the header-selection policy that
//! picks between static client credentials, a pre-supplied bearer token,
//! and a signature-derived bearer token.

pub mod headers;
pub mod signature;
pub mod token;

pub use headers::build_auth_headers;
pub use signature::{generate_signature, parse_public_key};
pub use token::fetch_bearer_token;

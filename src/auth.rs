//! Auth-domain models: scope sets, session state, token secrets, and login state.

pub mod pkce;
pub mod scope;
pub mod secret;
pub mod session;

pub use pkce::*;
pub use scope::*;
pub use secret::*;
pub use session::*;

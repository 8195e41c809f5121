//! Authentication: Google sign-in, session endpoints, and the two gated
//! pages that run after login (`/post-auth` and `/complete-profile`).

pub mod complete_profile;
pub mod google;
pub mod post_auth;
pub mod session;
pub mod state;

pub(crate) mod storage;
pub(crate) mod utils;

pub use state::{AuthConfig, AuthState};

//! Authentication boundary: the persisted token and the login flows that
//! write it.

mod login;
mod token;

pub use login::{login, signup, Credentials};
pub use token::{AuthError, AuthToken, TokenStore};

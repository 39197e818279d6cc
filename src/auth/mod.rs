pub mod flow;
pub mod store;
pub mod token;

pub use flow::{AuthRequest, obtain_code, random_state};
pub use store::CredentialStore;
pub use token::{OAuthToken, TokenResponse};

//! Credential providers

mod access_token;
mod credential;

pub use access_token::{AccessToken, AppAccessTokenProvider, ACCESS_TOKEN_URL};
pub use credential::{CredentialError, CredentialProvider, StaticCredential, AUTHORIZATION_SCHEME};

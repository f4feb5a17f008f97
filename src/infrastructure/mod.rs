//! 基础设施层：持有凭证这一稀缺资源，只暴露能力

pub mod credential_store;
pub mod loopback;
pub mod oauth;

pub use credential_store::{CredentialStore, FileCredentialStore, StoredToken};
pub use oauth::{ClientSecrets, CredentialProvider, OAuthProvider};

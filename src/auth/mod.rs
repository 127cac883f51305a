pub mod credentials;

pub use credentials::{
    check_password_policy, generate_login_code, hash_secret, verify_secret, CredentialError,
};

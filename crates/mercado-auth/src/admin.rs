//! Static administrator credentials

use std::fmt;
use subtle::ConstantTimeEq;

/// The single administrator name/password pair loaded from configuration
#[derive(Clone)]
pub struct AdminCredentials {
    name: String,
    password: String,
}

impl AdminCredentials {
    pub fn new(name: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            password: password.into(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Exact, case-sensitive match of both values
    ///
    /// Compared as plaintext in constant time; both halves are always
    /// evaluated.
    pub fn matches(&self, name: &str, password: &str) -> bool {
        let name_ok = self.name.as_bytes().ct_eq(name.as_bytes());
        let password_ok = self.password.as_bytes().ct_eq(password.as_bytes());
        (name_ok & password_ok).into()
    }
}

impl fmt::Debug for AdminCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AdminCredentials")
            .field("name", &self.name)
            .field("password", &"<redacted>")
            .finish()
    }
}

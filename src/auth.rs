/// Admin access check.
///
/// The admin panel only needs a yes/no answer for a submitted secret, so the
/// check sits behind a one-method trait that a hashed or token-based scheme
/// can implement later.

pub trait CredentialCheck {
    fn authenticate(&self, secret: &str) -> bool;
}

/// A single shared passphrase compared in plain text.
///
/// With no passphrase configured every attempt is refused.
#[derive(Debug, Clone, Default)]
pub struct StaticPassphrase {
    passphrase: Option<String>,
}

impl StaticPassphrase {
    pub fn new(passphrase: Option<String>) -> Self {
        StaticPassphrase {
            passphrase: passphrase.filter(|p| !p.is_empty()),
        }
    }

    pub fn is_configured(&self) -> bool {
        self.passphrase.is_some()
    }
}

impl CredentialCheck for StaticPassphrase {
    fn authenticate(&self, secret: &str) -> bool {
        self.passphrase.as_deref() == Some(secret)
    }
}

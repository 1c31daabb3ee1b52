//! Delivery of password-reset codes.

use std::fmt::Debug;

/// Hands a freshly issued one-time code to the account owner.
pub trait OtpNotifier: Send + Sync + Debug {
    fn deliver(&self, email: &str, code: &str);
}

/// Writes the code to the log. Used until a mail transport is configured.
#[derive(Debug, Default)]
pub struct LogNotifier;

impl OtpNotifier for LogNotifier {
    fn deliver(&self, email: &str, code: &str) {
        tracing::info!(%email, %code, "password reset code issued");
    }
}

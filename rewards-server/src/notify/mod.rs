//! Outbound SMS and email
//!
//! Services decide when to notify; a `Notifier` only delivers. Delivery
//! failures are logged by the caller and never roll back business state.

mod ses;

pub use ses::SesNotifier;

use async_trait::async_trait;

use crate::error::BoxError;

#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send_sms(&self, to: &str, body: &str) -> Result<(), BoxError>;

    async fn send_email(&self, to: &str, subject: &str, body: &str) -> Result<(), BoxError>;
}

/// Development notifier: writes every message to the log
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn send_sms(&self, to: &str, body: &str) -> Result<(), BoxError> {
        tracing::info!(to = to, body = body, "SMS (log mode)");
        Ok(())
    }

    async fn send_email(&self, to: &str, subject: &str, body: &str) -> Result<(), BoxError> {
        tracing::info!(to = to, subject = subject, body = body, "Email (log mode)");
        Ok(())
    }
}

// ── Message templates ──

pub fn otp_sms(code: &str) -> String {
    format!("Your rewards login code is {code}. It expires in 5 minutes.")
}

pub fn invitation_sms(restaurant_name: &str, token: &str) -> String {
    format!(
        "{restaurant_name} invites you to their rewards programme. \
         Sign in with your phone and use invitation code {token} to join."
    )
}

pub fn password_reset_email(code: &str) -> (String, String) {
    (
        "Reset your password".to_string(),
        format!("Your password reset code is: {code}\nValid for 5 minutes."),
    )
}

pub fn voucher_issued_sms(restaurant_name: &str, voucher_name: &str, code: &str) -> String {
    format!("{restaurant_name}: your voucher \"{voucher_name}\" is ready. Voucher code {code}.")
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use std::sync::Mutex;

    /// Records messages instead of sending them
    #[derive(Default)]
    pub struct RecordingNotifier {
        pub sms: Mutex<Vec<(String, String)>>,
        pub emails: Mutex<Vec<(String, String)>>,
    }

    #[async_trait]
    impl Notifier for RecordingNotifier {
        async fn send_sms(&self, to: &str, body: &str) -> Result<(), BoxError> {
            if let Ok(mut sms) = self.sms.lock() {
                sms.push((to.to_string(), body.to_string()));
            }
            Ok(())
        }

        async fn send_email(&self, to: &str, subject: &str, _body: &str) -> Result<(), BoxError> {
            if let Ok(mut emails) = self.emails.lock() {
                emails.push((to.to_string(), subject.to_string()));
            }
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::testing::RecordingNotifier;
    use super::*;

    #[tokio::test]
    async fn test_notifier_trait_object() {
        let recorder = std::sync::Arc::new(RecordingNotifier::default());
        let notifier: std::sync::Arc<dyn Notifier> = recorder.clone();
        notifier.send_sms("+27820000000", &otp_sms("123456")).await.unwrap();
        notifier
            .send_email("owner@bistro.co.za", "Hello", "Body")
            .await
            .unwrap();

        let sms = recorder.sms.lock().unwrap();
        assert_eq!(sms.len(), 1);
        assert!(sms[0].1.contains("123456"));
        assert_eq!(recorder.emails.lock().unwrap()[0].1, "Hello");
    }

    #[tokio::test]
    async fn test_log_notifier_never_fails() {
        assert!(LogNotifier.send_sms("+27820000000", "hi").await.is_ok());
        assert!(LogNotifier.send_email("a@b.co", "s", "b").await.is_ok());
    }

    #[test]
    fn test_templates() {
        assert!(invitation_sms("Bistro", "tok").contains("Bistro"));
        let (subject, body) = password_reset_email("654321");
        assert_eq!(subject, "Reset your password");
        assert!(body.contains("654321"));
        assert!(voucher_issued_sms("Bistro", "Free coffee", "ABCD-EFGH").contains("ABCD-EFGH"));
    }
}

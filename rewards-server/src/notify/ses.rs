//! AWS SES email delivery

use async_trait::async_trait;
use aws_sdk_sesv2::Client as SesClient;
use aws_sdk_sesv2::types::{Body, Content, Destination, EmailContent, Message};

use super::Notifier;
use crate::error::BoxError;

pub struct SesNotifier {
    ses: SesClient,
    from: String,
}

impl SesNotifier {
    pub async fn from_env(from: String) -> Self {
        let aws_config = aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await;
        let ses = if let Ok(ses_region) = std::env::var("SES_REGION") {
            let ses_config = aws_config
                .to_builder()
                .region(aws_config::Region::new(ses_region))
                .build();
            SesClient::new(&ses_config)
        } else {
            SesClient::new(&aws_config)
        };
        Self { ses, from }
    }
}

#[async_trait]
impl Notifier for SesNotifier {
    async fn send_sms(&self, to: &str, body: &str) -> Result<(), BoxError> {
        // No SMS gateway behind SES; keep the message visible to operators
        tracing::warn!(to = to, body = body, "SMS delivery not configured, message logged");
        Ok(())
    }

    async fn send_email(&self, to: &str, subject: &str, body: &str) -> Result<(), BoxError> {
        let subject = Content::builder().data(subject).build()?;
        let body = Body::builder()
            .text(Content::builder().data(body).build()?)
            .build();
        let message = Message::builder().subject(subject).body(body).build();

        self.ses
            .send_email()
            .from_email_address(&self.from)
            .destination(Destination::builder().to_addresses(to).build())
            .content(EmailContent::builder().simple(message).build())
            .send()
            .await?;

        tracing::info!(to = to, "Email sent");
        Ok(())
    }
}

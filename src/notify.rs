//! Admin notification mail for new registrations.

use lettre::{
    message::{Mailbox, MultiPart},
    transport::smtp::authentication::Credentials,
    Address, AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
};

use crate::config::SmtpConfig;
use crate::error::{AppError, Result};
use crate::models::Registration;

/// Display name on every outgoing notification
const SENDER_NAME: &str = "DPL Registration";

/// A rendered message ready for delivery
#[derive(Debug, Clone, PartialEq)]
pub struct OutgoingMail {
    pub to: String,
    pub subject: String,
    pub text: String,
    pub html: String,
}

/// Mail transport seam
#[async_trait::async_trait]
pub trait Mailer: Send + Sync {
    /// Hand one message to the transport
    async fn send(&self, mail: &OutgoingMail) -> Result<()>;
}

/// SMTP delivery through lettre
pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    sender: Mailbox,
}

impl SmtpMailer {
    pub fn from_config(smtp: &SmtpConfig) -> Result<Self> {
        let builder = if smtp.implicit_tls() {
            AsyncSmtpTransport::<Tokio1Executor>::relay(&smtp.host)
        } else {
            AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&smtp.host)
        }
        .map_err(|e| AppError::MailDelivery(e.to_string()))?;

        let transport = builder
            .port(smtp.port)
            .credentials(Credentials::new(smtp.mail.clone(), smtp.password.clone()))
            .build();

        let address: Address = smtp
            .mail
            .parse()
            .map_err(|e| AppError::MailDelivery(format!("invalid SMTP_MAIL: {}", e)))?;

        tracing::info!(
            "SMTP transport configured for {}:{} ({})",
            smtp.host,
            smtp.port,
            if smtp.implicit_tls() { "tls" } else { "starttls" }
        );

        Ok(Self {
            transport,
            sender: Mailbox::new(Some(SENDER_NAME.to_string()), address),
        })
    }
}

#[async_trait::async_trait]
impl Mailer for SmtpMailer {
    async fn send(&self, mail: &OutgoingMail) -> Result<()> {
        let to: Mailbox = mail
            .to
            .parse()
            .map_err(|e| AppError::MailDelivery(format!("invalid recipient: {}", e)))?;

        let message = Message::builder()
            .from(self.sender.clone())
            .to(to)
            .subject(mail.subject.as_str())
            .multipart(MultiPart::alternative_plain_html(
                mail.text.clone(),
                mail.html.clone(),
            ))
            .map_err(|e| AppError::MailDelivery(e.to_string()))?;

        self.transport
            .send(message)
            .await
            .map_err(|e| AppError::MailDelivery(e.to_string()))?;

        Ok(())
    }
}

/// Stand-in used when no SMTP host is configured; every send fails
pub struct DisabledMailer;

#[async_trait::async_trait]
impl Mailer for DisabledMailer {
    async fn send(&self, _mail: &OutgoingMail) -> Result<()> {
        Err(AppError::MailDelivery(
            "SMTP transport is not configured".to_string(),
        ))
    }
}

/// Render the admin notification for a stored registration
pub fn registration_mail(admin: &str, registration: &Registration) -> OutgoingMail {
    let rows = registration_rows(registration);

    let text = rows
        .iter()
        .map(|(label, value)| format!("{}: {}", label, value))
        .collect::<Vec<_>>()
        .join("\n");

    let html_rows: String = rows
        .iter()
        .map(|(label, value)| {
            format!(
                "<p><strong>{}:</strong> {}</p>",
                label,
                escape_html(value)
            )
        })
        .collect();

    OutgoingMail {
        to: admin.to_string(),
        subject: format!("New Registration from {}", registration.full_name),
        text: format!("New registration received.\n\n{}\n", text),
        html: format!("<h2>New Registration</h2>{}", html_rows),
    }
}

fn registration_rows(r: &Registration) -> Vec<(&'static str, String)> {
    let mut rows = vec![
        ("Form No", r.form_no.clone()),
        ("Full Name", r.full_name.clone()),
        ("Email", r.email.clone()),
        ("Address", r.address.clone()),
        ("Mobile", r.mobile.clone()),
        ("Date of Birth", r.dob.clone()),
        ("Height", format!("{} cm", r.height)),
        ("Weight", format!("{} kg", r.weight)),
        ("Category", r.category.to_string()),
    ];
    if let Some(hand) = r.hand {
        rows.push(("Batting Hand", hand.to_string()));
    }
    if let Some(bowler_type) = r.bowler_type {
        rows.push(("Bowler Type", bowler_type.to_string()));
    }
    if let Some(arm) = r.arm_category {
        rows.push(("Bowling Arm", arm.to_string()));
    }
    rows.push(("Field Category", r.field_category.to_string()));
    rows
}

fn escape_html(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Notify the admin about a new registration
pub async fn notify(
    mailer: &dyn Mailer,
    admin: Option<&str>,
    registration: &Registration,
) -> Result<()> {
    let admin = admin.ok_or(AppError::MailNotConfigured)?;

    mailer.send(&registration_mail(admin, registration)).await?;

    tracing::info!("Registration notification sent for {}", registration.id);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    struct RecordingMailer {
        sent: Mutex<Vec<OutgoingMail>>,
    }

    #[async_trait::async_trait]
    impl Mailer for RecordingMailer {
        async fn send(&self, mail: &OutgoingMail) -> Result<()> {
            self.sent.lock().unwrap().push(mail.clone());
            Ok(())
        }
    }

    fn registration() -> Registration {
        Registration {
            id: "r1".to_string(),
            form_no: "DPL-001".to_string(),
            full_name: "Asha <Rao>".to_string(),
            email: "asha@example.com".to_string(),
            address: "12 Park Street".to_string(),
            mobile: "9876543210".to_string(),
            dob: "2001-04-09".to_string(),
            height: 168.0,
            weight: 61.0,
            category: "Bowler",
            hand: None,
            bowler_type: Some("Spin"),
            arm_category: Some("Left"),
            field_category: "General",
            created_at: "2026-01-01T00:00:00+00:00".to_string(),
        }
    }

    #[test]
    fn test_registration_mail_contents() {
        let mail = registration_mail("admin@example.com", &registration());

        assert_eq!(mail.to, "admin@example.com");
        assert_eq!(mail.subject, "New Registration from Asha <Rao>");
        assert!(mail.text.contains("Bowler Type: Spin"));
        assert!(mail.text.contains("Bowling Arm: Left"));
        assert!(!mail.text.contains("Batting Hand"));
        assert!(mail.html.contains("Asha &lt;Rao&gt;"));
        assert!(!mail.html.contains("<Rao>"));
    }

    #[tokio::test]
    async fn test_notify_without_admin_is_not_configured() {
        let mailer = RecordingMailer {
            sent: Mutex::new(Vec::new()),
        };

        let err = notify(&mailer, None, &registration()).await.unwrap_err();

        assert!(matches!(err, AppError::MailNotConfigured));
        assert!(mailer.sent.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_notify_sends_one_mail() {
        let mailer = RecordingMailer {
            sent: Mutex::new(Vec::new()),
        };

        notify(&mailer, Some("admin@example.com"), &registration())
            .await
            .unwrap();

        assert_eq!(mailer.sent.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_disabled_mailer_reports_delivery_failure() {
        let err = notify(&DisabledMailer, Some("admin@example.com"), &registration())
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::MailDelivery(_)));
    }
}

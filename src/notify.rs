//! Outbound email. Every send is fire-and-forget: the state change that
//! triggered it has already committed, so delivery failures are logged and
//! never surfaced to the caller.

use std::sync::Arc;

use lettre::message::header::ContentType;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use tracing::warn;

use crate::config::Config;
use crate::model::leave_request::{LeaveStatus, LeaveType};

pub struct Mailer {
    from: String,
    frontend_url: String,
    /// None when SMTP is not configured; sends become logged no-ops.
    transport: Option<AsyncSmtpTransport<Tokio1Executor>>,
}

impl Mailer {
    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        let transport = match (&config.smtp_host, &config.smtp_user, &config.smtp_pass) {
            (Some(host), Some(user), Some(pass)) => {
                let creds = Credentials::new(user.clone(), pass.clone());
                Some(
                    AsyncSmtpTransport::<Tokio1Executor>::relay(host)?
                        .credentials(creds)
                        .build(),
                )
            }
            _ => None,
        };

        Ok(Self {
            from: config.mail_from.clone(),
            frontend_url: config.frontend_url.clone(),
            transport,
        })
    }

    pub async fn send(&self, to: &str, subject: &str, html: &str) -> anyhow::Result<()> {
        let Some(transport) = &self.transport else {
            tracing::debug!(to, subject, "SMTP not configured, dropping notification");
            return Ok(());
        };

        let email = Message::builder()
            .from(self.from.parse()?)
            .to(to.parse()?)
            .subject(subject)
            .header(ContentType::TEXT_HTML)
            .body(html.to_string())?;

        transport.send(email).await?;
        Ok(())
    }

    fn dashboard_link(&self) -> String {
        format!(
            r#"<p><a href="{url}">Open the dashboard</a></p>"#,
            url = self.frontend_url
        )
    }

    pub fn leave_request_email(
        &self,
        employee_name: &str,
        employee_code: &str,
        leave_type: LeaveType,
        start: chrono::NaiveDate,
        end: chrono::NaiveDate,
        reason: &str,
    ) -> (String, String) {
        let subject = format!("Leave request from {employee_name}");
        let html = format!(
            "<h2>New Leave Request</h2>\
             <p><strong>Employee:</strong> {employee_name} ({employee_code})</p>\
             <p><strong>Leave type:</strong> {leave_type}</p>\
             <p><strong>From:</strong> {start} <strong>to:</strong> {end}</p>\
             <p><strong>Reason:</strong> {reason}</p>\
             <p>Please review and respond to this request.</p>{link}",
            link = self.dashboard_link()
        );
        (subject, html)
    }

    pub fn leave_response_email(
        &self,
        employee_name: &str,
        status: LeaveStatus,
        leave_type: LeaveType,
        start: chrono::NaiveDate,
        end: chrono::NaiveDate,
        admin_response: &str,
    ) -> (String, String) {
        let subject = format!("Leave request {status}");
        let note = if admin_response.is_empty() {
            String::new()
        } else {
            format!("<p><strong>Admin response:</strong> {admin_response}</p>")
        };
        let html = format!(
            "<h2>Leave Request {status}</h2>\
             <p>Dear {employee_name},</p>\
             <p>Your {leave_type} leave from {start} to {end} has been \
             <strong>{status}</strong>.</p>{note}{link}",
            link = self.dashboard_link()
        );
        (subject, html)
    }

    pub fn welcome_email(
        &self,
        name: &str,
        email: &str,
        employee_code: &str,
        designation: &str,
    ) -> (String, String) {
        let subject = "Your employee account has been created".to_string();
        let html = format!(
            "<h2>Welcome!</h2>\
             <p>Dear {name},</p>\
             <p>Your employee account has been created. You can sign in with:</p>\
             <p><strong>Email:</strong> {email}<br>\
             <strong>Employee ID:</strong> {employee_code}<br>\
             <strong>Designation:</strong> {designation}</p>\
             <p><strong>Note:</strong> please change your password after the first login.</p>{link}",
            link = self.dashboard_link()
        );
        (subject, html)
    }

    pub fn profile_update_email(&self, name: &str) -> (String, String) {
        let subject = "Your employee profile has been updated".to_string();
        let html = format!(
            "<h2>Profile Updated</h2>\
             <p>Dear {name},</p>\
             <p>Your employee profile has been updated by the administrator. \
             Please review your information.</p>{link}",
            link = self.dashboard_link()
        );
        (subject, html)
    }
}

/// Detaches the send from the request that triggered it.
pub fn spawn_send(mailer: Arc<Mailer>, to: String, subject: String, html: String) {
    actix_web::rt::spawn(async move {
        if let Err(e) = mailer.send(&to, &subject, &html).await {
            warn!(error = %e, to = %to, "Notification delivery failed");
        }
    });
}

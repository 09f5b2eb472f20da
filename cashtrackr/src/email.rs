//! Email service for account confirmation and password reset mail.

use lettre::{
    message::{header::ContentType, Mailbox},
    transport::smtp::authentication::Credentials,
    AsyncFileTransport, AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
};
use std::path::Path;

use crate::{
    config::{Config, EmailTransportConfig},
    errors::Error,
};

pub struct EmailService {
    transport: EmailTransport,
    from_email: String,
    from_name: String,
    frontend_url: String,
}

enum EmailTransport {
    Smtp(AsyncSmtpTransport<Tokio1Executor>),
    File(AsyncFileTransport<Tokio1Executor>),
}

impl EmailService {
    pub fn new(config: &Config) -> Result<Self, Error> {
        let email_config = &config.email;

        let transport = match &email_config.transport {
            EmailTransportConfig::Smtp {
                host,
                port,
                username,
                password,
                use_tls,
            } => {
                if !use_tls {
                    tracing::warn!("SMTP TLS is disabled - this is not recommended for production");
                }

                let smtp_builder = if *use_tls {
                    AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(host)
                } else {
                    Ok(AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(host))
                }
                .map_err(|e| Error::Internal {
                    operation: format!("create SMTP transport: {e}"),
                })?
                .port(*port)
                .credentials(Credentials::new(username.clone(), password.clone()));

                EmailTransport::Smtp(smtp_builder.build())
            }
            EmailTransportConfig::File { path } => {
                // File transport for development/testing
                let emails_dir = Path::new(path);
                if !emails_dir.exists() {
                    std::fs::create_dir_all(emails_dir).map_err(|e| Error::Internal {
                        operation: format!("create emails directory: {e}"),
                    })?;
                }
                EmailTransport::File(AsyncFileTransport::<Tokio1Executor>::new(emails_dir))
            }
        };

        Ok(Self {
            transport,
            from_email: email_config.from_email.clone(),
            from_name: email_config.from_name.clone(),
            frontend_url: config.frontend_url.as_str().trim_end_matches('/').to_string(),
        })
    }

    /// Send the account-confirmation mail carrying the 6-digit code
    pub async fn send_confirmation_email(&self, to_email: &str, to_name: &str, token: &str) -> Result<(), Error> {
        let subject = "CashTrackr - Confirma tu cuenta";
        let body = self.create_confirmation_body(to_name, token);
        self.send_email(to_email, to_name, subject, &body).await
    }

    /// Send the password-reset mail carrying the 6-digit code
    pub async fn send_password_reset_email(&self, to_email: &str, to_name: &str, token: &str) -> Result<(), Error> {
        let subject = "CashTrackr - Reestablece tu password";
        let body = self.create_password_reset_body(to_name, token);
        self.send_email(to_email, to_name, subject, &body).await
    }

    async fn send_email(&self, to_email: &str, to_name: &str, subject: &str, body: &str) -> Result<(), Error> {
        let from = format!("{} <{}>", self.from_name, self.from_email)
            .parse::<Mailbox>()
            .map_err(|e| Error::Internal {
                operation: format!("parse from email: {e}"),
            })?;

        let to = format!("{to_name} <{to_email}>").parse::<Mailbox>().map_err(|e| Error::Internal {
            operation: format!("parse to email: {e}"),
        })?;

        let message = Message::builder()
            .from(from)
            .to(to)
            .subject(subject)
            .header(ContentType::TEXT_HTML)
            .body(body.to_string())
            .map_err(|e| Error::Internal {
                operation: format!("build email message: {e}"),
            })?;

        match &self.transport {
            EmailTransport::Smtp(smtp) => {
                smtp.send(message).await.map_err(|e| Error::Internal {
                    operation: format!("send SMTP email: {e}"),
                })?;
            }
            EmailTransport::File(file) => {
                file.send(message).await.map_err(|e| Error::Internal {
                    operation: format!("send file email: {e}"),
                })?;
            }
        }

        Ok(())
    }

    fn create_confirmation_body(&self, to_name: &str, token: &str) -> String {
        let link = format!("{}/auth/confirm-account", self.frontend_url);
        format!(
            r#"<p>Hola: {to_name}, has creado tu cuenta en CashTrackr, ya casi esta lista</p>
<p>Visita el siguiente enlace:</p>
<a href="{link}">Confirmar cuenta</a>
<p>e ingresa el codigo: <b>{token}</b></p>"#
        )
    }

    fn create_password_reset_body(&self, to_name: &str, token: &str) -> String {
        let link = format!("{}/auth/new-password", self.frontend_url);
        format!(
            r#"<p>Hola: {to_name}, has solicitado reestablecer tu password</p>
<p>Visita el siguiente enlace:</p>
<a href="{link}">Reestablecer password</a>
<p>e ingresa el codigo: <b>{token}</b></p>"#
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::create_test_config;

    #[tokio::test]
    async fn test_email_service_creation() {
        let config = create_test_config();
        assert!(EmailService::new(&config).is_ok());
    }

    #[test]
    fn test_confirmation_body_carries_token_and_link() {
        let config = create_test_config();
        let service = EmailService::new(&config).unwrap();

        let body = service.create_confirmation_body("Juan", "123456");
        assert!(body.contains("Hola: Juan"));
        assert!(body.contains("<b>123456</b>"));
        assert!(body.contains("/auth/confirm-account"));
    }

    #[test]
    fn test_password_reset_body_carries_token_and_link() {
        let config = create_test_config();
        let service = EmailService::new(&config).unwrap();

        let body = service.create_password_reset_body("Juan", "654321");
        assert!(body.contains("Hola: Juan"));
        assert!(body.contains("<b>654321</b>"));
        assert!(body.contains("/auth/new-password"));
    }

    #[tokio::test]
    async fn test_file_transport_delivery() {
        let config = create_test_config();
        let service = EmailService::new(&config).unwrap();

        service
            .send_confirmation_email("test@test.com", "Juan", "123456")
            .await
            .expect("file transport delivery should succeed");
    }
}

// src/utils/email.rs

use crate::domain::otp_type::OtpType;
use crate::error::{AppError, AppResult};
use lettre::{
    message::{Mailbox, MultiPart},
    transport::smtp::authentication::Credentials,
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
};
use std::env;
use thiserror::Error;
use tracing::{error, info};
use validator::ValidateEmail;

/// メール送信エラー
#[derive(Error, Debug)]
pub enum EmailError {
    #[error("SMTP configuration error: {0}")]
    ConfigurationError(String),

    #[error("Failed to send email: {0}")]
    SendError(String),

    #[error("Invalid email address: {0}")]
    InvalidAddress(String),

    #[error("Missing email configuration")]
    MissingConfiguration,
}

/// メール設定
#[derive(Debug, Clone)]
pub struct EmailConfig {
    pub smtp_host: String,
    pub smtp_port: u16,
    pub smtp_username: String,
    pub smtp_password: String,
    pub from_email: String,
    pub from_name: String,
    pub use_tls: bool,
    /// 開発モードかどうか（ログ出力のみ）
    pub development_mode: bool,
}

impl Default for EmailConfig {
    fn default() -> Self {
        Self {
            smtp_host: "localhost".to_string(),
            smtp_port: 587,
            smtp_username: String::new(),
            smtp_password: String::new(),
            from_email: "noreply@artci.ci".to_string(),
            from_name: "ARTCI DCP".to_string(),
            use_tls: true,
            development_mode: true,
        }
    }
}

impl EmailConfig {
    /// 環境変数から設定を読み込み
    pub fn from_env() -> Result<Self, EmailError> {
        let development_mode = env::var("EMAIL_DEVELOPMENT_MODE")
            .unwrap_or_else(|_| "true".to_string())
            .parse()
            .unwrap_or(true);

        if development_mode {
            return Ok(Self::default());
        }

        let smtp_host = env::var("SMTP_HOST").map_err(|_| EmailError::MissingConfiguration)?;

        let smtp_port = env::var("SMTP_PORT")
            .unwrap_or_else(|_| "587".to_string())
            .parse()
            .map_err(|_| EmailError::ConfigurationError("Invalid SMTP port".to_string()))?;

        let smtp_username = env::var("SMTP_USERNAME").unwrap_or_default();
        let smtp_password = env::var("SMTP_PASSWORD").unwrap_or_default();

        let from_email = env::var("FROM_EMAIL").map_err(|_| EmailError::MissingConfiguration)?;
        let from_name = env::var("FROM_NAME").unwrap_or_else(|_| "ARTCI DCP".to_string());

        let use_tls = env::var("SMTP_USE_TLS")
            .unwrap_or_else(|_| "true".to_string())
            .parse()
            .unwrap_or(true);

        Ok(Self {
            smtp_host,
            smtp_port,
            smtp_username,
            smtp_password,
            from_email,
            from_name,
            use_tls,
            development_mode: false,
        })
    }

    pub fn validate(&self) -> Result<(), EmailError> {
        if self.development_mode {
            return Ok(());
        }

        if self.smtp_host.is_empty() {
            return Err(EmailError::ConfigurationError(
                "SMTP host is required".to_string(),
            ));
        }

        if !self.from_email.validate_email() {
            return Err(EmailError::InvalidAddress(self.from_email.clone()));
        }

        Ok(())
    }
}

/// メール送信内容
#[derive(Debug, Clone)]
pub struct EmailMessage {
    pub to_email: String,
    pub subject: String,
    pub html_body: String,
    pub text_body: String,
}

/// メール送信サービス
pub struct EmailService {
    config: EmailConfig,
    transport: Option<AsyncSmtpTransport<Tokio1Executor>>,
    otp_expiration_minutes: i64,
}

impl EmailService {
    pub fn new(config: EmailConfig, otp_expiration_minutes: i64) -> Result<Self, EmailError> {
        config.validate()?;

        let transport = if config.development_mode {
            None
        } else {
            Some(build_transport(&config)?)
        };

        Ok(Self {
            config,
            transport,
            otp_expiration_minutes,
        })
    }

    pub fn from_env(otp_expiration_minutes: i64) -> Result<Self, EmailError> {
        Self::new(EmailConfig::from_env()?, otp_expiration_minutes)
    }

    pub async fn send_email(&self, message: EmailMessage) -> AppResult<()> {
        if !message.to_email.validate_email() {
            return Err(AppError::ValidationError(format!(
                "Adresse email invalide : {}",
                message.to_email
            )));
        }

        let Some(transport) = &self.transport else {
            self.log_email(&message);
            return Ok(());
        };

        let from = Mailbox::new(
            Some(self.config.from_name.clone()),
            self.config
                .from_email
                .parse()
                .map_err(|e| AppError::InternalServerError(format!("Invalid sender: {}", e)))?,
        );
        let to: Mailbox = message
            .to_email
            .parse()
            .map_err(|_| AppError::ValidationError("Adresse email invalide".to_string()))?;

        let email = Message::builder()
            .from(from)
            .to(to)
            .subject(message.subject.clone())
            .multipart(MultiPart::alternative_plain_html(
                message.text_body,
                message.html_body,
            ))
            .map_err(|e| AppError::InternalServerError(format!("Email build failed: {}", e)))?;

        transport.send(email).await.map_err(|e| {
            error!(to_email = %mask_email(&message.to_email), error = %e, "SMTP send failed");
            AppError::ExternalServiceError(format!("Échec de l'envoi de l'email : {}", e))
        })?;

        info!(
            to_email = %mask_email(&message.to_email),
            subject = %message.subject,
            "Email sent successfully"
        );

        Ok(())
    }

    /// OTP コードをメール送信
    pub async fn send_otp_email(&self, to_email: &str, code: &str, otp_type: OtpType) -> AppResult<()> {
        let subject = match otp_type {
            OtpType::Inscription => "ARTCI DCP - Code de vérification de votre compte",
            OtpType::Connexion => "ARTCI DCP - Code de connexion sécurisée",
            OtpType::ResetPassword => "ARTCI DCP - Code de réinitialisation du mot de passe",
        };

        let text_body = format!(
            "Bonjour,\n\n\
             Votre code de vérification ARTCI DCP est :\n\n    {code}\n\n\
             Ce code expire dans {minutes} minutes.\n\n\
             Si vous n'avez pas demandé ce code, veuillez ignorer cet email.\n\n\
             Cordialement,\n\
             L'équipe ARTCI - Protection des Données Personnelles\n",
            code = code,
            minutes = self.otp_expiration_minutes,
        );

        let html_body = format!(
            r#"<!DOCTYPE html>
<html lang="fr">
<body style="font-family: Arial, sans-serif; color: #333;">
  <p>Bonjour,</p>
  <p>Votre code de vérification ARTCI DCP est :</p>
  <p style="font-size: 28px; font-weight: bold; letter-spacing: 6px;">{code}</p>
  <p>Ce code expire dans {minutes} minutes.</p>
  <p style="color: #888;">Si vous n'avez pas demandé ce code, veuillez ignorer cet email.</p>
  <p>Cordialement,<br>L'équipe ARTCI - Protection des Données Personnelles</p>
</body>
</html>"#,
            code = code,
            minutes = self.otp_expiration_minutes,
        );

        self.send_email(EmailMessage {
            to_email: to_email.to_string(),
            subject: subject.to_string(),
            html_body,
            text_body,
        })
        .await
    }

    fn log_email(&self, message: &EmailMessage) {
        info!(
            to_email = %message.to_email,
            subject = %message.subject,
            "Email (development mode, not sent)"
        );
        info!("{}", message.text_body);
    }
}

fn build_transport(config: &EmailConfig) -> Result<AsyncSmtpTransport<Tokio1Executor>, EmailError> {
    let builder = if config.use_tls {
        AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.smtp_host)
            .map_err(|e| EmailError::ConfigurationError(e.to_string()))?
    } else {
        AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(&config.smtp_host)
    };

    let builder = builder.port(config.smtp_port);
    let builder = if config.smtp_username.is_empty() {
        builder
    } else {
        builder.credentials(Credentials::new(
            config.smtp_username.clone(),
            config.smtp_password.clone(),
        ))
    };

    Ok(builder.build())
}

/// ログ出力用にメールアドレスを伏せる
pub fn mask_email(email: &str) -> String {
    match email.split_once('@') {
        Some((local, domain)) => {
            let visible: String = local.chars().take(2).collect();
            format!("{}***@{}", visible, domain)
        }
        None => "***".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mask_email() {
        assert_eq!(mask_email("contact@societe.ci"), "co***@societe.ci");
        assert_eq!(mask_email("a@b.ci"), "a***@b.ci");
        assert_eq!(mask_email("invalide"), "***");
    }

    #[test]
    fn test_production_config_requires_valid_sender() {
        let config = EmailConfig {
            development_mode: false,
            from_email: "pas-un-email".to_string(),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[tokio::test]
    async fn test_email_service_development_mode() {
        let service = EmailService::new(EmailConfig::default(), 10).unwrap();

        assert!(service
            .send_otp_email("contact@societe.ci", "123456", OtpType::Inscription)
            .await
            .is_ok());

        let invalid = service
            .send_otp_email("invalide", "123456", OtpType::ResetPassword)
            .await;
        assert!(matches!(invalid, Err(AppError::ValidationError(_))));
    }
}

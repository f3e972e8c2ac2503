//! services/email_service.rs
//! Envío de avisos por correo (SMTP) cuando hay configuración disponible.

use anyhow::{Context, Result};
use lettre::{
    message::{header::ContentType, Mailbox, SinglePart},
    transport::smtp::{
        authentication::Credentials,
        client::{Tls, TlsParameters},
    },
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
};

use crate::config::app_config::SmtpConfig;

const SMTP_TIMEOUT: std::time::Duration = std::time::Duration::from_secs(30);

#[derive(Debug, Clone)]
pub struct EmailService {
    config: SmtpConfig,
}

impl EmailService {
    pub fn new(config: SmtpConfig) -> Self {
        Self { config }
    }

    pub fn tiene_destinatarios(&self) -> bool {
        !self.config.notify_to.is_empty()
    }

    /// Envía el mismo aviso a cada destinatario configurado.
    pub async fn enviar_aviso(&self, asunto: &str, cuerpo: &str) -> Result<()> {
        let from: Mailbox = format!("Inventario <{}>", self.config.user)
            .parse()
            .context("Dirección de remitente inválida")?;

        let tls_params = TlsParameters::new(self.config.host.clone())?;
        let mailer = AsyncSmtpTransport::<Tokio1Executor>::relay(&self.config.host)?
            .port(self.config.port)
            .credentials(Credentials::new(
                self.config.user.clone(),
                self.config.pass.clone(),
            ))
            .tls(Tls::Required(tls_params))
            .build();

        let html = cuerpo_html(asunto, cuerpo);

        for destinatario in &self.config.notify_to {
            let to: Mailbox = destinatario
                .parse()
                .with_context(|| format!("Destinatario inválido: {}", destinatario))?;
            let message = Message::builder()
                .from(from.clone())
                .to(to)
                .subject(asunto)
                .singlepart(
                    SinglePart::builder()
                        .header(ContentType::TEXT_HTML)
                        .body(html.clone()),
                )?;

            tokio::time::timeout(SMTP_TIMEOUT, mailer.send(message))
                .await
                .context("Timeout enviando correo")??;
        }

        log::info!(
            "Aviso '{}' enviado a {} destinatarios",
            asunto,
            self.config.notify_to.len()
        );
        Ok(())
    }
}

fn escapar_html(texto: &str) -> String {
    texto
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

fn cuerpo_html(asunto: &str, cuerpo: &str) -> String {
    format!(
        "<h2>{}</h2><p>{}</p>",
        escapar_html(asunto),
        escapar_html(cuerpo).replace('\n', "<br>")
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escapa_contenido_del_aviso() {
        let html = cuerpo_html("Préstamo <vencido>", "línea 1\nA & B");
        assert_eq!(
            html,
            "<h2>Préstamo &lt;vencido&gt;</h2><p>línea 1<br>A &amp; B</p>"
        );
    }
}

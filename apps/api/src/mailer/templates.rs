//! HTML bodies for transactional emails.

use crate::mailer::OutgoingEmail;
use crate::models::account::Account;
use crate::models::jd::Jd;

/// Minimal HTML escaping for values interpolated into templates.
fn escape(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

fn layout(title: &str, body: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="es">
  <body style="font-family: Arial, sans-serif; color: #1b1b1b;">
    <h2 style="color: #01a28b;">{title}</h2>
    {body}
    <p style="font-size: 12px; color: #6b6b6b;">LinkIT &middot; Talento tech para Latinoamérica</p>
  </body>
</html>"#
    )
}

/// Confirmation sent to a registered candidate after applying to a JD.
pub fn postulation_confirmation(user: &Account, jd: &Jd) -> OutgoingEmail {
    let name = escape(&user.name);
    let body = format!(
        "<p>Hola {name},</p>\
         <p>Recibimos tu postulación para <strong>{title}</strong> (código {code}).</p>\
         <p>Nuestro equipo revisará tu perfil y te contactará si avanzas en el proceso.</p>",
        title = escape(&jd.title),
        code = escape(&jd.code),
    );
    OutgoingEmail {
        to_email: user.email.clone(),
        to_name: user.name.clone(),
        subject: format!("Postulación recibida: {}", jd.title),
        html: layout("¡Gracias por postularte!", &body),
    }
}

pub fn user_welcome(user: &Account) -> OutgoingEmail {
    let body = format!(
        "<p>Hola {},</p>\
         <p>Tu cuenta fue verificada. Ya puedes postularte a nuestras ofertas laborales.</p>",
        escape(&user.name)
    );
    OutgoingEmail {
        to_email: user.email.clone(),
        to_name: user.name.clone(),
        subject: "Bienvenido a LinkIT".to_string(),
        html: layout("¡Bienvenido!", &body),
    }
}

pub fn company_welcome(company: &Account) -> OutgoingEmail {
    let display = company
        .company_name
        .as_deref()
        .filter(|n| !n.is_empty())
        .unwrap_or(&company.name);
    let body = format!(
        "<p>Hola equipo de {},</p>\
         <p>Tu cuenta de empresa fue verificada. Ya puedes publicar tus búsquedas con nosotros.</p>",
        escape(display)
    );
    OutgoingEmail {
        to_email: company.email.clone(),
        to_name: display.to_string(),
        subject: "Bienvenidos a LinkIT".to_string(),
        html: layout("¡Bienvenidos!", &body),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::account::test_account;
    use crate::models::jd::test_jd;

    #[test]
    fn test_postulation_confirmation_mentions_jd() {
        let user = test_account("user", "ana@example.com");
        let jd = test_jd("LIT-101", "Backend <Rust>");
        let email = postulation_confirmation(&user, &jd);
        assert_eq!(email.to_email, "ana@example.com");
        assert!(email.subject.contains("Backend <Rust>"));
        assert!(email.html.contains("Backend &lt;Rust&gt;"));
        assert!(email.html.contains("LIT-101"));
    }

    #[test]
    fn test_company_welcome_prefers_company_name() {
        let mut company = test_account("company", "rrhh@acme.com");
        company.company_name = Some("Acme".into());
        let email = company_welcome(&company);
        assert_eq!(email.to_name, "Acme");
        assert!(email.html.contains("Acme"));
    }
}

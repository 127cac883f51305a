use super::EmailMessage;

/// Email carrying a one-time login code
pub fn login_code(to: &str, username: &str, code: &str, ttl_minutes: u64) -> EmailMessage {
    EmailMessage::new(
        to,
        "Código de verificación",
        format!(
            "Hola {username},\n\nTu código de acceso es: {code}\n\nEl código vence en {ttl_minutes} minutos. Si no intentaste iniciar sesión, ignora este mensaje.",
        ),
    )
}

/// Email mirroring an in-app notification
pub fn notification(to: &str, title: &str, message: &str) -> EmailMessage {
    EmailMessage::new(to, title, format!("{message}\n\nIngresa al sistema para ver el detalle."))
}

use crate::auth::AuthService;
use anyhow::Result;

/// Fetch enrollment material. QR rendering is left to the user's
/// authenticator; we print the otpauth URL and the manual secret.
pub async fn setup(service: &AuthService) -> Result<()> {
    let setup = service.setup_two_factor().await?;

    println!("Scan this enrollment URL with your authenticator app:");
    println!("  {}", setup.qr_code);
    println!("Or enter the secret manually: {}", setup.secret);
    println!("Then run `graphflix 2fa enable --code <code>` to confirm.");

    Ok(())
}

pub async fn enable(service: &AuthService, code: &str) -> Result<()> {
    let message = service.enable_two_factor(code).await?;
    println!("{message}");

    Ok(())
}

pub async fn disable(service: &AuthService, code: &str) -> Result<()> {
    let message = service.disable_two_factor(code).await?;
    println!("{message}");

    Ok(())
}

use crate::auth::{AuthService, LoginOutcome};
use anyhow::Result;

/// Handle the login action. Either outcome is a success from the caller's
/// point of view; the two-factor path just needs a follow-up `verify`.
pub async fn login(service: &AuthService, email: &str, password: &str) -> Result<()> {
    match service.login(email, password).await? {
        LoginOutcome::Authenticated(session) => {
            println!("Logged in as {}", session.user.name);
        }
        LoginOutcome::TwoFactorRequired => {
            println!("Two-factor verification required.");
            println!("Run `graphflix verify --code <code>` within 5 minutes.");
        }
    }

    Ok(())
}

pub async fn register(
    service: &AuthService,
    name: &str,
    email: &str,
    password: &str,
) -> Result<()> {
    let confirmation = service.register(name, email, password).await?;
    println!("{confirmation}");

    Ok(())
}

pub async fn verify(service: &AuthService, code: &str) -> Result<()> {
    let session = service.verify_two_factor(code).await?;
    println!("Welcome back, {}", session.user.name);

    Ok(())
}

pub fn logout(service: &AuthService) -> Result<()> {
    service.logout()?;
    println!("Logged out");

    Ok(())
}

pub fn status(service: &AuthService) -> Result<()> {
    if let Some(session) = service.session() {
        println!("Logged in as {}", session.user.name);
        if let Some(id) = &session.user.id {
            println!("User id: {id}");
        }
    } else if service.has_pending_challenge() {
        println!("Two-factor verification pending.");
        println!("Run `graphflix verify --code <code>` or `graphflix logout` to abandon it.");
    } else {
        println!("Not logged in");
    }

    Ok(())
}

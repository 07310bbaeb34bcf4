use crate::{
    auth::{AuthConfig, AuthService},
    cli::{
        actions::{auth, twofactor, Action},
        globals::GlobalArgs,
    },
};
use anyhow::Result;

pub(super) async fn execute(action: Action, globals: &GlobalArgs) -> Result<()> {
    let config = AuthConfig::new(globals.api_url.as_str(), globals.state_file.as_path());

    // Rehydrates any persisted session or challenge before the action runs.
    let service = AuthService::new(&config)?;

    match action {
        Action::Login { email, password } => auth::login(&service, &email, &password).await,
        Action::Register {
            name,
            email,
            password,
        } => auth::register(&service, &name, &email, &password).await,
        Action::Verify { code } => auth::verify(&service, &code).await,
        Action::TwoFactorSetup => twofactor::setup(&service).await,
        Action::TwoFactorEnable { code } => twofactor::enable(&service, &code).await,
        Action::TwoFactorDisable { code } => twofactor::disable(&service, &code).await,
        Action::Logout => auth::logout(&service),
        Action::Status => auth::status(&service),
    }
}

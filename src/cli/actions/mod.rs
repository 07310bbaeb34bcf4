pub mod auth;
pub mod twofactor;

// Internal "interpreter" for `Action`.
// We keep the match in a separate module so `mod.rs` stays small as more actions are added.
mod run;

use crate::cli::globals::GlobalArgs;

#[derive(Debug)]
pub enum Action {
    Login { email: String, password: String },
    Register { name: String, email: String, password: String },
    Verify { code: String },
    TwoFactorSetup,
    TwoFactorEnable { code: String },
    TwoFactorDisable { code: String },
    Logout,
    Status,
}

impl Action {
    /// Execute the action against the auth service.
    /// # Errors
    /// Returns an error if the action fails.
    pub async fn execute(self, globals: &GlobalArgs) -> anyhow::Result<()> {
        run::execute(self, globals).await
    }
}

use super::user_io::{prompt_id, warn};
use super::App;
use crate::domain::model::{User, UserType};
use crate::domain::ports::{Storage, Terminal};
use crate::domain::schema::PERSON_ID_DIGITS;
use crate::utils::error::Result;

pub use crate::domain::password::{generate_secure_password, verify_password};

impl<S: Storage> App<S> {
    /// Asks for credentials until they check out, then opens the menu for the user's role.
    pub async fn login_menu(&self, term: &mut dyn Terminal) -> Result<()> {
        let user = loop {
            let Some(user_id) = prompt_id(term, "User ID", PERSON_ID_DIGITS) else {
                return Ok(());
            };
            let Some(password) = term.read_secret("Password") else {
                return Ok(());
            };

            match self.secure_password_verification(user_id, &password).await {
                Ok(Some(user)) => break user,
                Ok(None) => term.write_line("Password is incorrect. Try again."),
                Err(e) => {
                    tracing::debug!("Login lookup failed: {}", e);
                    warn(term, &e.user_friendly_message());
                }
            }
        };

        tracing::info!("User {} logged in as {}", user.id, user.user_type);
        term.write_line(&format!("User ID: {}", user.id));
        term.write_line(&format!("User Name: {}", user.name));

        match user.user_type {
            UserType::Manager => self.manager_menu(term).await,
            UserType::Provider => self.show_provider_menu(term, user.id).await,
        }
    }

    /// The user, if `user_id` exists and `password` matches its stored hash.
    pub async fn secure_password_verification(
        &self,
        user_id: u32,
        password: &str,
    ) -> Result<Option<User>> {
        let user: Option<User> = self.database.find(&user_id).await?;
        Ok(user.filter(|u| verify_password(password, &u.password_hash)))
    }

    pub async fn user_type_authorization(&self, user_id: u32) -> Result<Option<UserType>> {
        let user: Option<User> = self.database.find(&user_id).await?;
        Ok(user.map(|u| u.user_type))
    }
}

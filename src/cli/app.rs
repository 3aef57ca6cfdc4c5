use log::info;
use rocket::figment::Figment;

use crate::{rocket_from_figment, Commands, Config, NotesError, Result, UserDirectory};

/// CLI Application handler - runs the selected command
pub struct App {
    /// Layered configuration, rocket's keys included
    figment: Figment,

    /// Application configuration
    config: Config,
}

impl App {
    pub fn new(figment: Figment) -> Result<Self> {
        let config = Config::from_figment(&figment)?;
        Ok(Self { figment, config })
    }

    /// Run the CLI application with the given command
    pub async fn run(&self, command: Commands) -> Result<()> {
        match command {
            Commands::Serve => self.serve().await,
            Commands::CreateUser { username, password } => {
                self.create_user(&username, &password).await
            }
        }
    }

    async fn serve(&self) -> Result<()> {
        let rocket = rocket_from_figment(self.figment.clone())?;
        rocket
            .launch()
            .await
            .map_err(|e| NotesError::ApplicationError {
                message: format!("Server failed: {}", e),
            })?;
        info!("Server stopped");
        Ok(())
    }

    async fn create_user(&self, username: &str, password: &str) -> Result<()> {
        if !self.config.persist {
            return Err(NotesError::ConfigError {
                message: "Users created in memory would be lost on exit".to_string(),
            });
        }
        let users = UserDirectory::from_config(&self.config)?;
        let user = users.signup(username, password).await?;
        println!("Created user {} ({})", user.username, user.id);
        Ok(())
    }
}

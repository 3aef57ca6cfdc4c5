//! Registered users and password checks.
use std::{
    collections::{hash_map::Entry, HashMap},
    fmt,
    path::{Path, PathBuf},
    str::FromStr,
    sync::{Mutex, MutexGuard},
};

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Algorithm, Argon2, Params, Version,
};
use log::{debug, error, info, warn};
use serde::{Deserialize, Serialize};
use tokio::task::spawn_blocking;

use crate::{
    load_json_file, write_json_atomically, Config, FormField, NotesError, Result, UserId,
};

const MAX_USERNAME_LENGTH: usize = 150;

/// A validated login handle.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Username(String);

impl Username {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for Username {
    type Err = NotesError;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        if s.is_empty() {
            return Err(NotesError::validation(
                FormField::Username,
                "This field is required.",
            ));
        }
        if s.chars().count() > MAX_USERNAME_LENGTH {
            return Err(NotesError::validation(
                FormField::Username,
                format!(
                    "Ensure this value has at most {} characters.",
                    MAX_USERNAME_LENGTH
                ),
            ));
        }
        if !s.chars().all(|c| c.is_alphanumeric() || "@.+-_".contains(c)) {
            return Err(NotesError::validation(
                FormField::Username,
                "Enter a valid username. This value may contain only letters, numbers, and @/./+/-/_ characters.",
            ));
        }
        Ok(Username(s.to_string()))
    }
}

impl TryFrom<String> for Username {
    type Error = NotesError;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<Username> for String {
    fn from(value: Username) -> Self {
        value.0
    }
}

impl fmt::Display for Username {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A registered user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub username: Username,
    /// PHC string produced by argon2
    password_hash: String,
}

/// Cost parameters of the password hash.
#[derive(Debug, Clone, Copy)]
pub struct HasherConfig {
    pub memory_kib: u32,
    pub iterations: u32,
}

impl HasherConfig {
    fn build(&self) -> Result<Hasher> {
        let params = Params::new(self.memory_kib, self.iterations, 1, None).map_err(|e| {
            NotesError::ConfigError {
                message: format!("Invalid argon2 parameters: {}", e),
            }
        })?;
        Ok(Hasher(Argon2::new(Algorithm::Argon2id, Version::V0x13, params)))
    }
}

/// Argon2id hashing, cheap to clone onto a blocking thread.
#[derive(Clone)]
struct Hasher(Argon2<'static>);

impl Hasher {
    fn hash(&self, password: &str) -> Result<String> {
        let salt = SaltString::generate(&mut OsRng);
        self.0
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| NotesError::PasswordHash {
                message: e.to_string(),
            })
    }

    fn verify(&self, hash: &str, password: &str) -> Result<bool> {
        let parsed = PasswordHash::new(hash).map_err(|e| NotesError::PasswordHash {
            message: e.to_string(),
        })?;
        Ok(self.0.verify_password(password.as_bytes(), &parsed).is_ok())
    }

    /// Runs `job` on the blocking thread pool.
    async fn run<T, F>(&self, job: F) -> Result<T>
    where
        T: Send + 'static,
        F: FnOnce(Hasher) -> Result<T> + Send + 'static,
    {
        let hasher = self.clone();
        spawn_blocking(move || job(hasher))
            .await
            .map_err(|e| NotesError::ApplicationError {
                message: format!("Password hashing task failed: {}", e),
            })?
    }
}

/// All registered users, optionally mirrored to a JSON file.
///
/// The file may gain users from another process (`create-user` next to a
/// running server), so it is merged back in before every write.
pub struct UserDirectory {
    users_file: Option<PathBuf>,
    users: Mutex<HashMap<UserId, User>>,
    hasher: Hasher,
}

impl UserDirectory {
    pub fn in_memory(hasher: HasherConfig) -> Result<Self> {
        Ok(Self {
            users_file: None,
            users: Mutex::new(HashMap::new()),
            hasher: hasher.build()?,
        })
    }

    /// Opens the directory the configuration asks for.
    pub fn from_config(config: &Config) -> Result<Self> {
        if config.persist {
            Self::open(config.users_file(), config.hasher())
        } else {
            Self::in_memory(config.hasher())
        }
    }

    /// Opens the directory stored in `users_file`; a missing file means no
    /// users yet.
    pub fn open(users_file: impl Into<PathBuf>, hasher: HasherConfig) -> Result<Self> {
        let users_file = users_file.into();
        let mut users = HashMap::new();
        Self::merge_file(&users_file, &mut users)?;
        info!("Loaded {} users", users.len());

        Ok(Self {
            users_file: Some(users_file),
            users: Mutex::new(users),
            hasher: hasher.build()?,
        })
    }

    /// Adds the users stored in `users_file` that `users` doesn't know yet.
    fn merge_file(users_file: &Path, users: &mut HashMap<UserId, User>) -> Result<()> {
        if !users_file.exists() {
            debug!("No users file at {}", users_file.display());
            return Ok(());
        }
        let stored: Vec<User> = load_json_file(users_file)?;
        for user in stored {
            if let Entry::Vacant(entry) = users.entry(user.id) {
                debug!("Picked up user {} from {}", user.username, users_file.display());
                entry.insert(user);
            }
        }
        Ok(())
    }

    fn refresh(&self, users: &mut HashMap<UserId, User>) -> Result<()> {
        match &self.users_file {
            Some(users_file) => Self::merge_file(users_file, users),
            None => Ok(()),
        }
    }

    fn lock(&self) -> Result<MutexGuard<'_, HashMap<UserId, User>>> {
        self.users.lock().map_err(|e| {
            error!("Failed to acquire lock on users: {}", e);
            NotesError::poisoned("users")
        })
    }

    /// Registers a user; usernames are unique.
    pub async fn signup(&self, username: &str, password: &str) -> Result<User> {
        let username: Username = username.parse()?;
        if password.is_empty() {
            return Err(NotesError::validation(
                FormField::Password,
                "This field is required.",
            ));
        }

        let password = password.to_string();
        let password_hash = self.hasher.run(move |hasher| hasher.hash(&password)).await?;

        let mut users = self.lock()?;
        self.refresh(&mut users)?;
        if users.values().any(|u| u.username == username) {
            return Err(NotesError::validation(
                FormField::Username,
                "A user with that username already exists.",
            ));
        }

        let user = User {
            id: UserId::new(),
            username,
            password_hash,
        };
        users.insert(user.id, user.clone());
        if let Err(e) = self.save(&users) {
            users.remove(&user.id);
            return Err(e);
        }

        info!("Registered user {} ({})", user.username, user.id);
        Ok(user)
    }

    /// Checks a username and password pair.
    pub async fn authenticate(&self, username: &str, password: &str) -> Result<User> {
        let user = self
            .find_by_username(username)?
            .ok_or(NotesError::InvalidCredentials)?;

        let hash = user.password_hash.clone();
        let password = password.to_string();
        let verified = self
            .hasher
            .run(move |hasher| hasher.verify(&hash, &password))
            .await?;
        if !verified {
            warn!("Failed login attempt for {}", user.username);
            return Err(NotesError::InvalidCredentials);
        }
        debug!("User {} authenticated", user.username);
        Ok(user)
    }

    pub fn get(&self, id: UserId) -> Result<Option<User>> {
        Ok(self.lock()?.get(&id).cloned())
    }

    /// Looks a user up by name, picking up users added to the file since.
    pub fn find_by_username(&self, username: &str) -> Result<Option<User>> {
        let username = username.trim();
        let mut users = self.lock()?;
        if !users.values().any(|u| u.username.as_str() == username) {
            self.refresh(&mut users)?;
        }
        Ok(users
            .values()
            .find(|u| u.username.as_str() == username)
            .cloned())
    }

    fn save(&self, users: &HashMap<UserId, User>) -> Result<()> {
        if let Some(users_file) = &self.users_file {
            let mut list: Vec<&User> = users.values().collect();
            list.sort_by(|a, b| a.username.as_str().cmp(b.username.as_str()));
            write_json_atomically(users_file, &list)?;
        }
        Ok(())
    }
}

#[cfg(test)]
pub(crate) const TEST_HASHER: HasherConfig = HasherConfig {
    memory_kib: 8,
    iterations: 1,
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn username_rules() {
        assert!("Danya".parse::<Username>().is_ok());
        assert!("user.name+tag@host-1_x".parse::<Username>().is_ok());
        assert!("Вася".parse::<Username>().is_ok());
        assert!("".parse::<Username>().is_err());
        assert!("with space".parse::<Username>().is_err());
        assert!("x".repeat(151).parse::<Username>().is_err());
    }

    #[tokio::test]
    async fn signup_then_authenticate() {
        let users = UserDirectory::in_memory(TEST_HASHER).unwrap();
        let danya = users.signup("Danya", "secret").await.unwrap();

        let authenticated = users.authenticate("Danya", "secret").await.unwrap();
        assert_eq!(authenticated.id, danya.id);
        assert_eq!(users.get(danya.id).unwrap().unwrap().username.as_str(), "Danya");
    }

    #[tokio::test]
    async fn wrong_password_or_unknown_user() {
        let users = UserDirectory::in_memory(TEST_HASHER).unwrap();
        users.signup("Danya", "secret").await.unwrap();

        assert!(matches!(
            users.authenticate("Danya", "wrong").await,
            Err(NotesError::InvalidCredentials)
        ));
        assert!(matches!(
            users.authenticate("Nobody", "secret").await,
            Err(NotesError::InvalidCredentials)
        ));
    }

    #[tokio::test]
    async fn duplicate_username_is_rejected() {
        let users = UserDirectory::in_memory(TEST_HASHER).unwrap();
        users.signup("Danya", "secret").await.unwrap();

        let err = users.signup("Danya", "other").await.unwrap_err();
        assert!(matches!(err, NotesError::Validation { field: FormField::Username, .. }));
    }

    #[tokio::test]
    async fn empty_password_is_rejected() {
        let users = UserDirectory::in_memory(TEST_HASHER).unwrap();
        let err = users.signup("Danya", "").await.unwrap_err();
        assert!(matches!(err, NotesError::Validation { field: FormField::Password, .. }));
    }

    #[tokio::test]
    async fn users_survive_reopening() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("users.json");

        let id = UserDirectory::open(&file, TEST_HASHER)
            .unwrap()
            .signup("Bayarin", "pw")
            .await
            .unwrap()
            .id;

        let users = UserDirectory::open(&file, TEST_HASHER).unwrap();
        assert_eq!(users.get(id).unwrap().unwrap().username.as_str(), "Bayarin");
        assert!(users.authenticate("Bayarin", "pw").await.is_ok());
    }

    #[tokio::test]
    async fn users_added_by_another_process_are_kept() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("users.json");
        let server = UserDirectory::open(&file, TEST_HASHER).unwrap();
        let cli = UserDirectory::open(&file, TEST_HASHER).unwrap();

        let from_cli = cli.signup("FromCli", "pw").await.unwrap();
        server.signup("Web", "pw").await.unwrap();

        let reopened = UserDirectory::open(&file, TEST_HASHER).unwrap();
        assert!(reopened.find_by_username("FromCli").unwrap().is_some());
        assert!(reopened.find_by_username("Web").unwrap().is_some());

        assert_eq!(server.authenticate("FromCli", "pw").await.unwrap().id, from_cli.id);
        assert!(matches!(
            server.signup("FromCli", "other").await,
            Err(NotesError::Validation { field: FormField::Username, .. })
        ));
    }
}

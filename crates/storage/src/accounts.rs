//! User accounts and credential checks

use chrono::Utc;
use tracing::{info, warn};

use crate::models::{NewUser, Requester, User, UserUpdate};
use crate::password::{hash_password, verify_password};
use crate::repository::{lock, Repository};
use crate::StorageError;

impl Repository {
    /// Create an account. Usernames are unique, ignoring ASCII case.
    pub fn create_user(&self, new: NewUser) -> Result<User, StorageError> {
        let username = new.username.trim();
        if username.is_empty() || new.password.is_empty() {
            return Err(StorageError::InvalidState(
                "Username and password are required".to_string(),
            ));
        }

        let password_hash = hash_password(&new.password)?;

        let mut users = lock(&self.users)?;
        if users
            .rows
            .iter()
            .any(|u| u.username.eq_ignore_ascii_case(username))
        {
            return Err(StorageError::Conflict("Username already exists".to_string()));
        }

        let now = Utc::now();
        let user = User {
            id: users.allocate_id(),
            username: username.to_string(),
            role: new.role,
            is_active: true,
            password_hash,
            created_at: now,
            updated_at: now,
        };
        users.rows.push_back(user.clone());

        info!("Created {:?} account {} ({})", user.role, user.id, user.username);
        Ok(user)
    }

    /// Resolve credentials to an active account.
    ///
    /// Unknown users, inactive accounts, and wrong passwords all fail with
    /// the same `Unauthorized` error.
    pub fn authenticate(&self, username: &str, password: &str) -> Result<User, StorageError> {
        let user = lock(&self.users)?
            .rows
            .iter()
            .find(|u| u.username.eq_ignore_ascii_case(username.trim()))
            .cloned();

        match user {
            Some(user) if user.is_active => {
                if verify_password(password, &user.password_hash)? {
                    Ok(user)
                } else {
                    warn!("Failed login for {}", user.username);
                    Err(StorageError::Unauthorized)
                }
            }
            _ => Err(StorageError::Unauthorized),
        }
    }

    /// Every account, newest first. Admin only.
    pub fn list_users(&self, requester: &Requester) -> Result<Vec<User>, StorageError> {
        if !requester.is_admin() {
            return Err(StorageError::Forbidden);
        }
        Ok(lock(&self.users)?.rows.iter().rev().cloned().collect())
    }

    /// Change role, activation, or password. Admin only.
    pub fn update_user(
        &self,
        id: i64,
        update: UserUpdate,
        requester: &Requester,
    ) -> Result<User, StorageError> {
        if !requester.is_admin() {
            return Err(StorageError::Forbidden);
        }

        let password_hash = match update.password.as_deref().map(str::trim) {
            Some(password) if !password.is_empty() => Some(hash_password(password)?),
            _ => None,
        };

        let mut users = lock(&self.users)?;
        let user = users
            .rows
            .iter_mut()
            .find(|u| u.id == id)
            .ok_or(StorageError::NotFound)?;

        if let Some(role) = update.role {
            user.role = role;
        }
        if let Some(is_active) = update.is_active {
            user.is_active = is_active;
        }
        if let Some(hash) = password_hash {
            user.password_hash = hash;
        }
        user.updated_at = Utc::now();

        info!("Account {} updated by {}", id, requester.user_id);
        Ok(user.clone())
    }

    /// Look an account up by id
    pub fn user(&self, id: i64) -> Result<Option<User>, StorageError> {
        Ok(lock(&self.users)?.rows.iter().find(|u| u.id == id).cloned())
    }

    /// Look an account up by username, ignoring ASCII case
    pub fn find_user(&self, username: &str) -> Result<Option<User>, StorageError> {
        Ok(lock(&self.users)?
            .rows
            .iter()
            .find(|u| u.username.eq_ignore_ascii_case(username.trim()))
            .cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Role;

    fn new_user(username: &str, password: &str, role: Role) -> NewUser {
        NewUser {
            username: username.to_string(),
            password: password.to_string(),
            role,
        }
    }

    #[test]
    fn test_create_and_authenticate() {
        let repo = Repository::new();
        let user = repo.create_user(new_user(" amina ", "honeycomb1", Role::User)).unwrap();
        assert_eq!(user.username, "amina");
        assert!(user.is_active);
        assert_ne!(user.password_hash, "honeycomb1");

        let found = repo.authenticate("AMINA", "honeycomb1").unwrap();
        assert_eq!(found.id, user.id);
        assert_eq!(found.requester(), Requester::user(user.id));

        assert!(matches!(
            repo.authenticate("amina", "wrong"),
            Err(StorageError::Unauthorized)
        ));
        assert!(matches!(
            repo.authenticate("nobody", "honeycomb1"),
            Err(StorageError::Unauthorized)
        ));
    }

    #[test]
    fn test_duplicate_username_rejected() {
        let repo = Repository::new();
        repo.create_user(new_user("otieno", "pw", Role::User)).unwrap();
        assert!(matches!(
            repo.create_user(new_user("Otieno", "pw", Role::Admin)),
            Err(StorageError::Conflict(_))
        ));
        assert!(matches!(
            repo.create_user(new_user("  ", "pw", Role::User)),
            Err(StorageError::InvalidState(_))
        ));
    }

    #[test]
    fn test_admin_manages_accounts() {
        let repo = Repository::new();
        let admin = repo.create_user(new_user("root", "pw-admin", Role::Admin)).unwrap();
        let user = repo.create_user(new_user("keeper", "pw-old", Role::User)).unwrap();

        assert!(matches!(
            repo.list_users(&user.requester()),
            Err(StorageError::Forbidden)
        ));
        let listed = repo.list_users(&admin.requester()).unwrap();
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0].id, user.id);

        let update = UserUpdate {
            password: Some("pw-new".to_string()),
            ..Default::default()
        };
        assert!(matches!(
            repo.update_user(user.id, update.clone(), &user.requester()),
            Err(StorageError::Forbidden)
        ));
        repo.update_user(user.id, update, &admin.requester()).unwrap();
        assert!(repo.authenticate("keeper", "pw-old").is_err());
        assert!(repo.authenticate("keeper", "pw-new").is_ok());

        let deactivate = UserUpdate {
            is_active: Some(false),
            ..Default::default()
        };
        repo.update_user(user.id, deactivate, &admin.requester()).unwrap();
        assert!(matches!(
            repo.authenticate("keeper", "pw-new"),
            Err(StorageError::Unauthorized)
        ));

        assert!(matches!(
            repo.update_user(99, UserUpdate::default(), &admin.requester()),
            Err(StorageError::NotFound)
        ));
    }

    #[test]
    fn test_password_hash_not_serialized() {
        let repo = Repository::new();
        let user = repo.create_user(new_user("amina", "secret-pw", Role::User)).unwrap();
        let json = serde_json::to_value(&user).unwrap();
        assert!(json.get("password_hash").is_none());
        assert_eq!(json["role"], "user");
    }
}

//! Account and content service
//!
//! Form validation and account rules in front of the repository:
//! login, self-registration, admin account management, hive registration
//! for the signed-in owner, tips, training sessions, and market prices.

use data_validator::{require, validate_email, validate_password_strength, validate_rw_mobile};
use std::sync::Arc;
use tracing::{info, warn};

use storage::{
    ApplicationForm, ApplyOutcome, Hive, NewHive, NewTip, NewTraining, NewUser, Repository,
    Requester, Role, StorageError, Tip, TrainingResource, User, UserUpdate,
};

use crate::config::{AuthConfig, IngestConfig, MarketPrices};
use crate::pipeline::IngestError;

pub struct Portal {
    repository: Arc<Repository>,
    auth: AuthConfig,
    market: MarketPrices,
}

impl Portal {
    pub fn new(repository: Arc<Repository>, auth: AuthConfig, market: MarketPrices) -> Self {
        Self {
            repository,
            auth,
            market,
        }
    }

    /// Share the repository with an ingestion pipeline
    pub fn from_config(config: &IngestConfig, repository: Arc<Repository>) -> Self {
        Self::new(repository, config.auth.clone(), config.market.clone())
    }

    pub fn repository(&self) -> &Arc<Repository> {
        &self.repository
    }

    /// Create the configured admin account if it does not exist yet
    pub fn bootstrap_admin(&self) -> Result<Option<User>, IngestError> {
        let Some(password) = self.auth.admin_password.as_deref() else {
            return Ok(None);
        };
        if self.repository.find_user(&self.auth.admin_username)?.is_some() {
            return Ok(None);
        }

        let admin = self.repository.create_user(NewUser {
            username: self.auth.admin_username.clone(),
            password: password.to_string(),
            role: Role::Admin,
        })?;
        warn!("Bootstrap admin account '{}' created", admin.username);
        Ok(Some(admin))
    }

    /// Self-service registration. New accounts always get the user role.
    pub fn register(&self, username: &str, password: &str) -> Result<User, IngestError> {
        let username = require("username", username)?;
        require("password", password)?;
        validate_password_strength(password, self.auth.min_password_length)?;

        Ok(self.repository.create_user(NewUser {
            username: username.to_string(),
            password: password.to_string(),
            role: Role::User,
        })?)
    }

    /// Check credentials and return the identity to act with
    pub fn login(&self, username: &str, password: &str) -> Result<Requester, IngestError> {
        let username = require("username", username)?;
        require("password", password)?;

        let user = self.repository.authenticate(username, password)?;
        info!("User {} logged in", user.id);
        Ok(user.requester())
    }

    /// Create an account with any role. Admin only.
    pub fn create_user(&self, requester: &Requester, new: NewUser) -> Result<User, IngestError> {
        if !requester.is_admin() {
            return Err(StorageError::Forbidden.into());
        }
        require("username", &new.username)?;
        require("password", &new.password)?;
        validate_password_strength(&new.password, self.auth.min_password_length)?;

        Ok(self.repository.create_user(new)?)
    }

    /// Change an account's role, activation, or password. Admin only.
    pub fn update_user(
        &self,
        requester: &Requester,
        id: i64,
        update: UserUpdate,
    ) -> Result<User, IngestError> {
        if let Some(password) = update.password.as_deref().filter(|p| !p.trim().is_empty()) {
            validate_password_strength(password.trim(), self.auth.min_password_length)?;
        }
        Ok(self.repository.update_user(id, update, requester)?)
    }

    /// Register a hive owned by the requester. It stays pending until an
    /// admin approves it.
    pub fn register_hive(&self, requester: &Requester, new: NewHive) -> Result<Hive, IngestError> {
        let owner = self
            .repository
            .user(requester.user_id)?
            .ok_or(StorageError::Unauthorized)?;

        Ok(self.repository.register_hive(NewHive {
            owner_id: owner.id,
            owner_name: owner.username,
            ..new
        })?)
    }

    /// Publish a tip. Admin only.
    pub fn create_tip(&self, requester: &Requester, new: NewTip) -> Result<Tip, IngestError> {
        require("title", &new.title)?;
        require("description", &new.description)?;
        Ok(self.repository.create_tip(new, requester)?)
    }

    /// Add a training session. Admin only.
    pub fn create_training(
        &self,
        requester: &Requester,
        new: NewTraining,
    ) -> Result<TrainingResource, IngestError> {
        require("title", &new.title)?;
        require("description", &new.description)?;
        Ok(self.repository.create_training(new, requester)?)
    }

    /// Validate an application form and apply for a published session
    pub fn apply_training(
        &self,
        requester: &Requester,
        id: i64,
        form: ApplicationForm,
    ) -> Result<ApplyOutcome, IngestError> {
        let name = require("name", &form.name)?.to_string();
        let phone = form.phone.trim().to_string();
        validate_rw_mobile(&phone)?;
        let email = match form.email.as_deref().map(str::trim).filter(|e| !e.is_empty()) {
            Some(email) => {
                validate_email(email)?;
                Some(email.to_string())
            }
            None => None,
        };
        let location = require("location", &form.location)?.to_string();
        let experience = require("experience", &form.experience)?.to_string();

        let form = ApplicationForm {
            name,
            phone,
            email,
            location,
            experience,
            note: form.note.trim().to_string(),
        };
        Ok(self.repository.apply_training(id, form, requester)?)
    }

    /// Current reference prices
    pub fn market_prices(&self) -> &MarketPrices {
        &self.market
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use data_validator::ValidationError;
    use storage::HiveStatus;

    fn portal() -> Portal {
        let auth = AuthConfig {
            admin_password: Some("bootstrap-pw".to_string()),
            ..Default::default()
        };
        Portal::new(Arc::new(Repository::new()), auth, MarketPrices::default())
    }

    fn admin(portal: &Portal) -> Requester {
        portal.bootstrap_admin().unwrap();
        portal.login("Admin", "bootstrap-pw").unwrap()
    }

    #[test]
    fn test_bootstrap_admin_once() {
        let portal = portal();
        let created = portal.bootstrap_admin().unwrap().unwrap();
        assert_eq!(created.role, Role::Admin);
        assert!(portal.bootstrap_admin().unwrap().is_none());

        let without = Portal::new(
            Arc::new(Repository::new()),
            AuthConfig::default(),
            MarketPrices::default(),
        );
        assert!(without.bootstrap_admin().unwrap().is_none());
    }

    #[test]
    fn test_register_and_login() {
        let portal = portal();
        let user = portal.register("amina", "honeycomb").unwrap();
        assert_eq!(user.role, Role::User);

        let requester = portal.login(" amina ", "honeycomb").unwrap();
        assert_eq!(requester, Requester::user(user.id));

        assert!(matches!(
            portal.login("amina", "wrong-password"),
            Err(IngestError::Storage(StorageError::Unauthorized))
        ));
    }

    #[test]
    fn test_missing_credentials() {
        let portal = portal();
        assert!(matches!(
            portal.login("", "pw"),
            Err(IngestError::Validation(ValidationError::MissingField("username")))
        ));
        assert!(matches!(
            portal.register("amina", ""),
            Err(IngestError::Validation(ValidationError::MissingField("password")))
        ));
        assert!(matches!(
            portal.register("amina", "short"),
            Err(IngestError::Validation(ValidationError::InvalidFormat(_)))
        ));
    }

    #[test]
    fn test_admin_account_management() {
        let portal = portal();
        let admin = admin(&portal);
        let user = portal.register("keeper", "keeper-pw").unwrap().requester();

        let new = NewUser {
            username: "agronomist".to_string(),
            password: "agronomist-pw".to_string(),
            role: Role::Admin,
        };
        assert!(matches!(
            portal.create_user(&user, new.clone()),
            Err(IngestError::Storage(StorageError::Forbidden))
        ));
        let created = portal.create_user(&admin, new).unwrap();
        assert_eq!(created.role, Role::Admin);

        let weak = UserUpdate {
            password: Some("tiny".to_string()),
            ..Default::default()
        };
        assert!(matches!(
            portal.update_user(&admin, created.id, weak),
            Err(IngestError::Validation(_))
        ));

        let demote = UserUpdate {
            role: Some(Role::User),
            ..Default::default()
        };
        let demoted = portal.update_user(&admin, created.id, demote).unwrap();
        assert_eq!(demoted.role, Role::User);
        assert_eq!(portal.repository().list_users(&admin).unwrap().len(), 3);
    }

    #[test]
    fn test_register_hive_for_signed_in_owner() {
        let portal = portal();
        let requester = portal.register("amina", "honeycomb").unwrap().requester();

        let hive = portal
            .register_hive(
                &requester,
                NewHive {
                    name: "Acacia".to_string(),
                    device_id: "hive-001".to_string(),
                    owner_id: 999,
                    ..Default::default()
                },
            )
            .unwrap();
        assert_eq!(hive.owner_id, requester.user_id);
        assert_eq!(hive.owner_name, "amina");
        assert_eq!(hive.status, HiveStatus::Pending);

        assert!(matches!(
            portal.register_hive(&Requester::user(42), NewHive::default()),
            Err(IngestError::Storage(StorageError::Unauthorized))
        ));
    }

    #[test]
    fn test_tip_form() {
        let portal = portal();
        let admin = admin(&portal);

        assert!(matches!(
            portal.create_tip(&admin, NewTip { title: "Varroa".to_string(), ..Default::default() }),
            Err(IngestError::Validation(ValidationError::MissingField("description")))
        ));
        let tip = portal
            .create_tip(
                &admin,
                NewTip {
                    title: "Varroa".to_string(),
                    description: "Count mites after every brood cycle".to_string(),
                    icon: String::new(),
                },
            )
            .unwrap();
        assert_eq!(portal.repository().list_tips().unwrap(), vec![tip]);
    }

    #[test]
    fn test_training_application_form() {
        let portal = portal();
        let admin = admin(&portal);
        let user = portal.register("jean", "jean-password").unwrap().requester();
        let session = portal
            .create_training(
                &admin,
                NewTraining {
                    title: "Basic Beekeeping".to_string(),
                    description: "Equipment, hive setup, and safety".to_string(),
                    published: true,
                    ..Default::default()
                },
            )
            .unwrap();

        let form = ApplicationForm {
            name: " Jean ".to_string(),
            phone: "+250788123456".to_string(),
            email: Some("".to_string()),
            location: "Huye".to_string(),
            experience: "two seasons".to_string(),
            note: String::new(),
        };

        let bad_phone = ApplicationForm {
            phone: "0788123456".to_string(),
            ..form.clone()
        };
        assert!(matches!(
            portal.apply_training(&user, session.id, bad_phone),
            Err(IngestError::Validation(ValidationError::InvalidFormat(_)))
        ));
        let no_location = ApplicationForm {
            location: " ".to_string(),
            ..form.clone()
        };
        assert!(matches!(
            portal.apply_training(&user, session.id, no_location),
            Err(IngestError::Validation(ValidationError::MissingField("location")))
        ));

        assert_eq!(
            portal.apply_training(&user, session.id, form.clone()).unwrap(),
            ApplyOutcome::Applied
        );
        assert_eq!(
            portal.apply_training(&user, session.id, form).unwrap(),
            ApplyOutcome::AlreadyApplied
        );

        let applicants = portal.repository().training_applicants(session.id, &admin).unwrap();
        assert_eq!(applicants[0].form.name, "Jean");
        assert_eq!(applicants[0].form.email, None);
    }

    #[test]
    fn test_market_prices() {
        let portal = portal();
        let prices = portal.market_prices();
        assert_eq!(prices.raw_honey_price, 5000);
        assert_eq!(prices.processed_honey_price, 7000);
        assert_eq!(prices.beeswax_price, 3000);
    }
}

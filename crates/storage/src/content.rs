//! Tips and training sessions

use chrono::Utc;
use std::collections::HashMap;
use tracing::info;

use crate::models::{
    ApplicationForm, ApplyOutcome, NewTip, NewTraining, Requester, Tip, TipUpdate,
    TrainingApplication, TrainingResource, TrainingUpdate,
};
use crate::repository::{lock, Repository};
use crate::StorageError;

fn require_admin(requester: &Requester) -> Result<(), StorageError> {
    if requester.is_admin() {
        Ok(())
    } else {
        Err(StorageError::Forbidden)
    }
}

fn required(title: &str, description: &str) -> Result<(String, String), StorageError> {
    let (title, description) = (title.trim(), description.trim());
    if title.is_empty() || description.is_empty() {
        return Err(StorageError::InvalidState(
            "Title and description are required".to_string(),
        ));
    }
    Ok((title.to_string(), description.to_string()))
}

impl Repository {
    // ---- Tips ----

    /// Every tip, oldest first
    pub fn list_tips(&self) -> Result<Vec<Tip>, StorageError> {
        Ok(lock(&self.tips)?.rows.iter().cloned().collect())
    }

    /// Publish a tip. Admin only.
    pub fn create_tip(&self, new: NewTip, requester: &Requester) -> Result<Tip, StorageError> {
        require_admin(requester)?;
        let (title, description) = required(&new.title, &new.description)?;

        let mut tips = lock(&self.tips)?;
        let tip = Tip {
            id: tips.allocate_id(),
            title,
            description,
            icon: new.icon.trim().to_string(),
            created_by: requester.user_id,
            created_at: Utc::now(),
            updated_at: None,
        };
        tips.rows.push_back(tip.clone());

        info!("Tip {} created by {}", tip.id, requester.user_id);
        Ok(tip)
    }

    /// Edit a tip. Admin only.
    pub fn update_tip(
        &self,
        id: i64,
        update: TipUpdate,
        requester: &Requester,
    ) -> Result<Tip, StorageError> {
        require_admin(requester)?;

        let mut tips = lock(&self.tips)?;
        let tip = tips
            .rows
            .iter_mut()
            .find(|t| t.id == id)
            .ok_or(StorageError::NotFound)?;

        if let Some(title) = update.title {
            tip.title = title.trim().to_string();
        }
        if let Some(description) = update.description {
            tip.description = description.trim().to_string();
        }
        if let Some(icon) = update.icon {
            tip.icon = icon.trim().to_string();
        }
        tip.updated_at = Some(Utc::now());

        Ok(tip.clone())
    }

    /// Remove a tip. Admin only.
    pub fn delete_tip(&self, id: i64, requester: &Requester) -> Result<(), StorageError> {
        require_admin(requester)?;

        let mut tips = lock(&self.tips)?;
        let pos = tips
            .rows
            .iter()
            .position(|t| t.id == id)
            .ok_or(StorageError::NotFound)?;
        tips.rows.remove(pos);

        info!("Tip {} deleted by {}", id, requester.user_id);
        Ok(())
    }

    // ---- Training ----

    /// Sessions the requester may see. Admins see unpublished sessions and
    /// applicant counts.
    pub fn list_training(&self, requester: &Requester) -> Result<Vec<TrainingResource>, StorageError> {
        let resources: Vec<TrainingResource> = lock(&self.training)?
            .rows
            .iter()
            .filter(|r| requester.is_admin() || r.published)
            .cloned()
            .collect();

        if !requester.is_admin() {
            return Ok(resources);
        }

        let mut counts: HashMap<i64, usize> = HashMap::new();
        for app in lock(&self.applications)?.iter() {
            *counts.entry(app.training_id).or_default() += 1;
        }
        Ok(resources
            .into_iter()
            .map(|mut r| {
                r.applicants = Some(counts.get(&r.id).copied().unwrap_or(0));
                r
            })
            .collect())
    }

    /// One session. Unpublished sessions are `NotFound` for non-admins.
    pub fn get_training(&self, id: i64, requester: &Requester) -> Result<TrainingResource, StorageError> {
        lock(&self.training)?
            .rows
            .iter()
            .find(|r| r.id == id && (requester.is_admin() || r.published))
            .cloned()
            .ok_or(StorageError::NotFound)
    }

    /// Add a session. Admin only.
    pub fn create_training(
        &self,
        new: NewTraining,
        requester: &Requester,
    ) -> Result<TrainingResource, StorageError> {
        require_admin(requester)?;
        let (title, description) = required(&new.title, &new.description)?;

        let mut training = lock(&self.training)?;
        let resource = TrainingResource {
            id: training.allocate_id(),
            title,
            description,
            date: new.date,
            published: new.published,
            applicants: None,
        };
        training.rows.push_back(resource.clone());

        info!("Training {} created by {}", resource.id, requester.user_id);
        Ok(resource)
    }

    /// Edit a session. Admin only.
    pub fn update_training(
        &self,
        id: i64,
        update: TrainingUpdate,
        requester: &Requester,
    ) -> Result<TrainingResource, StorageError> {
        require_admin(requester)?;

        let mut training = lock(&self.training)?;
        let resource = training
            .rows
            .iter_mut()
            .find(|r| r.id == id)
            .ok_or(StorageError::NotFound)?;

        if let Some(title) = update.title {
            resource.title = title.trim().to_string();
        }
        if let Some(description) = update.description {
            resource.description = description.trim().to_string();
        }
        if let Some(date) = update.date {
            resource.date = Some(date);
        }
        if let Some(published) = update.published {
            resource.published = published;
        }

        Ok(resource.clone())
    }

    /// Remove a session and its applications. Admin only.
    pub fn delete_training(&self, id: i64, requester: &Requester) -> Result<(), StorageError> {
        require_admin(requester)?;

        {
            let mut training = lock(&self.training)?;
            let pos = training
                .rows
                .iter()
                .position(|r| r.id == id)
                .ok_or(StorageError::NotFound)?;
            training.rows.remove(pos);
        }
        lock(&self.applications)?.retain(|a| a.training_id != id);

        info!("Training {} deleted by {}", id, requester.user_id);
        Ok(())
    }

    /// Record an application for a published session, once per user
    pub fn apply_training(
        &self,
        id: i64,
        form: ApplicationForm,
        requester: &Requester,
    ) -> Result<ApplyOutcome, StorageError> {
        let available = lock(&self.training)?
            .rows
            .iter()
            .any(|r| r.id == id && r.published);
        if !available {
            return Err(StorageError::InvalidState(format!(
                "Training {} is not available",
                id
            )));
        }

        let mut applications = lock(&self.applications)?;
        if applications
            .iter()
            .any(|a| a.training_id == id && a.user_id == requester.user_id)
        {
            return Ok(ApplyOutcome::AlreadyApplied);
        }

        applications.push(TrainingApplication {
            training_id: id,
            user_id: requester.user_id,
            form,
            applied_at: Utc::now(),
        });

        info!("User {} applied for training {}", requester.user_id, id);
        Ok(ApplyOutcome::Applied)
    }

    /// Applications for a session. Admin only.
    pub fn training_applicants(
        &self,
        id: i64,
        requester: &Requester,
    ) -> Result<Vec<TrainingApplication>, StorageError> {
        require_admin(requester)?;
        Ok(lock(&self.applications)?
            .iter()
            .filter(|a| a.training_id == id)
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn admin() -> Requester {
        Requester::admin(1)
    }

    fn tip(title: &str) -> NewTip {
        NewTip {
            title: title.to_string(),
            description: "Check frames weekly during the flow".to_string(),
            icon: "bee".to_string(),
        }
    }

    fn session(title: &str, published: bool) -> NewTraining {
        NewTraining {
            title: title.to_string(),
            description: "Hands-on session".to_string(),
            date: NaiveDate::from_ymd_opt(2025, 3, 14),
            published,
        }
    }

    fn form(name: &str) -> ApplicationForm {
        ApplicationForm {
            name: name.to_string(),
            phone: "+250788123456".to_string(),
            location: "Musanze".to_string(),
            experience: "beginner".to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_tip_crud() {
        let repo = Repository::new();
        assert!(matches!(
            repo.create_tip(tip("Swarms"), &Requester::user(2)),
            Err(StorageError::Forbidden)
        ));

        let created = repo.create_tip(tip("  Swarms "), &admin()).unwrap();
        assert_eq!(created.title, "Swarms");
        assert_eq!(created.created_by, 1);
        assert_eq!(repo.list_tips().unwrap().len(), 1);

        let update = TipUpdate {
            icon: Some("leaf".to_string()),
            ..Default::default()
        };
        let updated = repo.update_tip(created.id, update, &admin()).unwrap();
        assert_eq!(updated.icon, "leaf");
        assert_eq!(updated.title, "Swarms");
        assert!(updated.updated_at.is_some());

        assert!(matches!(
            repo.delete_tip(created.id, &Requester::user(2)),
            Err(StorageError::Forbidden)
        ));
        repo.delete_tip(created.id, &admin()).unwrap();
        assert!(repo.list_tips().unwrap().is_empty());
        assert!(matches!(repo.delete_tip(created.id, &admin()), Err(StorageError::NotFound)));
    }

    #[test]
    fn test_tip_requires_title_and_description() {
        let repo = Repository::new();
        let mut blank = tip(" ");
        assert!(matches!(repo.create_tip(blank.clone(), &admin()), Err(StorageError::InvalidState(_))));
        blank.title = "Ok".to_string();
        blank.description = String::new();
        assert!(matches!(repo.create_tip(blank, &admin()), Err(StorageError::InvalidState(_))));
    }

    #[test]
    fn test_training_visibility() {
        let repo = Repository::new();
        let open = repo.create_training(session("Basic Beekeeping", true), &admin()).unwrap();
        let draft = repo.create_training(session("Hive Management", false), &admin()).unwrap();
        let user = Requester::user(5);

        let visible = repo.list_training(&user).unwrap();
        assert_eq!(visible.len(), 1);
        assert_eq!(visible[0].applicants, None);

        assert!(repo.get_training(open.id, &user).is_ok());
        assert!(matches!(repo.get_training(draft.id, &user), Err(StorageError::NotFound)));
        assert!(repo.get_training(draft.id, &admin()).is_ok());

        let all = repo.list_training(&admin()).unwrap();
        assert_eq!(all.len(), 2);
        assert!(all.iter().all(|r| r.applicants == Some(0)));
    }

    #[test]
    fn test_apply_once_per_user() {
        let repo = Repository::new();
        let open = repo.create_training(session("Basic Beekeeping", true), &admin()).unwrap();
        let draft = repo.create_training(session("Hive Management", false), &admin()).unwrap();

        assert_eq!(
            repo.apply_training(open.id, form("Amina"), &Requester::user(5)).unwrap(),
            ApplyOutcome::Applied
        );
        assert_eq!(
            repo.apply_training(open.id, form("Amina"), &Requester::user(5)).unwrap(),
            ApplyOutcome::AlreadyApplied
        );
        repo.apply_training(open.id, form("Jean"), &Requester::user(6)).unwrap();

        assert!(matches!(
            repo.apply_training(draft.id, form("Amina"), &Requester::user(5)),
            Err(StorageError::InvalidState(_))
        ));

        let listed = repo.list_training(&admin()).unwrap();
        assert_eq!(listed[0].applicants, Some(2));
        let applicants = repo.training_applicants(open.id, &admin()).unwrap();
        assert_eq!(applicants[1].form.name, "Jean");
        assert!(matches!(
            repo.training_applicants(open.id, &Requester::user(5)),
            Err(StorageError::Forbidden)
        ));
    }

    #[test]
    fn test_update_and_delete_training() {
        let repo = Repository::new();
        let draft = repo.create_training(session("Hive Management", false), &admin()).unwrap();

        let publish = TrainingUpdate {
            published: Some(true),
            ..Default::default()
        };
        let updated = repo.update_training(draft.id, publish, &admin()).unwrap();
        assert!(updated.published);
        assert_eq!(updated.date, NaiveDate::from_ymd_opt(2025, 3, 14));

        repo.apply_training(draft.id, form("Amina"), &Requester::user(5)).unwrap();
        repo.delete_training(draft.id, &admin()).unwrap();
        assert!(repo.training_applicants(draft.id, &admin()).unwrap().is_empty());
        assert!(matches!(
            repo.update_training(draft.id, TrainingUpdate::default(), &admin()),
            Err(StorageError::NotFound)
        ));
    }
}

use std::sync::Arc;
use uuid::Uuid;
use chrono::Months;

use crate::{
    auth::{hash_password, verify_password},
    config::UploadConfig,
    domain::*,
    error::{AppError, Result},
    repository::UserRepository,
    service::{clock::Clock, lifecycle, validation},
    uploads::check_blob,
};

/// The membership lifecycle engine: registration, login gating, status
/// overrides, id reassignment and the expiry sweep applied on reads.
pub struct MemberService {
    repo: Arc<dyn UserRepository>,
    clock: Arc<dyn Clock>,
    limits: UploadConfig,
}

impl MemberService {
    pub fn new(
        repo: Arc<dyn UserRepository>,
        clock: Arc<dyn Clock>,
        limits: UploadConfig,
    ) -> Self {
        Self { repo, clock, limits }
    }

    /// Applies the expiry rule and writes the new status back if it flipped.
    async fn expire_if_due(&self, user: &mut User) -> Result<bool> {
        if !lifecycle::apply_expiry(user, self.clock.today()) {
            return Ok(false);
        }

        self.repo.set_status(&user.id, MemberStatus::Expired).await?;
        tracing::info!(
            "Membership {} expired (expiry date {})",
            user.id,
            user.expiry_date
        );
        Ok(true)
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<User> {
        let (mut user, stored) = self.repo
            .find_credentials(email)
            .await?
            .ok_or(AppError::InvalidCredentials)?;

        self.expire_if_due(&mut user).await?;

        let gate = match user.status {
            MemberStatus::Pending => Some(AppError::AccountPending),
            MemberStatus::Suspended => Some(AppError::AccountSuspended),
            MemberStatus::Expired => Some(AppError::AccountExpired),
            MemberStatus::Active => None,
        };
        if let Some(err) = gate {
            tracing::warn!("Login refused for {}: {:?}", user.id, user.status);
            return Err(err);
        }

        if !verify_password(password, &stored) {
            tracing::warn!("Login refused for {}: bad password", user.id);
            return Err(AppError::InvalidCredentials);
        }

        tracing::info!("User {} logged in", user.id);
        Ok(user)
    }

    pub async fn register(&self, request: RegisterRequest) -> Result<User> {
        if self.repo.find_by_email(&request.email).await?.is_some() {
            return Err(AppError::DuplicateEmail);
        }

        validation::validate_registration(&request)?;

        // Members may upload their own papers; issued documents come from
        // the secretariat only.
        let documents = request.documents.map(|d| UserDocuments {
            cac_certificate: d.cac_certificate,
            logo: d.logo,
            evidence: d.evidence,
            issued_id_card: None,
            issued_certificate: None,
        }).unwrap_or_default();

        self.check_profile_blobs(request.profile_image.as_deref(), &documents)?;

        let today = self.clock.today();
        let user = User {
            id: Uuid::new_v4().to_string(),
            email: request.email,
            role: Role::Member,
            status: MemberStatus::Pending,
            category: request.business_category.trim().to_string(),
            first_name: request.first_name.trim().to_string(),
            last_name: request.last_name.trim().to_string(),
            phone: request.phone,
            business_name: request.business_name.trim().to_string(),
            business_address: request.business_address.trim().to_string(),
            state: request.state,
            materials: request.materials,
            machinery: request.machinery,
            monthly_volume: request.monthly_volume.unwrap_or_default(),
            employees: request.employees.unwrap_or_default().round() as i64,
            date_joined: today,
            expiry_date: today.checked_add_months(Months::new(12)).unwrap_or(today),
            profile_image: request.profile_image,
            documents,
        };

        let password_hash = hash_password(&request.password)?;
        let created = self.repo.create(&user, &password_hash).await?;

        tracing::info!("Registered {} ({}) pending approval", created.id, created.business_name);
        Ok(created)
    }

    fn check_profile_blobs(&self, profile_image: Option<&str>, documents: &UserDocuments) -> Result<()> {
        let max = self.limits.max_document_bytes;
        let blobs = [
            ("profileImage", profile_image),
            ("cacCertificate", documents.cac_certificate.as_deref()),
            ("logo", documents.logo.as_deref()),
            ("evidence", documents.evidence.as_deref()),
            ("issuedIdCard", documents.issued_id_card.as_deref()),
            ("issuedCertificate", documents.issued_certificate.as_deref()),
        ];

        for (field, blob) in blobs {
            if let Some(blob) = blob {
                check_blob(field, blob, max)?;
            }
        }
        Ok(())
    }

    /// Every user, with lapsed memberships transitioned and persisted.
    pub async fn get_users(&self) -> Result<Vec<User>> {
        let (users, _) = self.evaluate_all().await?;
        Ok(users)
    }

    /// Runs the expiry sweep and returns only the users it transitioned.
    pub async fn check_expired(&self) -> Result<Vec<User>> {
        let (_, transitioned) = self.evaluate_all().await?;
        Ok(transitioned)
    }

    async fn evaluate_all(&self) -> Result<(Vec<User>, Vec<User>)> {
        let mut users = self.repo.list().await?;
        let mut transitioned = Vec::new();

        for user in users.iter_mut() {
            if self.expire_if_due(user).await? {
                transitioned.push(user.clone());
            }
        }

        Ok((users, transitioned))
    }

    /// The evaluated record. Unlike the bulk read this does not write the
    /// transition back.
    pub async fn get_user(&self, id: &str) -> Result<User> {
        let mut user = self.repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::UserNotFound(id.to_string()))?;

        lifecycle::apply_expiry(&mut user, self.clock.today());
        Ok(user)
    }

    pub async fn days_until_expiry(&self, id: &str) -> Result<i64> {
        let user = self.get_user(id).await?;
        Ok(lifecycle::days_until_expiry(&user, self.clock.today()))
    }

    pub async fn update_user(&self, id: &str, update: UpdateUserRequest) -> Result<User> {
        validation::validate_update(&update)?;

        let mut user = self.repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::UserNotFound(id.to_string()))?;

        if let Some(email) = &update.email {
            if email != &user.email && self.repo.find_by_email(email).await?.is_some() {
                return Err(AppError::DuplicateEmail);
            }
        }

        let uploads = UserDocuments {
            cac_certificate: update.cac_certificate.clone(),
            logo: update.logo.clone(),
            evidence: update.evidence.clone(),
            ..Default::default()
        };
        self.check_profile_blobs(update.profile_image.as_deref(), &uploads)?;

        macro_rules! assign {
            ($($field:ident),* $(,)?) => {
                $(if let Some(value) = update.$field { user.$field = value; })*
            };
        }
        assign!(
            email, first_name, last_name, phone, business_name, business_address,
            state, materials, machinery, monthly_volume, status, expiry_date,
            category, role,
        );

        if let Some(employees) = update.employees {
            user.employees = employees.round() as i64;
        }
        if update.profile_image.is_some() {
            user.profile_image = update.profile_image;
        }
        if uploads.cac_certificate.is_some() {
            user.documents.cac_certificate = uploads.cac_certificate;
        }
        if uploads.logo.is_some() {
            user.documents.logo = uploads.logo;
        }
        if uploads.evidence.is_some() {
            user.documents.evidence = uploads.evidence;
        }

        // An edited expiry date takes effect immediately.
        lifecycle::apply_expiry(&mut user, self.clock.today());

        self.repo.save(&user).await
    }

    /// Administrative override: any status may move to any other.
    pub async fn update_status(&self, id: &str, status: MemberStatus) -> Result<User> {
        let user = self.repo.set_status(id, status).await?;
        tracing::info!("Status of {} set to {:?}", id, status);
        Ok(user)
    }

    pub async fn reassign_id(&self, current_id: &str, new_id: &str) -> Result<User> {
        let new_id = new_id.trim();
        if new_id.is_empty() {
            return Err(AppError::ValidationFailed(vec!["newId is required".to_string()]));
        }

        self.repo.reassign_id(current_id, new_id).await
    }

    pub async fn issue_document(&self, id: &str, kind: IssuedDocument, blob: String) -> Result<User> {
        check_blob(kind.as_path(), &blob, self.limits.max_document_bytes)?;

        let mut user = self.repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::UserNotFound(id.to_string()))?;

        match kind {
            IssuedDocument::IdCard => user.documents.issued_id_card = Some(blob),
            IssuedDocument::Certificate => user.documents.issued_certificate = Some(blob),
        }

        let saved = self.repo.save(&user).await?;
        tracing::info!("Issued {} to {}", kind.as_path(), id);
        Ok(saved)
    }

    /// Active members as listed in the public directory.
    pub async fn directory(&self, filter: &DirectoryFilter) -> Result<Vec<DirectoryEntry>> {
        let query = filter.q.as_ref().map(|q| q.trim().to_lowercase()).filter(|q| !q.is_empty());

        let entries = self.get_users().await?
            .iter()
            .filter(|u| !u.is_admin() && u.status == MemberStatus::Active)
            .filter(|u| filter.category.as_ref().map_or(true, |c| &u.category == c))
            .filter(|u| filter.state.as_ref().map_or(true, |s| &u.state == s))
            .filter(|u| {
                query.as_ref().map_or(true, |q| {
                    u.business_name.to_lowercase().contains(q)
                        || u.materials.to_lowercase().contains(q)
                })
            })
            .map(DirectoryEntry::from)
            .collect();

        Ok(entries)
    }
}

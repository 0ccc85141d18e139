//! User record service: account CRUD under the permission policy, password
//! hashing at the boundary, and the safe projection on every read path.

use std::sync::Arc;

use crate::authz::{AccessPolicy, Decision, Operation};
use crate::db::{NewUserRecord, ScheduleStore, UserRecordChanges};
use crate::error::{AppError, Result};
use crate::models::{
    CreateUserRequest, DoctorOption, Identity, LoginResponse, Role, UpdateUserRequest, UserView,
};
use crate::security::{jwt, password};

pub type AuthenticatedUser = LoginResponse;

#[derive(Clone)]
pub struct UserService {
    store: Arc<dyn ScheduleStore>,
    policy: Arc<dyn AccessPolicy>,
}

impl UserService {
    pub fn new(store: Arc<dyn ScheduleStore>, policy: Arc<dyn AccessPolicy>) -> Self {
        Self { store, policy }
    }

    pub async fn list(&self, actor: Identity) -> Result<Vec<UserView>> {
        self.require(actor, Operation::ListUsers)?;
        let users = self.store.list_users().await?;
        Ok(users.into_iter().map(UserView::from).collect())
    }

    /// `{id, username}` projection of all doctors, for selection UIs.
    pub async fn list_doctors(&self, actor: Identity) -> Result<Vec<DoctorOption>> {
        self.require(actor, Operation::ListDoctors)?;
        let doctors = self.store.list_users_by_role(Role::Doctor).await?;
        Ok(doctors
            .into_iter()
            .map(|d| DoctorOption {
                id: d.id,
                username: d.username,
            })
            .collect())
    }

    pub async fn get(&self, actor: Identity, id: i64) -> Result<UserView> {
        self.require(actor, Operation::ReadUser)?;
        let user = self
            .store
            .find_user(id)
            .await?
            .ok_or_else(|| AppError::NotFound("user not found".to_string()))?;
        Ok(user.into())
    }

    pub async fn create(&self, actor: Identity, req: CreateUserRequest) -> Result<UserView> {
        self.require(actor, Operation::CreateUser)?;
        if req.username.trim().is_empty() {
            return Err(AppError::Validation("username must not be empty".to_string()));
        }

        let password_hash = password::hash_password(&req.password)?;
        let user = self
            .store
            .create_user(NewUserRecord {
                username: req.username,
                password_hash,
                role: req.role,
                area: req.area,
                room: req.room,
            })
            .await?;

        tracing::info!(
            user_id = user.id,
            role = %user.role,
            actor_id = actor.id,
            "user created"
        );
        Ok(user.into())
    }

    /// Partial update of username/password/area/room. Roles never change
    /// here; a supplied password is re-hashed before it reaches the store.
    pub async fn update(&self, actor: Identity, id: i64, req: UpdateUserRequest) -> Result<UserView> {
        self.require(actor, Operation::UpdateUser)?;

        let password_hash = match req.password.as_deref() {
            Some(p) => Some(password::hash_password(p)?),
            None => None,
        };

        let updated = self
            .store
            .update_user(
                id,
                UserRecordChanges {
                    username: req.username,
                    password_hash,
                    area: req.area,
                    room: req.room,
                },
            )
            .await?
            .ok_or_else(|| AppError::NotFound("user not found".to_string()))?;

        tracing::info!(user_id = id, actor_id = actor.id, "user updated");
        Ok(updated.into())
    }

    /// Deletes an account unless an appointment still references it on
    /// either side.
    pub async fn delete(&self, actor: Identity, id: i64) -> Result<()> {
        self.require(actor, Operation::DeleteUser)?;

        if self.store.find_user(id).await?.is_none() {
            return Err(AppError::NotFound("user not found".to_string()));
        }
        if self.store.user_has_appointments(id).await? {
            return Err(AppError::Conflict(
                "user is referenced by existing appointments".to_string(),
            ));
        }
        if !self.store.delete_user(id).await? {
            return Err(AppError::NotFound("user not found".to_string()));
        }

        tracing::info!(user_id = id, actor_id = actor.id, "user deleted");
        Ok(())
    }

    /// Credential check and token mint for the login endpoint. Unknown
    /// username and wrong password are indistinguishable to the caller.
    pub async fn authenticate(&self, username: &str, pass: &str) -> Result<AuthenticatedUser> {
        let user = self
            .store
            .find_user_by_username(username)
            .await?
            .ok_or_else(|| {
                AppError::Authentication("invalid username or password".to_string())
            })?;

        password::verify_password(pass, &user.password_hash)?;
        let access_token = jwt::generate_token(user.id, user.role)?;

        tracing::info!(user_id = user.id, "user logged in");
        Ok(LoginResponse {
            user: user.into(),
            access_token,
            token_type: "Bearer".to_string(),
            expires_in: jwt::TOKEN_TTL_SECS,
        })
    }

    fn require(&self, actor: Identity, op: Operation) -> Result<()> {
        match self.policy.check(actor, op) {
            Decision::Denied(reason) => Err(AppError::Forbidden(reason)),
            _ => Ok(()),
        }
    }
}

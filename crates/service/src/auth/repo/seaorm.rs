use chrono::Utc;
use sea_orm::{ActiveModelTrait, DatabaseConnection, EntityTrait, Set, SqlErr};
use uuid::Uuid;

use models::errors::ModelError;
use models::{user, user_credentials};

use crate::auth::domain::{AuthUser, Credentials, NewAccount};
use crate::auth::errors::AuthError;
use crate::auth::repository::AuthRepository;

pub struct SeaOrmAuthRepository {
    pub db: DatabaseConnection,
}

fn to_auth_user(u: user::Model) -> Result<AuthUser, AuthError> {
    let role = u.role().map_err(|e| AuthError::Repository(e.to_string()))?;
    Ok(AuthUser {
        id: u.id,
        email: u.email,
        first_name: u.first_name,
        last_name: u.last_name,
        role,
        avatar: u.avatar,
        team_id: u.team_id,
        is_verified: u.is_verified,
        verification_code: u.verification_code,
        verification_code_expires_at: u.verification_code_expires_at.map(|t| t.with_timezone(&Utc)),
    })
}

fn map_model_err(e: ModelError) -> AuthError {
    match e {
        ModelError::Validation(msg) => AuthError::Validation(msg),
        ModelError::Db(db) => match db.sql_err() {
            Some(SqlErr::UniqueConstraintViolation(_)) => AuthError::Conflict,
            Some(SqlErr::ForeignKeyConstraintViolation(_)) => {
                AuthError::Validation("invalid reference to related record".into())
            }
            _ => AuthError::Repository(db.to_string()),
        },
    }
}

#[async_trait::async_trait]
impl AuthRepository for SeaOrmAuthRepository {
    async fn find_user_by_email(&self, email: &str) -> Result<Option<AuthUser>, AuthError> {
        let res = user::find_by_email(&self.db, email).await.map_err(map_model_err)?;
        res.map(to_auth_user).transpose()
    }

    async fn find_user_by_id(&self, id: Uuid) -> Result<Option<AuthUser>, AuthError> {
        let res = user::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(|e| AuthError::Repository(e.to_string()))?;
        res.map(to_auth_user).transpose()
    }

    async fn create_user(&self, account: NewAccount) -> Result<AuthUser, AuthError> {
        let created = user::create(&self.db, user::NewUser {
            email: account.email,
            first_name: account.first_name,
            last_name: account.last_name,
            role: account.role,
            team_id: account.team_id,
            verification_code: account.verification_code,
            verification_code_expires_at: account.verification_code_expires_at.map(Into::into),
            is_verified: account.is_verified,
        })
        .await
        .map_err(map_model_err)?;
        to_auth_user(created)
    }

    async fn mark_verified(&self, user_id: Uuid) -> Result<(), AuthError> {
        let found = user::Entity::find_by_id(user_id)
            .one(&self.db)
            .await
            .map_err(|e| AuthError::Repository(e.to_string()))?
            .ok_or(AuthError::NotFound)?;
        let mut am: user::ActiveModel = found.into();
        am.is_verified = Set(true);
        am.verification_code = Set(None);
        am.verification_code_expires_at = Set(None);
        am.updated_at = Set(Utc::now().into());
        am.update(&self.db).await.map_err(|e| AuthError::Repository(e.to_string()))?;
        Ok(())
    }

    async fn get_credentials(&self, user_id: Uuid) -> Result<Option<Credentials>, AuthError> {
        let res = user_credentials::find_by_user(&self.db, user_id).await.map_err(map_model_err)?;
        Ok(res.map(|c| Credentials { user_id: c.user_id, password_hash: c.password_hash, password_algorithm: c.password_algorithm }))
    }

    async fn upsert_password(&self, user_id: Uuid, password_hash: String, password_algorithm: String) -> Result<Credentials, AuthError> {
        let c = user_credentials::upsert_password(&self.db, user_id, password_hash, &password_algorithm)
            .await
            .map_err(map_model_err)?;
        Ok(Credentials { user_id: c.user_id, password_hash: c.password_hash, password_algorithm: c.password_algorithm })
    }
}

use sea_orm::entity::prelude::*;
use sea_orm::Set;
use uuid::Uuid;
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::errors::ModelError;
use crate::user;

/// Password hash kept apart from `users` so it never rides along with profile reads.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "user_credentials")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(unique)]
    pub user_id: Uuid,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub password_algorithm: String,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation { User }

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef {
        match self {
            Relation::User => Entity::belongs_to(user::Entity)
                .from(Column::UserId)
                .to(user::Column::Id)
                .on_delete(ForeignKeyAction::Cascade)
                .into(),
        }
    }
}

impl ActiveModelBehavior for ActiveModel {}

pub async fn find_by_user<C: ConnectionTrait>(db: &C, user_id: Uuid) -> Result<Option<Model>, ModelError> {
    Ok(Entity::find().filter(Column::UserId.eq(user_id)).one(db).await?)
}

/// Insert or replace the stored hash for `user_id`.
pub async fn upsert_password<C: ConnectionTrait>(
    db: &C,
    user_id: Uuid,
    password_hash: String,
    algorithm: &str,
) -> Result<Model, ModelError> {
    if password_hash.trim().is_empty() {
        return Err(ModelError::validation("password hash required"));
    }
    let now = Utc::now().into();
    match find_by_user(db, user_id).await? {
        Some(existing) => {
            let mut am: ActiveModel = existing.into();
            am.password_hash = Set(password_hash);
            am.password_algorithm = Set(algorithm.to_string());
            am.updated_at = Set(now);
            Ok(am.update(db).await?)
        }
        None => {
            let am = ActiveModel {
                id: Set(Uuid::new_v4()),
                user_id: Set(user_id),
                password_hash: Set(password_hash),
                password_algorithm: Set(algorithm.to_string()),
                created_at: Set(now),
                updated_at: Set(now),
            };
            Ok(am.insert(db).await?)
        }
    }
}

pub async fn verify_password<C: ConnectionTrait>(
    db: &C,
    user_id: Uuid,
    verify_fn: impl Fn(&str) -> bool,
) -> Result<bool, ModelError> {
    let creds = find_by_user(db, user_id).await?;
    Ok(match creds { Some(c) => verify_fn(&c.password_hash), None => false })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::enums::Role;

    #[tokio::test]
    async fn upsert_replaces_existing_hash() -> Result<(), anyhow::Error> {
        let db = crate::db::connect_memory().await?;
        let u = user::create(&db, user::NewUser {
            email: "tech@example.com".into(),
            first_name: "Tess".into(),
            last_name: "Tech".into(),
            role: Role::Technician,
            team_id: None,
            verification_code: None,
            verification_code_expires_at: None,
            is_verified: true,
        }).await?;

        let first = upsert_password(&db, u.id, "hash-one".into(), "argon2id").await?;
        let second = upsert_password(&db, u.id, "hash-two".into(), "argon2id").await?;
        assert_eq!(first.id, second.id);
        assert!(verify_password(&db, u.id, |h| h == "hash-two").await?);
        assert!(!verify_password(&db, u.id, |h| h == "hash-one").await?);
        assert!(!verify_password(&db, Uuid::new_v4(), |_| true).await?);
        assert!(upsert_password(&db, u.id, "  ".into(), "argon2id").await.is_err());
        Ok(())
    }
}

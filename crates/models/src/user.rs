use sea_orm::{entity::prelude::*, Set};
use uuid::Uuid;
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::enums::Role;
use crate::errors::ModelError;
use crate::maintenance_team;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "users")]
#[serde(rename_all = "camelCase")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(unique)]
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub role: String,
    pub avatar: Option<String>,
    pub team_id: Option<Uuid>,
    pub is_verified: bool,
    #[serde(skip_serializing, default)]
    pub verification_code: Option<String>,
    #[serde(skip_serializing, default)]
    pub verification_code_expires_at: Option<DateTimeWithTimeZone>,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation {
    Team,
}

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef {
        match self {
            Relation::Team => Entity::belongs_to(maintenance_team::Entity)
                .from(Column::TeamId)
                .to(maintenance_team::Column::Id)
                .on_delete(ForeignKeyAction::SetNull)
                .into(),
        }
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub fn role(&self) -> Result<Role, ModelError> {
        self.role.parse()
    }

    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// Fields needed to insert a user; the password lives in `user_credentials`.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub role: Role,
    pub team_id: Option<Uuid>,
    pub verification_code: Option<String>,
    pub verification_code_expires_at: Option<DateTimeWithTimeZone>,
    pub is_verified: bool,
}

pub fn validate_email(email: &str) -> Result<(), ModelError> {
    let email = email.trim();
    if email.is_empty() || !email.contains('@') { return Err(ModelError::validation("invalid email")); }
    if email.len() > 255 { return Err(ModelError::validation("email too long (<=255)")); }
    Ok(())
}

pub fn validate_name(field: &str, value: &str) -> Result<(), ModelError> {
    if value.trim().is_empty() { return Err(ModelError::Validation(format!("{field} required"))); }
    if value.len() > 128 { return Err(ModelError::Validation(format!("{field} too long (<=128)"))); }
    Ok(())
}

/// Emails are compared case-insensitively by storing them lower-cased.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

pub async fn create<C: ConnectionTrait>(db: &C, new: NewUser) -> Result<Model, ModelError> {
    validate_email(&new.email)?;
    validate_name("firstName", &new.first_name)?;
    validate_name("lastName", &new.last_name)?;
    let now = Utc::now().into();
    let am = ActiveModel {
        id: Set(Uuid::new_v4()),
        email: Set(normalize_email(&new.email)),
        first_name: Set(new.first_name.trim().to_string()),
        last_name: Set(new.last_name.trim().to_string()),
        role: Set(new.role.as_str().to_string()),
        avatar: Set(None),
        team_id: Set(new.team_id),
        is_verified: Set(new.is_verified),
        verification_code: Set(new.verification_code),
        verification_code_expires_at: Set(new.verification_code_expires_at),
        created_at: Set(now),
        updated_at: Set(now),
    };
    Ok(am.insert(db).await?)
}

pub async fn find_by_email<C: ConnectionTrait>(db: &C, email: &str) -> Result<Option<Model>, ModelError> {
    Ok(Entity::find()
        .filter(Column::Email.eq(normalize_email(email)))
        .one(db)
        .await?)
}

pub async fn hard_delete<C: ConnectionTrait>(db: &C, id: Uuid) -> Result<(), ModelError> {
    Entity::delete_by_id(id).exec(db).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_user(email: &str) -> NewUser {
        NewUser {
            email: email.into(),
            first_name: "Ada".into(),
            last_name: "Lovelace".into(),
            role: Role::Technician,
            team_id: None,
            verification_code: Some("123456".into()),
            verification_code_expires_at: None,
            is_verified: false,
        }
    }

    #[test]
    fn email_validation() {
        assert!(validate_email("a@b.com").is_ok());
        assert!(validate_email("nope").is_err());
        assert!(validate_email("   ").is_err());
    }

    #[tokio::test]
    async fn create_normalizes_email_and_hides_code() -> Result<(), anyhow::Error> {
        let db = crate::db::connect_memory().await?;
        let u = create(&db, new_user("  Ada@Example.COM ")).await?;
        assert_eq!(u.email, "ada@example.com");
        assert_eq!(u.role()?, Role::Technician);
        assert_eq!(u.full_name(), "Ada Lovelace");

        let found = find_by_email(&db, "ADA@example.com").await?.unwrap();
        assert_eq!(found.id, u.id);

        let json = serde_json::to_value(&found)?;
        assert!(json.get("verificationCode").is_none());
        assert_eq!(json["firstName"], "Ada");
        Ok(())
    }

    #[tokio::test]
    async fn duplicate_email_is_a_db_error() -> Result<(), anyhow::Error> {
        let db = crate::db::connect_memory().await?;
        create(&db, new_user("dup@example.com")).await?;
        let err = create(&db, new_user("dup@example.com")).await.unwrap_err();
        assert!(matches!(err, ModelError::Db(_)));
        Ok(())
    }
}

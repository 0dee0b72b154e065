//! MongoDB implementations of the repository traits.
//!
//! Field names match the collections as provisioned: `usuarios`, `roles`,
//! `historial_act_usuarios` and `auditoriaUsuarios` all predate this
//! service, so the documents keep their Spanish field names and string
//! `_id`s.

use crate::activity::{ActivityRecord, AuditRecord};
use crate::error::RepositoryError;
use crate::factory::{RoleFactory, StoredRole, StoredUser, UserFactory};
use crate::repository::{ActivityRepository, AuditRepository, RoleRepository, UserRepository};
use crate::role::Role;
use crate::user::User;
use crate::values::{RoleId, UserId};
use async_trait::async_trait;
use chrono::{DateTime, NaiveTime, Utc};
use futures::TryStreamExt;
use mongodb::bson::{self, doc, Bson};
use mongodb::options::IndexOptions;
use mongodb::{Collection, Database, IndexModel};
use serde::{Deserialize, Serialize};
use tracing::instrument;
use uuid::Uuid;

const USERS_COLLECTION: &str = "usuarios";
const ROLES_COLLECTION: &str = "roles";
const ACTIVITY_COLLECTION: &str = "historial_act_usuarios";
const AUDIT_COLLECTION: &str = "auditoriaUsuarios";

fn to_bson_datetime(dt: DateTime<Utc>) -> bson::DateTime {
    bson::DateTime::from_millis(dt.timestamp_millis())
}

fn from_bson_datetime(dt: bson::DateTime) -> DateTime<Utc> {
    DateTime::from_timestamp_millis(dt.timestamp_millis()).unwrap_or_default()
}

/// `usuarios` document.
#[derive(Debug, Serialize, Deserialize)]
struct UserDocument {
    #[serde(rename = "_id")]
    id: String,
    nombre: String,
    apellido: String,
    #[serde(rename = "fechaNacimiento")]
    birth_date: bson::DateTime,
    correo: String,
    telefono: String,
    direccion: String,
    #[serde(rename = "fotoPerfil", default)]
    photo: String,
    rol: String,
    #[serde(rename = "preferencias", default)]
    preferences: Vec<String>,
    #[serde(rename = "createdAt")]
    created_at: bson::DateTime,
    #[serde(rename = "updatedAt")]
    updated_at: bson::DateTime,
}

impl UserDocument {
    fn from_user(user: &User) -> Self {
        // Dates of birth are stored as UTC midnight; only the date part
        // carries meaning.
        let birth_midnight = user
            .birth_date()
            .as_date()
            .and_time(NaiveTime::MIN)
            .and_utc();
        Self {
            id: user.id().to_string(),
            nombre: user.first_name().as_str().to_string(),
            apellido: user.last_name().as_str().to_string(),
            birth_date: to_bson_datetime(birth_midnight),
            correo: user.email().as_str().to_string(),
            telefono: user.phone().as_str().to_string(),
            direccion: user.address().as_str().to_string(),
            photo: user.photo_url().as_str().to_string(),
            rol: user.role_id().to_string(),
            preferences: user.preferences().to_vec(),
            created_at: to_bson_datetime(user.created_at()),
            updated_at: to_bson_datetime(user.updated_at()),
        }
    }

    fn into_user(self) -> Result<User, RepositoryError> {
        UserFactory::rehydrate(StoredUser {
            id: self.id,
            first_name: self.nombre,
            last_name: self.apellido,
            birth_date: from_bson_datetime(self.birth_date).date_naive(),
            email: self.correo,
            phone: self.telefono,
            address: self.direccion,
            photo_url: self.photo,
            role_id: self.rol,
            preferences: self.preferences,
            created_at: from_bson_datetime(self.created_at),
            updated_at: from_bson_datetime(self.updated_at),
        })
        .map_err(RepositoryError::Corrupt)
    }
}

/// `roles` document.
#[derive(Debug, Serialize, Deserialize)]
struct RoleDocument {
    #[serde(rename = "_id")]
    id: String,
    nombre: String,
    #[serde(rename = "idRolKeycloak", default)]
    keycloak_id: Option<String>,
}

impl RoleDocument {
    fn into_role(self) -> Result<Role, RepositoryError> {
        RoleFactory::rehydrate(StoredRole {
            id: self.id,
            name: self.nombre,
            key: self.keycloak_id,
        })
        .map_err(RepositoryError::Corrupt)
    }
}

/// `historial_act_usuarios` document.
#[derive(Debug, Serialize, Deserialize)]
struct ActivityDocument {
    #[serde(rename = "_id")]
    id: String,
    #[serde(rename = "_idUsuario")]
    user_id: String,
    accion: String,
    timestamp: bson::DateTime,
}

impl ActivityDocument {
    fn from_record(record: &ActivityRecord) -> Self {
        Self {
            id: record.id.to_string(),
            user_id: record.user_id.to_string(),
            accion: record.action.clone(),
            timestamp: to_bson_datetime(record.timestamp),
        }
    }

    fn into_record(self) -> Result<ActivityRecord, RepositoryError> {
        let parse = |s: &str| {
            Uuid::parse_str(s).map_err(|_| {
                RepositoryError::Corrupt(crate::error::FieldError::InvalidUserId(s.to_string()))
            })
        };
        Ok(ActivityRecord {
            id: parse(&self.id)?,
            user_id: parse(&self.user_id)?,
            action: self.accion,
            timestamp: from_bson_datetime(self.timestamp),
        })
    }
}

/// `auditoriaUsuarios` document.
#[derive(Debug, Serialize, Deserialize)]
struct AuditDocument {
    #[serde(rename = "_id")]
    id: String,
    #[serde(rename = "idUsuario")]
    user_id: String,
    level: String,
    tipo: String,
    mensaje: String,
    timestamp: bson::DateTime,
}

impl AuditDocument {
    fn from_record(record: &AuditRecord) -> Self {
        Self {
            id: record.id.to_string(),
            user_id: record.user_id.to_string(),
            level: record.level.as_str().to_string(),
            tipo: record.event_type.clone(),
            mensaje: record.message.clone(),
            timestamp: to_bson_datetime(record.timestamp),
        }
    }
}

/// User repository over the `usuarios` collection.
#[derive(Debug, Clone)]
pub struct MongoUserRepository {
    collection: Collection<UserDocument>,
}

impl MongoUserRepository {
    pub fn new(database: &Database) -> Self {
        Self {
            collection: database.collection(USERS_COLLECTION),
        }
    }

    /// Create the unique email index. The handler checks for duplicates
    /// before writing; the index backstops the read-then-write race.
    pub async fn create_indexes(&self) -> Result<(), RepositoryError> {
        let email_unique = IndexModel::builder()
            .keys(doc! { "correo": 1 })
            .options(IndexOptions::builder().unique(true).build())
            .build();
        self.collection.create_index(email_unique).await?;
        Ok(())
    }
}

#[async_trait]
impl UserRepository for MongoUserRepository {
    #[instrument(skip(self, user), fields(user_id = %user.id()))]
    async fn create(&self, user: &User) -> Result<(), RepositoryError> {
        self.collection
            .insert_one(UserDocument::from_user(user))
            .await?;
        Ok(())
    }

    #[instrument(skip(self))]
    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, RepositoryError> {
        let doc = self
            .collection
            .find_one(doc! { "_id": id.to_string() })
            .await?;
        doc.map(UserDocument::into_user).transpose()
    }

    #[instrument(skip(self, email))]
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, RepositoryError> {
        let doc = self.collection.find_one(doc! { "correo": email }).await?;
        doc.map(UserDocument::into_user).transpose()
    }

    #[instrument(skip(self))]
    async fn find_all(&self) -> Result<Vec<User>, RepositoryError> {
        let docs: Vec<UserDocument> = self.collection.find(doc! {}).await?.try_collect().await?;
        docs.into_iter().map(UserDocument::into_user).collect()
    }

    #[instrument(skip(self, user), fields(user_id = %user.id()))]
    async fn update(&self, user: &User) -> Result<(), RepositoryError> {
        let update = doc! {
            "$set": {
                "nombre": user.first_name().as_str(),
                "apellido": user.last_name().as_str(),
                "telefono": user.phone().as_str(),
                "direccion": user.address().as_str(),
                "fotoPerfil": user.photo_url().as_str(),
                "preferencias": Bson::from(user.preferences().to_vec()),
                "updatedAt": to_bson_datetime(user.updated_at()),
            }
        };
        let result = self
            .collection
            .update_one(doc! { "_id": user.id().to_string() }, update)
            .await?;
        if result.matched_count == 0 {
            tracing::warn!(user_id = %user.id(), "Update matched no stored user");
        }
        Ok(())
    }
}

/// Role repository over the `roles` collection.
#[derive(Debug, Clone)]
pub struct MongoRoleRepository {
    collection: Collection<RoleDocument>,
}

impl MongoRoleRepository {
    pub fn new(database: &Database) -> Self {
        Self {
            collection: database.collection(ROLES_COLLECTION),
        }
    }
}

#[async_trait]
impl RoleRepository for MongoRoleRepository {
    #[instrument(skip(self))]
    async fn find_by_id(&self, id: &RoleId) -> Result<Option<Role>, RepositoryError> {
        let doc = self
            .collection
            .find_one(doc! { "_id": id.to_string() })
            .await?;
        doc.map(RoleDocument::into_role).transpose()
    }

    #[instrument(skip(self))]
    async fn find_by_name(&self, name: &str) -> Result<Option<Role>, RepositoryError> {
        let doc = self.collection.find_one(doc! { "nombre": name }).await?;
        doc.map(RoleDocument::into_role).transpose()
    }

    #[instrument(skip(self))]
    async fn find_all(&self) -> Result<Vec<Role>, RepositoryError> {
        let docs: Vec<RoleDocument> = self.collection.find(doc! {}).await?.try_collect().await?;
        docs.into_iter().map(RoleDocument::into_role).collect()
    }
}

/// Activity repository over the `historial_act_usuarios` collection.
#[derive(Debug, Clone)]
pub struct MongoActivityRepository {
    collection: Collection<ActivityDocument>,
}

impl MongoActivityRepository {
    pub fn new(database: &Database) -> Self {
        Self {
            collection: database.collection(ACTIVITY_COLLECTION),
        }
    }
}

#[async_trait]
impl ActivityRepository for MongoActivityRepository {
    #[instrument(skip(self, record), fields(record_id = %record.id))]
    async fn append(&self, record: &ActivityRecord) -> Result<(), RepositoryError> {
        self.collection
            .insert_one(ActivityDocument::from_record(record))
            .await?;
        Ok(())
    }

    #[instrument(skip(self))]
    async fn for_user_since(
        &self,
        user_id: &UserId,
        since: DateTime<Utc>,
    ) -> Result<Vec<ActivityRecord>, RepositoryError> {
        let filter = doc! {
            "_idUsuario": user_id.to_string(),
            "timestamp": { "$gte": to_bson_datetime(since) },
        };
        let docs: Vec<ActivityDocument> = self
            .collection
            .find(filter)
            .sort(doc! { "timestamp": 1 })
            .await?
            .try_collect()
            .await?;
        docs.into_iter()
            .map(ActivityDocument::into_record)
            .collect()
    }

    #[instrument(skip(self))]
    async fn find_all(&self) -> Result<Vec<ActivityRecord>, RepositoryError> {
        let docs: Vec<ActivityDocument> =
            self.collection.find(doc! {}).await?.try_collect().await?;
        docs.into_iter()
            .map(ActivityDocument::into_record)
            .collect()
    }
}

/// Audit repository over the `auditoriaUsuarios` collection.
#[derive(Debug, Clone)]
pub struct MongoAuditRepository {
    collection: Collection<AuditDocument>,
}

impl MongoAuditRepository {
    pub fn new(database: &Database) -> Self {
        Self {
            collection: database.collection(AUDIT_COLLECTION),
        }
    }
}

#[async_trait]
impl AuditRepository for MongoAuditRepository {
    #[instrument(skip(self, record), fields(record_id = %record.id))]
    async fn append(&self, record: &AuditRecord) -> Result<(), RepositoryError> {
        self.collection
            .insert_one(AuditDocument::from_record(record))
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::activity::AuditLevel;

    #[test]
    fn test_user_document_roundtrip_keeps_date_only_birth() {
        let user = crate::factory::UserFactory::create(crate::factory::NewUser {
            first_name: "Ada".into(),
            last_name: "Lovelace".into(),
            birth_date: chrono::NaiveDate::from_ymd_opt(1990, 12, 10).unwrap(),
            email: "ada@example.com".into(),
            phone: "+44 20 7946 0000".into(),
            address: "12 St James's Square, London".into(),
            photo_url: "https://cdn.example/ada.png".into(),
            role_id: Uuid::new_v4().to_string(),
            preferences: vec!["math".into()],
        })
        .unwrap();

        let doc = UserDocument::from_user(&user);
        assert_eq!(doc.id, user.id().to_string());
        assert_eq!(doc.correo, "ada@example.com");
        // Midnight UTC, so the millis are divisible by a whole day.
        assert_eq!(doc.birth_date.timestamp_millis() % 86_400_000, 0);

        let back = doc.into_user().unwrap();
        assert_eq!(back.id(), user.id());
        assert_eq!(back.birth_date(), user.birth_date());
        assert_eq!(back.preferences(), user.preferences());
    }

    #[test]
    fn test_user_document_serde_field_names() {
        let user = crate::factory::UserFactory::create(crate::factory::NewUser {
            first_name: "Ada".into(),
            last_name: "Lovelace".into(),
            birth_date: chrono::NaiveDate::from_ymd_opt(1990, 12, 10).unwrap(),
            email: "ada@example.com".into(),
            phone: "+44 20 7946 0000".into(),
            address: "12 St James's Square".into(),
            photo_url: "".into(),
            role_id: Uuid::new_v4().to_string(),
            preferences: vec![],
        })
        .unwrap();

        let doc = bson::to_document(&UserDocument::from_user(&user)).unwrap();
        for key in [
            "_id",
            "nombre",
            "apellido",
            "fechaNacimiento",
            "correo",
            "telefono",
            "direccion",
            "fotoPerfil",
            "rol",
            "preferencias",
            "createdAt",
            "updatedAt",
        ] {
            assert!(doc.contains_key(key), "missing field {key}");
        }
    }

    #[test]
    fn test_user_document_missing_optional_fields_default() {
        let raw = doc! {
            "_id": Uuid::new_v4().to_string(),
            "nombre": "Ada",
            "apellido": "Lovelace",
            "fechaNacimiento": bson::DateTime::from_millis(660787200000i64),
            "correo": "ada@example.com",
            "telefono": "+44 20 7946 0000",
            "direccion": "12 St James's Square",
            "rol": Uuid::new_v4().to_string(),
            "createdAt": bson::DateTime::now(),
            "updatedAt": bson::DateTime::now(),
        };
        let parsed: UserDocument = bson::from_document(raw).unwrap();
        assert_eq!(parsed.photo, "");
        assert!(parsed.preferences.is_empty());
        assert!(parsed.into_user().is_ok());
    }

    #[test]
    fn test_corrupt_user_document_is_reported() {
        let doc = UserDocument {
            id: "not-a-uuid".into(),
            nombre: "Ada".into(),
            apellido: "Lovelace".into(),
            birth_date: bson::DateTime::from_millis(660787200000i64),
            correo: "ada@example.com".into(),
            telefono: "+44 20 7946 0000".into(),
            direccion: "12 St James's Square".into(),
            photo: "".into(),
            rol: Uuid::new_v4().to_string(),
            preferences: vec![],
            created_at: bson::DateTime::now(),
            updated_at: bson::DateTime::now(),
        };
        assert!(matches!(
            doc.into_user().unwrap_err(),
            RepositoryError::Corrupt(_)
        ));
    }

    #[test]
    fn test_role_document_serde_field_names() {
        let raw = doc! {
            "_id": Uuid::new_v4().to_string(),
            "nombre": "admin",
            "idRolKeycloak": "kc-admin",
        };
        let parsed: RoleDocument = bson::from_document(raw).unwrap();
        let role = parsed.into_role().unwrap();
        assert_eq!(role.name().as_str(), "admin");
        assert_eq!(role.key().map(|k| k.as_str()), Some("kc-admin"));

        let no_key = doc! {
            "_id": Uuid::new_v4().to_string(),
            "nombre": "viewer",
        };
        let parsed: RoleDocument = bson::from_document(no_key).unwrap();
        assert!(parsed.into_role().unwrap().key().is_none());
    }

    #[test]
    fn test_activity_document_roundtrip() {
        let record = ActivityRecord {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            action: "login".into(),
            timestamp: Utc::now(),
        };
        let doc = ActivityDocument::from_record(&record);
        assert_eq!(doc.user_id, record.user_id.to_string());

        let back = doc.into_record().unwrap();
        assert_eq!(back.id, record.id);
        assert_eq!(back.action, "login");
        // bson datetimes carry millisecond precision.
        assert_eq!(
            back.timestamp.timestamp_millis(),
            record.timestamp.timestamp_millis()
        );
    }

    #[test]
    fn test_audit_document_level_is_lowercase() {
        let record = AuditRecord {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            level: AuditLevel::Info,
            event_type: "user.created".into(),
            message: "user created".into(),
            timestamp: Utc::now(),
        };
        let doc = AuditDocument::from_record(&record);
        assert_eq!(doc.level, "info");
        assert_eq!(doc.tipo, "user.created");
    }

    // Live-database coverage; needs a local mongod.
    mod live {
        use super::*;
        use crate::repository::UserRepository as _;

        async fn database() -> Database {
            let client = mongodb::Client::with_uri_str("mongodb://localhost:27017")
                .await
                .unwrap();
            client.database("users_repo_test")
        }

        #[tokio::test]
        #[ignore]
        async fn test_create_find_update_against_mongod() {
            let db = database().await;
            let repo = MongoUserRepository::new(&db);
            repo.create_indexes().await.unwrap();

            let user = crate::factory::UserFactory::create(crate::factory::NewUser {
                first_name: "Ada".into(),
                last_name: "Lovelace".into(),
                birth_date: chrono::NaiveDate::from_ymd_opt(1990, 12, 10).unwrap(),
                email: format!("{}@example.com", Uuid::new_v4()),
                phone: "+44 20 7946 0000".into(),
                address: "12 St James's Square".into(),
                photo_url: "".into(),
                role_id: Uuid::new_v4().to_string(),
                preferences: vec![],
            })
            .unwrap();

            repo.create(&user).await.unwrap();
            let found = repo.find_by_id(user.id()).await.unwrap();
            assert!(found.is_some());

            let mut changed = found.unwrap();
            changed
                .apply_patch(&crate::user::UserPatch {
                    phone: Some("+44 20 7946 0958".into()),
                    ..Default::default()
                })
                .unwrap();
            repo.update(&changed).await.unwrap();

            let reread = repo.find_by_id(user.id()).await.unwrap().unwrap();
            assert_eq!(reread.phone().as_str(), "+44 20 7946 0958");
        }
    }
}

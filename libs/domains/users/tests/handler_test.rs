//! End-to-end flows over the in-memory stack: create a user, mutate it,
//! push the resulting activity events through the processor, and read the
//! activity back through the query handler.

use chrono::NaiveDate;
use domain_users::{
    ActivityProcessor, CreateUserHandler, CreateUserRequest, GetUserActivityHandler,
    GetUserByIdHandler, InMemoryActivityPublisher, InMemoryActivityRepository,
    InMemoryAuditRepository, InMemoryRoleRepository, InMemoryUserRepository,
    ModifyPreferencesHandler, ModifyUserHandler, RoleFactory, StoredRole, UserPatch,
    UserRepository,
};
use messaging::Processor;
use std::sync::Arc;
use uuid::Uuid;

struct Harness {
    users: Arc<InMemoryUserRepository>,
    roles: Arc<InMemoryRoleRepository>,
    audit: Arc<InMemoryAuditRepository>,
    activity: Arc<InMemoryActivityRepository>,
    publisher: Arc<InMemoryActivityPublisher>,
    role_id: String,
}

impl Harness {
    async fn new() -> Self {
        let roles = Arc::new(InMemoryRoleRepository::new());
        let role_id = Uuid::new_v4().to_string();
        roles
            .insert(
                RoleFactory::rehydrate(StoredRole {
                    id: role_id.clone(),
                    name: "member".into(),
                    key: None,
                })
                .unwrap(),
            )
            .await;
        Self {
            users: Arc::new(InMemoryUserRepository::new()),
            roles,
            audit: Arc::new(InMemoryAuditRepository::new()),
            activity: Arc::new(InMemoryActivityRepository::new()),
            publisher: Arc::new(InMemoryActivityPublisher::new()),
            role_id,
        }
    }

    fn request(&self, email: &str) -> CreateUserRequest {
        CreateUserRequest {
            first_name: "Ada".into(),
            last_name: "Lovelace".into(),
            birth_date: NaiveDate::from_ymd_opt(1990, 12, 10).unwrap(),
            email: email.into(),
            phone: "+44 20 7946 0000".into(),
            address: "12 St James's Square, London".into(),
            photo_url: "".into(),
            role_id: self.role_id.clone(),
            preferences: vec!["science".into()],
        }
    }

    /// Drain published events through the consumer-side processor, as the
    /// worker would.
    async fn drain_events(&self) {
        let processor = ActivityProcessor::new(self.activity.clone(), self.audit.clone());
        for event in self.publisher.published().await {
            processor.process(&event).await.unwrap();
        }
    }
}

#[tokio::test]
async fn test_create_then_read_back() {
    let h = Harness::new().await;
    let create = CreateUserHandler::new(h.users.clone(), h.roles.clone(), h.audit.clone());

    let id = create.handle(h.request("ada@example.com")).await.unwrap();

    let get = GetUserByIdHandler::new(h.users.clone());
    let dto = get.handle(&id.to_string()).await.unwrap();
    assert_eq!(dto.email, "ada@example.com");
    assert_eq!(dto.preferences, vec!["science".to_string()]);
    assert_eq!(dto.created_at, dto.updated_at);
}

#[tokio::test]
async fn test_modify_flows_through_pipeline_to_activity_query() {
    let h = Harness::new().await;
    let create = CreateUserHandler::new(h.users.clone(), h.roles.clone(), h.audit.clone());
    let id = create.handle(h.request("ada@example.com")).await.unwrap();

    let modify = ModifyUserHandler::new(h.users.clone(), h.audit.clone(), h.publisher.clone());
    modify
        .handle(
            &id.to_string(),
            UserPatch {
                address: Some("10 Downing Street".into()),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    let prefs = ModifyPreferencesHandler::new(h.users.clone(), h.audit.clone(), h.publisher.clone());
    prefs
        .handle(&id.to_string(), vec!["history".into()])
        .await
        .unwrap();

    h.drain_events().await;

    let activity = GetUserActivityHandler::new(h.activity.clone());
    let records = activity.handle(&id.to_string(), None).await.unwrap();
    let actions: Vec<&str> = records.iter().map(|r| r.action.as_str()).collect();
    assert_eq!(actions, vec!["profile modified", "preferences modified"]);
    assert!(records.iter().all(|r| r.user_id == id.as_uuid()));
}

#[tokio::test]
async fn test_audit_trail_covers_commands_and_consumer() {
    let h = Harness::new().await;
    let create = CreateUserHandler::new(h.users.clone(), h.roles.clone(), h.audit.clone());
    let id = create.handle(h.request("ada@example.com")).await.unwrap();

    let modify = ModifyUserHandler::new(h.users.clone(), h.audit.clone(), h.publisher.clone());
    modify
        .handle(
            &id.to_string(),
            UserPatch {
                phone: Some("+44 20 7946 0958".into()),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    h.drain_events().await;

    let types: Vec<String> = h
        .audit
        .records()
        .await
        .into_iter()
        .map(|r| r.event_type)
        .collect();
    assert_eq!(
        types,
        vec![
            "user.created".to_string(),
            "user.modified".to_string(),
            "user.activity".to_string(),
        ]
    );
}

#[tokio::test]
async fn test_failed_create_leaves_no_trace() {
    let h = Harness::new().await;
    let create = CreateUserHandler::new(h.users.clone(), h.roles.clone(), h.audit.clone());

    let mut underage = h.request("kid@example.com");
    underage.birth_date = chrono::Utc::now().date_naive();
    assert!(create.handle(underage).await.is_err());

    assert!(h.users.find_all().await.unwrap().is_empty());
    assert!(h.audit.records().await.is_empty());
    assert!(h.publisher.published().await.is_empty());
}

//! Fixtures shared by the integration tests

#![allow(dead_code)]

use std::sync::Arc;

use chrono::{DateTime, Duration, TimeZone, Utc};
use contract_farming::config::{
    Config, DatabaseConfig, JwtConfig, ReadModelConfig, RemoteStoreConfig, ServerConfig,
    StoreBackend,
};
use contract_farming::middleware::AuthUser;
use contract_farming::services::ContractFarmingService;
use contract_farming::store::MemoryStore;
use contract_farming::AppState;
use serde_json::{json, Value};
use shared::{Document, Review, ReviewerProfile};
use uuid::Uuid;

pub const JWT_SECRET: &str = "integration-test-secret";

pub fn base_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 6, 1, 8, 0, 0).unwrap()
}

/// Raw opportunity row, shaped like the hosted store returns it
pub fn opportunity_row(id: Uuid, owner: Uuid, created_at: DateTime<Utc>, status: &str) -> Value {
    json!({
        "id": id,
        "title": "Sweet corn grower contract",
        "description": "Processor buys the full harvest at a fixed price",
        "company_name": "Chiang Mai Fresh Foods",
        "location": "Chiang Mai",
        "crop_type": "sweet corn",
        "contract_duration": "2 seasons",
        "requirements": "Irrigated plot, GAP certified",
        "benefits": "Seed and technical support provided",
        "contact_person": "Kanya",
        "contact_email": "kanya@example.com",
        "contact_phone": "053-123-456",
        "price_per_unit": 8.5,
        "minimum_quantity": 2000,
        "maximum_quantity": 10000,
        "unit": "kg",
        "status": status,
        "created_by": owner,
        "created_at": created_at,
        "updated_at": created_at,
        "expires_at": null
    })
}

pub fn review(
    opportunity_id: Uuid,
    reviewer_id: Uuid,
    rating: i32,
    created_at: DateTime<Utc>,
) -> Review {
    Review {
        id: Uuid::new_v4(),
        opportunity_id,
        reviewer_id,
        rating,
        comment: Some("Paid on time".to_string()),
        created_at,
        profile: None,
    }
}

pub fn document(opportunity_id: Uuid, created_at: DateTime<Utc>) -> Document {
    Document {
        id: Uuid::new_v4(),
        opportunity_id,
        name: "Contract template".to_string(),
        url: "https://files.example.com/contract.pdf".to_string(),
        file_type: Some("application/pdf".to_string()),
        created_at,
    }
}

pub fn profile(id: Uuid, name: &str) -> ReviewerProfile {
    ReviewerProfile {
        id,
        full_name: Some(name.to_string()),
        avatar_url: None,
    }
}

/// Seed one opportunity with the given ratings and document count
pub async fn seed_opportunity(
    store: &MemoryStore,
    owner: Uuid,
    created_at: DateTime<Utc>,
    ratings: &[i32],
    documents: usize,
) -> Uuid {
    use contract_farming::store::RemoteStore;

    let id = Uuid::new_v4();
    store
        .insert_raw_opportunity(opportunity_row(id, owner, created_at, "active"))
        .await;
    for (i, rating) in ratings.iter().enumerate() {
        let reviewer = Uuid::new_v4();
        store.insert_profile(profile(reviewer, "Reviewer")).await;
        let reviewed_at = created_at + Duration::minutes(i as i64 + 1);
        store
            .insert_review(&review(id, reviewer, *rating, reviewed_at))
            .await
            .unwrap();
    }
    for i in 0..documents {
        store
            .insert_document(&document(id, created_at + Duration::minutes(i as i64 + 1)))
            .await
            .unwrap();
    }
    id
}

pub fn read_model_config(timeout_ms: u64) -> ReadModelConfig {
    ReadModelConfig {
        default_limit: 50,
        max_limit: 200,
        request_timeout_ms: timeout_ms,
    }
}

pub fn service(store: &MemoryStore) -> ContractFarmingService {
    ContractFarmingService::new(Arc::new(store.clone()), &read_model_config(2_000))
}

pub fn user(id: Uuid) -> AuthUser {
    AuthUser {
        user_id: id,
        role: Some("authenticated".to_string()),
    }
}

pub fn admin() -> AuthUser {
    AuthUser {
        user_id: Uuid::new_v4(),
        role: Some("admin".to_string()),
    }
}

pub fn test_config() -> Config {
    Config {
        environment: "test".to_string(),
        server: ServerConfig::default(),
        remote_store: RemoteStoreConfig {
            backend: StoreBackend::Memory,
            url: String::new(),
            api_key: String::new(),
            schema: "public".to_string(),
        },
        database: DatabaseConfig {
            url: String::new(),
            max_connections: 1,
            min_connections: 1,
        },
        jwt: JwtConfig {
            secret: JWT_SECRET.to_string(),
            audience: "authenticated".to_string(),
        },
        read_model: read_model_config(2_000),
    }
}

pub fn app_state(store: &MemoryStore) -> AppState {
    AppState {
        store: Arc::new(store.clone()),
        config: Arc::new(test_config()),
    }
}

pub fn bearer_token(user_id: Uuid, role: &str) -> String {
    use contract_farming::middleware::auth::Claims;
    use jsonwebtoken::{encode, EncodingKey, Header};

    let claims = Claims {
        sub: user_id.to_string(),
        role: Some(role.to_string()),
        aud: "authenticated".to_string(),
        exp: Utc::now().timestamp() + 3600,
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(JWT_SECRET.as_bytes()),
    )
    .unwrap()
}

/// Local endpoint that accepts connections and never answers
pub async fn silent_gateway() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let mut held = Vec::new();
        while let Ok((socket, _)) = listener.accept().await {
            held.push(socket);
        }
    });
    format!("http://{}", addr)
}

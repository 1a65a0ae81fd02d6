use std::{
    collections::{BTreeMap, HashMap},
    sync::Arc,
};

use axum::{
    body::Bytes,
    extract::{Path, Query, State},
    http::{header, HeaderMap, Method, StatusCode, Uri},
    response::{IntoResponse, Response},
    routing::{any, get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tokio::{net::TcpListener, sync::RwLock};
use tracing::debug;
use uuid::Uuid;

/// A canned response served from `/v2/{id}`.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Mock {
    pub status: u16,
    pub body: String,
}

#[derive(Deserialize)]
pub struct CreateMock {
    pub body: String,
    #[serde(default = "default_status")]
    pub status: u16,
}

fn default_status() -> u16 {
    200
}

#[derive(Debug, Serialize, Deserialize)]
pub struct MockCreated {
    pub id: Uuid,
}

/// How `/echo` saw the request.
#[derive(Debug, Serialize, Deserialize)]
pub struct Echo {
    pub method: String,
    pub path: String,
    pub query: BTreeMap<String, String>,
    pub headers: BTreeMap<String, String>,
    pub body: String,
}

pub type Db = Arc<RwLock<HashMap<Uuid, Mock>>>;

pub fn app() -> Router {
    let db: Db = Arc::new(RwLock::new(HashMap::new()));
    Router::new()
        .route("/mocks", post(create_mock))
        .route("/v2/{id}", get(get_mock))
        .route("/echo", any(echo))
        .with_state(db)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

async fn create_mock(
    State(db): State<Db>,
    Json(input): Json<CreateMock>,
) -> Result<(StatusCode, Json<MockCreated>), StatusCode> {
    StatusCode::from_u16(input.status).map_err(|_| StatusCode::UNPROCESSABLE_ENTITY)?;
    let id = Uuid::new_v4();
    db.write().await.insert(
        id,
        Mock {
            status: input.status,
            body: input.body,
        },
    );
    debug!(%id, status = input.status, "mock created");
    Ok((StatusCode::CREATED, Json(MockCreated { id })))
}

async fn get_mock(State(db): State<Db>, Path(id): Path<Uuid>) -> Result<Response, StatusCode> {
    let mocks = db.read().await;
    let mock = mocks.get(&id).ok_or(StatusCode::NOT_FOUND)?;
    let status = StatusCode::from_u16(mock.status).map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;
    Ok((
        status,
        [(header::CONTENT_TYPE, "application/json")],
        mock.body.clone(),
    )
        .into_response())
}

async fn echo(
    method: Method,
    uri: Uri,
    Query(query): Query<BTreeMap<String, String>>,
    headers: HeaderMap,
    body: Bytes,
) -> Json<Echo> {
    let headers = headers
        .iter()
        .filter_map(|(name, value)| {
            value
                .to_str()
                .ok()
                .map(|value| (name.as_str().to_string(), value.to_string()))
        })
        .collect();
    Json(Echo {
        method: method.to_string(),
        path: uri.path().to_string(),
        query,
        headers,
        body: String::from_utf8_lossy(&body).into_owned(),
    })
}

//! HTTP surface: room management and the socket endpoint.

use axum::body::Body;
use axum::extract::ws::WebSocketUpgrade;
use axum::extract::ws::rejection::WebSocketUpgradeRejection;
use axum::extract::{Path, Query, State};
use axum::http::{Request, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use derive_getters::Getters;
use serde::{Deserialize, Serialize};
use tower::ServiceBuilder;
use tracing::{error, info, instrument};

use crate::{LobbyError, RoomId, RoomSnapshot, SessionRegistry, transport};

/// Body returned by `POST /rooms`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Getters)]
#[serde(rename_all = "camelCase")]
pub struct CreatedRoom {
    room_id: RoomId,
}

#[derive(Debug, Deserialize)]
struct SocketParams {
    lobby: RoomId,
}

/// Builds the application router over `registry`.
///
/// | Method | Path | Result |
/// |---|---|---|
/// | `POST` | `/rooms` | `201` with `{"roomId": ...}` |
/// | `GET` | `/rooms` | every known room snapshot |
/// | `GET` | `/rooms/{room_id}` | one snapshot, `404` if unknown |
/// | `GET` | `/ws?lobby={room_id}` | WebSocket upgrade, `404` if unknown |
pub fn router(registry: SessionRegistry) -> Router {
    Router::new()
        .route("/rooms", get(list_rooms).post(create_room))
        .route("/rooms/{room_id}", get(get_room))
        .route("/ws", get(open_socket))
        .layer(ServiceBuilder::new().map_request(|req: Request<Body>| {
            info!(method = %req.method(), uri = %req.uri(), "Incoming HTTP request");
            req
        }))
        .with_state(registry)
}

#[instrument(skip(registry))]
async fn create_room(State(registry): State<SessionRegistry>) -> impl IntoResponse {
    let (room_id, _) = registry.create().await;
    (StatusCode::CREATED, Json(CreatedRoom { room_id }))
}

#[instrument(skip(registry))]
async fn list_rooms(
    State(registry): State<SessionRegistry>,
) -> Result<Json<Vec<RoomSnapshot>>, ApiError> {
    Ok(Json(registry.list().await?))
}

#[instrument(skip(registry))]
async fn get_room(
    State(registry): State<SessionRegistry>,
    Path(room_id): Path<RoomId>,
) -> Result<Json<RoomSnapshot>, ApiError> {
    let handle = registry.get(&room_id).await?;
    let snapshot = handle.lock().await.snapshot();
    Ok(Json(snapshot))
}

/// Resolves the room before upgrading, so an unknown lobby gets a plain
/// `404` instead of a socket.
#[instrument(skip(registry, upgrade))]
async fn open_socket(
    State(registry): State<SessionRegistry>,
    Query(params): Query<SocketParams>,
    upgrade: Result<WebSocketUpgrade, WebSocketUpgradeRejection>,
) -> Result<Response, ApiError> {
    let session = registry.get(&params.lobby).await?;
    match upgrade {
        Ok(upgrade) => {
            info!(room_id = %params.lobby, "Upgrading to WebSocket");
            Ok(upgrade.on_upgrade(move |socket| transport::serve_socket(socket, session)))
        }
        Err(rejection) => Ok(rejection.into_response()),
    }
}

/// Handler failure mapped onto a status code.
#[derive(Debug)]
struct ApiError(LobbyError);

impl From<LobbyError> for ApiError {
    fn from(err: LobbyError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            LobbyError::RoomNotFound(_) => StatusCode::NOT_FOUND,
            LobbyError::Store(e) => {
                error!(error = %e, "Store failure while serving request");
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        let body = serde_json::json!({ "error": self.0.to_string() });
        (status, Json(body)).into_response()
    }
}

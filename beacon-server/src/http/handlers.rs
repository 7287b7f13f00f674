use crate::error::ServerError;
use crate::http::extract::{AuthedUser, MaybeUser};
use crate::http::AppState;
use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::Json;
use beacon_core::model::{FileId, RoomId, SignalId};
use beacon_core::wire::{
    CreateRoomRequest, IceServersResponse, MessageView, PollResponse, RoomDetails, RoomSummary,
    SendMessageRequest, SendSignalRequest, SendSignalResponse, SessionRequest, SessionResponse,
    UploadResponse,
};
use bytes::Bytes;
use std::str::FromStr;

fn parse_id<T: FromStr>(raw: &str, what: &str) -> Result<T, ServerError> {
    raw.parse()
        .map_err(|_| ServerError::validation(format!("invalid {what} id")))
}

pub async fn create_session(
    State(state): State<AppState>,
    Json(req): Json<SessionRequest>,
) -> Result<Json<SessionResponse>, ServerError> {
    if req.display_name.trim().is_empty() {
        return Err(ServerError::validation("display name must not be empty"));
    }

    let (user_id, token) = state.auth.create_session(req.display_name).await;
    Ok(Json(SessionResponse { user_id, token }))
}

pub async fn ice_servers(State(state): State<AppState>) -> Json<IceServersResponse> {
    Json(IceServersResponse {
        ice_servers: state.ice_servers.clone(),
    })
}

pub async fn create_room(
    State(state): State<AppState>,
    user: AuthedUser,
    Json(req): Json<CreateRoomRequest>,
) -> Result<Json<RoomDetails>, ServerError> {
    let details = state.rooms.create_room(&user.id, &user.display_name, req)?;
    Ok(Json(details))
}

pub async fn list_rooms(
    State(state): State<AppState>,
    MaybeUser(user): MaybeUser,
) -> Json<Vec<RoomSummary>> {
    let rooms = match user {
        Some(user) => state.rooms.user_rooms(&user.id),
        None => Vec::new(),
    };
    Json(rooms)
}

pub async fn room_details(
    State(state): State<AppState>,
    MaybeUser(user): MaybeUser,
    Path(room): Path<String>,
) -> Result<Json<RoomDetails>, ServerError> {
    let room: RoomId = parse_id(&room, "room")?;
    if user.is_none() {
        return Err(ServerError::not_found("room", room));
    }
    Ok(Json(state.rooms.room_details(&room)?))
}

pub async fn join_room(
    State(state): State<AppState>,
    user: AuthedUser,
    Path(room): Path<String>,
) -> Result<Json<RoomDetails>, ServerError> {
    let room: RoomId = parse_id(&room, "room")?;
    let details = state.rooms.join_room(&room, &user.id, &user.display_name)?;
    Ok(Json(details))
}

pub async fn leave_room(
    State(state): State<AppState>,
    user: AuthedUser,
    Path(room): Path<String>,
) -> Result<StatusCode, ServerError> {
    let room: RoomId = parse_id(&room, "room")?;
    state.rooms.leave_room(&room, &user.id);
    Ok(StatusCode::NO_CONTENT)
}

pub async fn list_messages(
    State(state): State<AppState>,
    MaybeUser(user): MaybeUser,
    Path(room): Path<String>,
) -> Result<Json<Vec<MessageView>>, ServerError> {
    let room: RoomId = parse_id(&room, "room")?;
    if user.is_none() {
        return Ok(Json(Vec::new()));
    }
    Ok(Json(state.messages.list(&room)))
}

pub async fn send_message(
    State(state): State<AppState>,
    user: AuthedUser,
    Path(room): Path<String>,
    Json(req): Json<SendMessageRequest>,
) -> Result<Json<MessageView>, ServerError> {
    let room: RoomId = parse_id(&room, "room")?;
    let view = state.messages.send(&room, &user.id, &user.display_name, req)?;
    Ok(Json(view))
}

pub async fn upload_file(
    State(state): State<AppState>,
    user: AuthedUser,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<UploadResponse>, ServerError> {
    let name = headers
        .get("x-file-name")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("file")
        .to_string();
    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("application/octet-stream")
        .to_string();

    let file_id = state.files.put(name, content_type, body, user.id)?;
    Ok(Json(UploadResponse { file_id }))
}

pub async fn download_file(
    State(state): State<AppState>,
    Path(file): Path<String>,
) -> Result<Response, ServerError> {
    let file: FileId = parse_id(&file, "file")?;
    let Some(stored) = state.files.get(&file) else {
        return Err(ServerError::not_found("file", file));
    };

    let headers = [
        (header::CONTENT_TYPE, stored.content_type),
        (
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{}\"", stored.name),
        ),
    ];
    Ok((headers, stored.data).into_response())
}

pub async fn send_signal(
    State(state): State<AppState>,
    user: AuthedUser,
    Path(room): Path<String>,
    Json(req): Json<SendSignalRequest>,
) -> Result<Json<SendSignalResponse>, ServerError> {
    let room: RoomId = parse_id(&room, "room")?;
    let signal_id = state
        .relay
        .send(&room, &user.id, req.to_user_id, req.kind, req.payload)?;
    Ok(Json(SendSignalResponse { signal_id }))
}

pub async fn poll_signals(
    State(state): State<AppState>,
    MaybeUser(user): MaybeUser,
    Path(room): Path<String>,
) -> Result<Json<PollResponse>, ServerError> {
    let room: RoomId = parse_id(&room, "room")?;
    // Read-only operation: anonymous callers get an empty view, not 401.
    let Some(user) = user else {
        return Ok(Json(PollResponse {
            signals: Vec::new(),
        }));
    };
    let signals = state.relay.poll(&room, &user.id)?;
    Ok(Json(PollResponse { signals }))
}

pub async fn ack_signal(
    State(state): State<AppState>,
    _user: AuthedUser,
    Path(signal): Path<String>,
) -> Result<StatusCode, ServerError> {
    let signal: SignalId = parse_id(&signal, "signal")?;
    state.relay.ack(&signal)?;
    Ok(StatusCode::NO_CONTENT)
}

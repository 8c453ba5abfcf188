use axum::{
    Extension, Form,
    extract::{Path, State},
    http::header,
    response::{Html, IntoResponse, Response},
};
use chrono::{DateTime, NaiveDateTime, Utc};
use tracing::{info, warn};

use gfax_db::StoreError;
use gfax_db::models::{MessageRow, UserRow};
use gfax_types::api::{ComposeForm, Session};
use gfax_types::models::Fax;

use crate::auth::join_error;
use crate::error::ApiError;
use crate::{AppState, pages};

pub async fn dashboard(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
) -> Result<Html<String>, ApiError> {
    let db = state.clone();
    let recipient_id = session.sub;
    let rows = tokio::task::spawn_blocking(move || db.db.messages_for_recipient(recipient_id))
        .await
        .map_err(join_error)??;

    let faxes: Vec<Fax> = rows.into_iter().map(fax_from_row).collect();
    Ok(Html(pages::dashboard(&session.fax, &faxes)))
}

pub async fn compose_page(
    Extension(session): Extension<Session>,
) -> Html<String> {
    Html(pages::compose_page(&session.fax))
}

/// POST /compose — send a fax.
///
/// The FROM label is always the sending session's own fax number; it is
/// never taken from the form. Recipient identifiers are normalized
/// (trim + uppercase) before lookup.
pub async fn compose(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Form(form): Form<ComposeForm>,
) -> Result<Html<String>, ApiError> {
    let recipient = form.recipient.trim().to_ascii_uppercase();
    let content = form.content.trim().to_string();
    if recipient.is_empty() {
        return Err(ApiError::BadRequest("recipient fax number is required"));
    }
    if content.is_empty() {
        return Err(ApiError::BadRequest("message content is empty"));
    }

    let db = state.clone();
    let sender_fax = session.fax.clone();
    let lookup = recipient.clone();
    let body = content.clone();

    // Resolve and insert under the same connection scope: a missing
    // recipient must not leave a message row behind.
    let sent = tokio::task::spawn_blocking(
        move || -> Result<Option<(UserRow, MessageRow)>, StoreError> {
            let Some(user) = db.db.user_by_fax_number(&lookup)? else {
                return Ok(None);
            };
            let message = db.db.insert_message(&sender_fax, user.id, &body)?;
            Ok(Some((user, message)))
        },
    )
    .await
    .map_err(join_error)??;

    let (recipient_user, message) = sent.ok_or(ApiError::RecipientNotFound)?;

    // Best-effort receipt notice; never blocks or rolls back the send.
    if state.mailer.is_enabled() {
        let mail_state = state.clone();
        let to = recipient_user.email.clone();
        let from_fax = session.fax.clone();
        tokio::spawn(async move {
            if let Err(e) = mail_state.mailer.send_fax_notice(&to, &from_fax).await {
                warn!("fax notice to {} failed: {}", to, e);
            }
        });
    }

    info!("fax {} sent {} -> {}", message.id, session.fax, recipient);
    Ok(Html(pages::fax_sent(&recipient)))
}

/// GET /view/{message_id} — stream the rendered transmittal PDF.
///
/// Ownership is the whole gate: only the recipient on the row may view it,
/// anyone else gets a hard 403, never a redirect.
pub async fn view_fax(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Path(message_id): Path<i64>,
) -> Result<Response, ApiError> {
    let db = state.clone();
    let message = tokio::task::spawn_blocking(move || db.db.message_by_id(message_id))
        .await
        .map_err(join_error)??
        .ok_or(ApiError::NotFound)?;

    if message.recipient_id != session.sub {
        return Err(ApiError::Forbidden);
    }

    let sent_at = parse_sqlite_timestamp(&message.created_at, message.id);
    let pdf = gfax_pdf::render_fax(&message.sender_info, &session.fax, sent_at, &message.content)?;

    Ok((
        [
            (header::CONTENT_TYPE, "application/pdf".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("inline; filename=\"fax-{}.pdf\"", message.id),
            ),
        ],
        pdf,
    )
        .into_response())
}

fn fax_from_row(row: MessageRow) -> Fax {
    let received_at = parse_sqlite_timestamp(&row.created_at, row.id);
    Fax {
        id: row.id,
        sender: row.sender_info,
        content: row.content,
        received_at,
    }
}

fn parse_sqlite_timestamp(raw: &str, message_id: i64) -> DateTime<Utc> {
    raw.parse::<DateTime<Utc>>()
        .or_else(|_| {
            // SQLite stores timestamps as "YYYY-MM-DD HH:MM:SS" without
            // timezone. Parse as naive UTC and convert.
            NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S").map(|ndt| ndt.and_utc())
        })
        .unwrap_or_else(|e| {
            warn!("Corrupt created_at '{}' on message {}: {}", raw, message_id, e);
            DateTime::default()
        })
}

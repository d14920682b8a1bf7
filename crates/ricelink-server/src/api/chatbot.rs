//! Thin proxy to the external NLU chatbot.
//!
//! Any failure — missing configuration, network error, bad status, or an
//! unparseable body — degrades to a canned Vietnamese reply marked with
//! `fallback: true`, so the chat widget always has something to show.

use std::time::Duration;

use axum::{extract::State, Extension, Json};
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::middleware::RequestId;

use super::{ApiError, ApiResponse, AppState, ResponseMeta};

const FALLBACK_REPLIES: &[&str] = &[
    "Xin chào! Tôi là trợ lý RiceLink. Tôi có thể giúp gì cho bạn về dịch vụ sấy lúa?",
    "Hiện tại tôi đang được nâng cấp. Bạn có thể hỏi tôi về các lò sấy hoặc đơn vị vận chuyển!",
    "Tôi có thể giúp bạn tìm thông tin về giá sấy lúa và các dịch vụ liên quan.",
];

#[derive(Debug, Deserialize)]
pub(super) struct ChatbotRequest {
    pub message: String,
    #[serde(default)]
    pub session_id: Option<String>,
}

#[derive(Debug, Serialize)]
pub(super) struct ChatbotReply {
    pub reply: String,
    pub fallback: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub intent: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f64>,
}

/// What the NLU backend is expected to answer with.
#[derive(Debug, Deserialize)]
struct NluResponse {
    reply: String,
    #[serde(default)]
    intent: Option<String>,
    #[serde(default)]
    confidence: Option<f64>,
}

#[derive(Debug, Serialize)]
struct NluRequest<'a> {
    message: &'a str,
    session_id: &'a str,
    language: &'a str,
}

fn fallback_reply() -> ChatbotReply {
    let index = rand::rng().random_range(0..FALLBACK_REPLIES.len());
    ChatbotReply {
        reply: FALLBACK_REPLIES[index].to_owned(),
        fallback: true,
        intent: None,
        confidence: None,
    }
}

/// POST /api/v1/chatbot
pub(super) async fn converse(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Json(body): Json<ChatbotRequest>,
) -> Result<Json<ApiResponse<ChatbotReply>>, ApiError> {
    let rid = req_id.0;

    let message = body.message.trim();
    if message.is_empty() {
        return Err(ApiError::new(
            rid,
            "validation_error",
            "Vui lòng nhập tin nhắn.",
        ));
    }

    let Some(endpoint) = state.config.chatbot_endpoint.as_deref() else {
        return Ok(Json(ApiResponse {
            data: fallback_reply(),
            meta: ResponseMeta::new(rid),
        }));
    };

    let session_id = body.session_id.as_deref().unwrap_or("default-session");
    let reply = match forward_to_nlu(&state, endpoint, message, session_id).await {
        Ok(reply) => reply,
        Err(error) => {
            tracing::warn!(%error, "chatbot backend unavailable, serving fallback reply");
            fallback_reply()
        }
    };

    Ok(Json(ApiResponse {
        data: reply,
        meta: ResponseMeta::new(rid),
    }))
}

async fn forward_to_nlu(
    state: &AppState,
    endpoint: &str,
    message: &str,
    session_id: &str,
) -> Result<ChatbotReply, reqwest::Error> {
    let response = state
        .http
        .post(endpoint)
        .timeout(Duration::from_secs(state.config.chatbot_timeout_secs))
        .json(&NluRequest {
            message,
            session_id,
            language: "vi",
        })
        .send()
        .await?
        .error_for_status()?
        .json::<NluResponse>()
        .await?;

    Ok(ChatbotReply {
        reply: response.reply,
        fallback: false,
        intent: response.intent,
        confidence: response.confidence,
    })
}

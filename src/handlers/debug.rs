//! 診断用エンドポイント
//!
//! 一般利用者向けの契約ではない。セッションと Cookie の状態を確認するためだけに使う。

use std::error::Error;

use axum::{
    Json,
    extract::State,
    http::{HeaderMap, StatusCode, header},
    response::{IntoResponse, Response},
};
use secrecy::ExposeSecret;
use serde::Serialize;
use time::OffsetDateTime;

use crate::config::Config;
use crate::models::SessionWithUser;
use crate::state::AppState;

/// 認証プロバイダーのセッショントークン Cookie 名
const SESSION_COOKIE_NAMES: [&str; 2] = [
    "__Secure-next-auth.session-token",
    "next-auth.session-token",
];

/// 認証 Cookie とみなす名前の部分文字列（`__Secure-` / `__Host-` 付きも含む）
const AUTH_COOKIE_MARKER: &str = "next-auth";

/// エラー応答に含めるエラー連鎖の最大数
const MAX_STACK_ENTRIES: usize = 3;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DebugSessionResponse {
    pub has_session: bool,
    pub session: Option<SessionSummary>,
    pub env: EnvReport,
}

#[derive(Debug, Serialize)]
pub struct SessionSummary {
    pub user: Option<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub expires: OffsetDateTime,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EnvReport {
    pub has_auth_url: bool,
    pub has_auth_secret: bool,
    pub has_database_url: bool,
    pub auth_url: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct DebugErrorResponse {
    pub error: String,
    pub stack: Vec<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DebugCookiesResponse {
    pub has_next_auth_cookies: bool,
    pub cookie_names: Vec<String>,
    pub all_cookie_names: Vec<String>,
}

/// GET /api/debug-session
///
/// セッショントークン Cookie を sessions テーブルで解決して返す。
/// 失敗時は 500 とエラー連鎖の先頭数件を返す。
pub async fn debug_session(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let session = match session_token(&headers) {
        Some(token) => {
            state
                .session_repo
                .find_active(token, OffsetDateTime::now_utc())
                .await
        }
        None => Ok(None),
    };

    match session {
        Ok(session) => Json(session_report(session, &state.config)).into_response(),
        Err(e) => {
            tracing::error!(error = ?e, "セッション取得エラー");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(DebugErrorResponse {
                    error: e.to_string(),
                    stack: error_stack(&e),
                }),
            )
                .into_response()
        }
    }
}

/// GET /api/debug-cookies
pub async fn debug_cookies(headers: HeaderMap) -> Json<DebugCookiesResponse> {
    let all_cookie_names: Vec<String> = cookies(&headers)
        .map(|(name, _)| name.to_string())
        .collect();

    let cookie_names: Vec<String> = all_cookie_names
        .iter()
        .filter(|name| name.contains(AUTH_COOKIE_MARKER))
        .cloned()
        .collect();

    Json(DebugCookiesResponse {
        has_next_auth_cookies: !cookie_names.is_empty(),
        cookie_names,
        all_cookie_names,
    })
}

fn session_report(session: Option<SessionWithUser>, config: &Config) -> DebugSessionResponse {
    DebugSessionResponse {
        has_session: session.is_some(),
        session: session.map(|s| SessionSummary {
            user: s.email,
            expires: s.expires,
        }),
        env: EnvReport {
            has_auth_url: config.auth_url.is_some(),
            has_auth_secret: config.auth_secret.is_some(),
            has_database_url: !config.database_url.expose_secret().is_empty(),
            auth_url: config.auth_url.clone(),
        },
    }
}

/// Cookie ヘッダーを (名前, 値) に分解する
fn cookies(headers: &HeaderMap) -> impl Iterator<Item = (&str, &str)> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .filter_map(|pair| {
            let pair = pair.trim();
            let (name, value) = pair.split_once('=').unwrap_or((pair, ""));
            (!name.is_empty()).then_some((name, value))
        })
}

/// セッショントークン Cookie の値（`__Secure-` 付きを優先）
fn session_token(headers: &HeaderMap) -> Option<&str> {
    SESSION_COOKIE_NAMES.iter().find_map(|wanted| {
        cookies(headers)
            .find(|(name, value)| name == wanted && !value.is_empty())
            .map(|(_, value)| value)
    })
}

fn error_stack(error: &(dyn Error + 'static)) -> Vec<String> {
    std::iter::successors(Some(error), |&e| e.source())
        .take(MAX_STACK_ENTRIES)
        .map(ToString::to_string)
        .collect()
}

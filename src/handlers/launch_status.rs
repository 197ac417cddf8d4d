use axum::Json;
use serde::Serialize;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LaunchStatusResponse {
    pub is_launched: bool,
    pub early_bird_active: bool,
}

/// GET /api/launch-status
///
/// 常に公開済み・アーリーバード終了を返す。DB は参照しない。
pub async fn launch_status() -> Json<LaunchStatusResponse> {
    Json(LaunchStatusResponse {
        is_launched: true,
        early_bird_active: false,
    })
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use axum::response::IntoResponse;

    use super::*;

    #[tokio::test]
    async fn test_launch_status_is_fixed() {
        let response = launch_status().await;
        assert!(response.is_launched);
        assert!(!response.early_bird_active);
    }

    #[tokio::test]
    async fn test_launch_status_json_shape() {
        let Json(body) = launch_status().await;
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(
            json,
            serde_json::json!({ "isLaunched": true, "earlyBirdActive": false })
        );

        let response = Json(body).into_response();
        assert_eq!(response.status(), StatusCode::OK);
    }
}

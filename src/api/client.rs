//! reqwest client for the camera's REST API
//!
//! Every call except login carries basic auth with the stream credentials.

use super::types::{
    CameraModule, CameraSettings, DeviceRegistration, LoginRequest, LoginResponse,
    ModuleResponse, NetworkStatus, SystemStats,
};
use super::{ApiError, ApiResult};
use crate::storage::StreamCredentials;
use parking_lot::RwLock;
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;

pub struct CamApiClient {
    client: Client,
    base_url: RwLock<String>,
    credentials: RwLock<StreamCredentials>,
}

impl CamApiClient {
    pub fn new(
        base_url: &str,
        credentials: StreamCredentials,
        timeout: Duration,
    ) -> ApiResult<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: RwLock::new(base_url.trim_end_matches('/').to_string()),
            credentials: RwLock::new(credentials),
        })
    }

    pub fn base_url(&self) -> String {
        self.base_url.read().clone()
    }

    pub fn set_base_url(&self, url: &str) {
        let url = url.trim_end_matches('/').to_string();
        tracing::info!("Camera API base URL set to {}", url);
        *self.base_url.write() = url;
    }

    pub fn set_credentials(&self, credentials: StreamCredentials) {
        *self.credentials.write() = credentials;
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url.read(), path)
    }

    fn authed(&self, method: Method, path: &str) -> RequestBuilder {
        let credentials = self.credentials.read();
        self.client
            .request(method, self.url(path))
            .header(reqwest::header::ACCEPT, "application/json")
            .basic_auth(&credentials.username, Some(&credentials.password))
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> ApiResult<T> {
        let response = request.send().await?;
        Self::decode(response).await
    }

    async fn decode<T: DeserializeOwned>(response: Response) -> ApiResult<T> {
        let status = response.status();
        if status == StatusCode::UNAUTHORIZED {
            return Err(ApiError::NotAuthenticated);
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::warn!("Camera API error {}: {}", status, body);
            return Err(ApiError::Status {
                status: status.as_u16(),
                body,
            });
        }
        Ok(response.json::<T>().await?)
    }

    async fn post_json<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> ApiResult<T> {
        self.send(self.authed(Method::POST, path).json(body)).await
    }

    /// Log in and adopt `username`/`password` for subsequent calls
    pub async fn login(&self, username: &str, password: &str) -> ApiResult<LoginResponse> {
        self.set_credentials(StreamCredentials {
            username: username.to_string(),
            password: password.to_string(),
        });

        let request = self.client.post(self.url("/api/auth/login")).json(&LoginRequest {
            username: username.to_string(),
            password: password.to_string(),
        });
        let response = self.send(request).await?;
        tracing::info!("Logged in to camera as {}", username);
        Ok(response)
    }

    pub async fn network_status(&self) -> ApiResult<NetworkStatus> {
        self.send(self.authed(Method::GET, "/api/network/status")).await
    }

    pub async fn camera_settings(&self) -> ApiResult<CameraSettings> {
        self.send(self.authed(Method::GET, "/api/camera/settings")).await
    }

    pub async fn update_camera_settings(
        &self,
        settings: &CameraSettings,
    ) -> ApiResult<CameraSettings> {
        self.post_json("/api/camera/settings", settings).await
    }

    pub async fn system_stats(&self) -> ApiResult<SystemStats> {
        self.send(self.authed(Method::GET, "/api/system/stats")).await
    }

    pub async fn set_module(
        &self,
        module: CameraModule,
        enable: bool,
    ) -> ApiResult<ModuleResponse> {
        let action = if enable { "enable" } else { "disable" };
        let path = format!("/api/modules/{}/{}", module.path_segment(), action);
        self.post_json(&path, &serde_json::json!({})).await
    }

    pub async fn register_notifications(
        &self,
        registration: &DeviceRegistration,
    ) -> ApiResult<ModuleResponse> {
        tracing::info!("Registering device {} for notifications", registration.device_id);
        self.post_json("/api/notifications/register", registration).await
    }

    pub async fn unregister_notifications(&self, fcm_token: &str) -> ApiResult<ModuleResponse> {
        self.post_json(
            "/api/notifications/unregister",
            &serde_json::json!({ "fcm_token": fcm_token }),
        )
        .await
    }
}

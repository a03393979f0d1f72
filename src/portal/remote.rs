use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::json;
use urlencoding::encode;

use crate::{
    domain::*,
    error::{AppError, ErrorBody, Result},
    portal::PortalApi,
};

/// Talks to a running server over its JSON API. The session cookie lives
/// in the client's cookie store.
pub struct RemotePortal {
    client: Client,
    base_url: String,
}

impl RemotePortal {
    pub fn new(base_url: &str) -> Result<Self> {
        let client = Client::builder()
            .cookie_store(true)
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/api{}", self.base_url, path)
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T> {
        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(decode_error(status, response.bytes().await?.as_ref()));
        }

        response
            .json::<T>()
            .await
            .map_err(|e| AppError::NetworkOrServerError(format!("Unexpected response body: {}", e)))
    }

    async fn send_empty(&self, request: RequestBuilder) -> Result<()> {
        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(decode_error(status, response.bytes().await?.as_ref()));
        }
        Ok(())
    }
}

/// Maps a failed response back onto the error it was rendered from.
fn decode_error(status: StatusCode, body: &[u8]) -> AppError {
    match serde_json::from_slice::<ErrorBody>(body) {
        Ok(body) => AppError::from_body(body),
        Err(_) => AppError::NetworkOrServerError(format!(
            "HTTP {}: {}",
            status,
            String::from_utf8_lossy(body).trim()
        )),
    }
}

#[async_trait]
impl PortalApi for RemotePortal {
    async fn login(&self, email: &str, password: &str) -> Result<User> {
        self.send(
            self.client
                .post(self.url("/auth/login"))
                .json(&json!({ "email": email, "password": password })),
        )
        .await
    }

    async fn logout(&self) -> Result<()> {
        self.send_empty(self.client.post(self.url("/auth/logout"))).await
    }

    async fn current_session(&self) -> Result<Option<serde_json::Value>> {
        match self.send(self.client.get(self.url("/auth/session"))).await {
            Ok(snapshot) => Ok(Some(snapshot)),
            Err(AppError::Unauthorized) => Ok(None),
            Err(e) => Err(e),
        }
    }

    async fn register(&self, request: RegisterRequest) -> Result<User> {
        self.send(self.client.post(self.url("/auth/register")).json(&request)).await
    }

    async fn get_users(&self) -> Result<Vec<User>> {
        self.send(self.client.get(self.url("/users"))).await
    }

    async fn get_user(&self, id: &str) -> Result<User> {
        self.send(self.client.get(self.url(&format!("/users/{}", encode(id))))).await
    }

    async fn update_user(&self, id: &str, update: UpdateUserRequest) -> Result<User> {
        self.send(
            self.client
                .put(self.url(&format!("/users/{}", encode(id))))
                .json(&update),
        )
        .await
    }

    async fn update_user_status(&self, id: &str, status: MemberStatus) -> Result<User> {
        self.send(
            self.client
                .put(self.url(&format!("/users/{}/status", encode(id))))
                .json(&json!({ "status": status })),
        )
        .await
    }

    async fn reassign_user_id(&self, current_id: &str, new_id: &str) -> Result<User> {
        self.send(
            self.client
                .put(self.url(&format!("/users/{}/reassign", encode(current_id))))
                .json(&json!({ "newId": new_id })),
        )
        .await
    }

    async fn issue_document(&self, id: &str, kind: IssuedDocument, document: String) -> Result<User> {
        self.send(
            self.client
                .put(self.url(&format!("/users/{}/documents/{}", encode(id), kind.as_path())))
                .json(&json!({ "document": document })),
        )
        .await
    }

    async fn get_directory(&self, filter: &DirectoryFilter) -> Result<Vec<DirectoryEntry>> {
        self.send(self.client.get(self.url("/directory")).query(filter)).await
    }

    async fn get_announcements(&self) -> Result<Vec<Announcement>> {
        self.send(self.client.get(self.url("/announcements"))).await
    }

    async fn create_announcement(&self, request: CreateAnnouncementRequest) -> Result<Announcement> {
        self.send(self.client.post(self.url("/announcements")).json(&request)).await
    }

    async fn delete_announcement(&self, id: &str) -> Result<()> {
        self.send_empty(
            self.client.delete(self.url(&format!("/announcements/{}", encode(id)))),
        )
        .await
    }

    async fn get_payments(&self, user_id: &str) -> Result<Vec<Payment>> {
        self.send(
            self.client.get(self.url(&format!("/payments/user/{}", encode(user_id)))),
        )
        .await
    }

    async fn get_all_payments(&self) -> Result<Vec<Payment>> {
        self.send(self.client.get(self.url("/payments"))).await
    }

    async fn create_payment(&self, request: CreatePaymentRequest) -> Result<Payment> {
        self.send(self.client.post(self.url("/payments")).json(&request)).await
    }

    async fn update_payment_status(&self, id: &str, status: PaymentStatus) -> Result<Payment> {
        self.send(
            self.client
                .put(self.url(&format!("/payments/{}/status", encode(id))))
                .json(&UpdatePaymentStatusRequest { status }),
        )
        .await
    }

    async fn delete_payment(&self, id: &str) -> Result<()> {
        self.send_empty(self.client.delete(self.url(&format!("/payments/{}", encode(id)))))
            .await
    }

    async fn send_message(&self, sender_id: &str, receiver_id: &str, content: &str) -> Result<Message> {
        let request = SendMessageRequest {
            sender_id: sender_id.to_string(),
            receiver_id: receiver_id.to_string(),
            content: content.to_string(),
        };
        self.send(self.client.post(self.url("/messages")).json(&request)).await
    }

    async fn get_conversation(&self, user_id: &str, other_id: &str) -> Result<Vec<Message>> {
        self.send(self.client.get(self.url(&format!(
            "/messages/{}/{}",
            encode(user_id),
            encode(other_id)
        ))))
        .await
    }

    async fn get_conversations(&self, user_id: &str) -> Result<Vec<User>> {
        self.send(
            self.client.get(self.url(&format!("/messages/conversations/{}", encode(user_id)))),
        )
        .await
    }

    async fn mark_messages_read(&self, user_id: &str, other_id: &str) -> Result<()> {
        self.send_empty(self.client.post(self.url(&format!(
            "/messages/{}/{}/read",
            encode(user_id),
            encode(other_id)
        ))))
        .await
    }

    async fn get_unread_count(&self, user_id: &str) -> Result<i64> {
        let unread: UnreadCount = self
            .send(self.client.get(self.url(&format!("/messages/unread/{}", encode(user_id)))))
            .await?;
        Ok(unread.count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_json_error_bodies_keep_their_variant() {
        let body = br#"{"message":"Validation failed","code":"VALIDATION_FAILED","errors":["phone must contain between 10 and 15 digits"]}"#;
        assert_eq!(
            decode_error(StatusCode::BAD_REQUEST, body),
            AppError::ValidationFailed(vec!["phone must contain between 10 and 15 digits".into()])
        );
    }

    #[test]
    fn test_non_json_bodies_become_network_errors() {
        match decode_error(StatusCode::BAD_GATEWAY, b"<html>bad gateway</html>") {
            AppError::NetworkOrServerError(msg) => assert!(msg.contains("502")),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_base_url_is_normalised() {
        let portal = RemotePortal::new("http://localhost:8080/").unwrap();
        assert_eq!(portal.url("/users"), "http://localhost:8080/api/users");
    }
}

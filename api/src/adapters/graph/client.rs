//! Microsoft Graph user directory client
//!
//! Uses the OAuth2 client credentials flow; the app token is cached until
//! shortly before it expires.

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use reqwest::Client;
use serde::Deserialize;
use tokio::sync::RwLock;
use urlencoding::encode;

use crate::domain::entities::DirectoryUser;
use crate::domain::ports::UserDirectory;
use crate::error::DirectoryError;

const GRAPH_BASE_URL: &str = "https://graph.microsoft.com/v1.0";
const LOGIN_BASE_URL: &str = "https://login.microsoftonline.com";
const GRAPH_SCOPE: &str = "https://graph.microsoft.com/.default";
const USER_FIELDS: &str = "id,displayName,mail,userPrincipalName,jobTitle";

struct CachedToken {
    access_token: String,
    expires_at: DateTime<Utc>,
}

pub struct GraphDirectoryClient {
    http: Client,
    tenant_id: String,
    client_id: String,
    client_secret: String,
    token: RwLock<Option<CachedToken>>,
}

impl GraphDirectoryClient {
    pub fn new(tenant_id: String, client_id: String, client_secret: String) -> Self {
        Self {
            http: Client::new(),
            tenant_id,
            client_id,
            client_secret,
            token: RwLock::new(None),
        }
    }

    async fn access_token(&self) -> Result<String, DirectoryError> {
        {
            let token = self.token.read().await;
            if let Some(cached) = token.as_ref() {
                if cached.expires_at > Utc::now() {
                    return Ok(cached.access_token.clone());
                }
            }
        }

        let response = self
            .http
            .post(format!(
                "{}/{}/oauth2/v2.0/token",
                LOGIN_BASE_URL, self.tenant_id
            ))
            .form(&[
                ("client_id", self.client_id.as_str()),
                ("client_secret", self.client_secret.as_str()),
                ("scope", GRAPH_SCOPE),
                ("grant_type", "client_credentials"),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(DirectoryError::Token(message));
        }

        let body: TokenResponse = response
            .json()
            .await
            .map_err(|e| DirectoryError::Token(e.to_string()))?;

        // Refresh a minute early
        let expires_at = Utc::now() + Duration::seconds((body.expires_in - 60).max(0));
        let access_token = body.access_token;
        *self.token.write().await = Some(CachedToken {
            access_token: access_token.clone(),
            expires_at,
        });

        tracing::debug!(%expires_at, "Acquired Microsoft Graph token");
        Ok(access_token)
    }
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: i64,
}

#[derive(Deserialize)]
struct GraphUserList {
    value: Vec<GraphUser>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GraphUser {
    id: String,
    display_name: Option<String>,
    mail: Option<String>,
    user_principal_name: Option<String>,
    job_title: Option<String>,
}

impl From<GraphUser> for DirectoryUser {
    fn from(user: GraphUser) -> Self {
        DirectoryUser {
            id: user.id,
            display_name: user.display_name,
            mail: user.mail,
            user_principal_name: user.user_principal_name,
            job_title: user.job_title,
        }
    }
}

/// OData filter matching display name or mail prefixes
fn search_filter(query: &str) -> String {
    let escaped = query.replace('\'', "''");
    format!(
        "startswith(displayName,'{0}') or startswith(mail,'{0}')",
        escaped
    )
}

#[async_trait]
impl UserDirectory for GraphDirectoryClient {
    async fn search_users(
        &self,
        query: &str,
        limit: u32,
    ) -> Result<Vec<DirectoryUser>, DirectoryError> {
        let token = self.access_token().await?;
        let url = format!(
            "{}/users?$filter={}&$top={}&$select={}",
            GRAPH_BASE_URL,
            encode(&search_filter(query)),
            limit,
            USER_FIELDS
        );

        let response = self.http.get(url).bearer_auth(token).send().await?;
        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(DirectoryError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let list: GraphUserList = response.json().await?;
        Ok(list.value.into_iter().map(Into::into).collect())
    }

    async fn get_user(&self, id: &str) -> Result<Option<DirectoryUser>, DirectoryError> {
        let token = self.access_token().await?;
        let url = format!(
            "{}/users/{}?$select={}",
            GRAPH_BASE_URL,
            encode(id),
            USER_FIELDS
        );

        let response = self.http.get(url).bearer_auth(token).send().await?;
        let status = response.status();
        if status.as_u16() == 404 {
            return Ok(None);
        }
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(DirectoryError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let user: GraphUser = response.json().await?;
        Ok(Some(user.into()))
    }
}

/// Used when Graph credentials are not configured
pub struct DisabledDirectory;

#[async_trait]
impl UserDirectory for DisabledDirectory {
    async fn search_users(
        &self,
        _query: &str,
        _limit: u32,
    ) -> Result<Vec<DirectoryUser>, DirectoryError> {
        Err(DirectoryError::Disabled)
    }

    async fn get_user(&self, _id: &str) -> Result<Option<DirectoryUser>, DirectoryError> {
        Err(DirectoryError::Disabled)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn search_filter_escapes_quotes() {
        assert_eq!(
            search_filter("o'brien"),
            "startswith(displayName,'o''brien') or startswith(mail,'o''brien')"
        );
    }

    #[test]
    fn parse_graph_user_list() {
        let json = r#"{
            "@odata.context": "https://graph.microsoft.com/v1.0/$metadata#users",
            "value": [{
                "id": "87d349ed-44d7-43e1-9a83-5f2406dee5bd",
                "displayName": "Adele Vance",
                "mail": "AdeleV@contoso.com",
                "userPrincipalName": "AdeleV@contoso.com",
                "jobTitle": null
            }]
        }"#;
        let list: GraphUserList = serde_json::from_str(json).unwrap();
        let users: Vec<DirectoryUser> = list.value.into_iter().map(Into::into).collect();
        assert_eq!(users.len(), 1);
        assert_eq!(users[0].display_name.as_deref(), Some("Adele Vance"));
        assert!(users[0].job_title.is_none());
    }

    #[tokio::test]
    async fn disabled_directory_errors() {
        assert!(matches!(
            DisabledDirectory.search_users("ad", 10).await,
            Err(DirectoryError::Disabled)
        ));
    }
}

use reqwest::StatusCode;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::json;
use uuid::Uuid;

use crate::common::{ApiResponse, VoteDirection};
use crate::utils::error_codes;

/// 后端API的HTTP客户端。
/// 登录/注册成功后保存凭证，之后的受保护请求自动携带
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    credential: Option<String>,
    /// 因未认证而中断的目的地，登录成功后跳回
    intended_destination: Option<String>,
}

#[derive(Debug)]
pub enum ClientError {
    /// 凭证缺失、无效或过期，需要重新登录
    Unauthenticated,
    NotFound,
    /// 服务端返回的业务错误
    Api { code: i32, msg: String },
    Network(String),
}

#[derive(Debug, Deserialize)]
struct CredentialData {
    user_id: Uuid,
    credential: String,
}

#[derive(Debug, Deserialize)]
struct VoteData {
    direction: VoteDirection,
    count: i64,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into(),
            credential: None,
            intended_destination: None,
        }
    }

    pub fn has_credential(&self) -> bool {
        self.credential.is_some()
    }

    pub fn remember_destination(&mut self, destination: String) {
        self.intended_destination = Some(destination);
    }

    /// 登录成功后取出之前想去的页面
    pub fn take_destination(&mut self) -> Option<String> {
        self.intended_destination.take()
    }

    pub async fn signup(
        &mut self,
        name: &str,
        email: &str,
        password: &str,
    ) -> Result<Uuid, ClientError> {
        let response = self
            .http
            .post(format!("{}/api/v1/user/signup", self.base_url))
            .json(&json!({ "name": name, "email": email, "password": password }))
            .send()
            .await
            .map_err(network)?;

        let data: CredentialData = parse_data(response).await?;
        self.credential = Some(data.credential);
        Ok(data.user_id)
    }

    pub async fn signin(&mut self, email: &str, password: &str) -> Result<Uuid, ClientError> {
        let response = self
            .http
            .post(format!("{}/api/v1/user/signin", self.base_url))
            .json(&json!({ "email": email, "password": password }))
            .send()
            .await
            .map_err(network)?;

        let data: CredentialData = parse_data(response).await?;
        self.credential = Some(data.credential);
        Ok(data.user_id)
    }

    /// 翻转对一篇文章的投票，返回服务端的权威结果。
    /// requested 只是乐观猜测，随请求上报作诊断
    pub async fn toggle_vote(
        &self,
        post_id: Uuid,
        requested: VoteDirection,
    ) -> Result<(VoteDirection, i64), ClientError> {
        let credential = self
            .credential
            .as_deref()
            .ok_or(ClientError::Unauthenticated)?;

        let response = self
            .http
            .put(format!("{}/api/v1/blog/vote", self.base_url))
            .bearer_auth(credential)
            .json(&json!({ "postId": post_id, "direction": requested.as_str() }))
            .send()
            .await
            .map_err(network)?;

        let data: VoteData = parse_data(response).await?;
        Ok((data.direction, data.count))
    }
}

fn network(e: reqwest::Error) -> ClientError {
    ClientError::Network(e.to_string())
}

async fn parse_data<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, ClientError> {
    let status = response.status();
    if status == StatusCode::UNAUTHORIZED {
        return Err(ClientError::Unauthenticated);
    }
    if status == StatusCode::NOT_FOUND {
        return Err(ClientError::NotFound);
    }

    let envelope: ApiResponse<T> = response.json().await.map_err(network)?;
    if envelope.code != error_codes::SUCCESS {
        return Err(ClientError::Api {
            code: envelope.code,
            msg: envelope.msg,
        });
    }
    envelope.resp_data.ok_or(ClientError::Api {
        code: error_codes::INTERNAL_ERROR,
        msg: "missing resp_data".to_string(),
    })
}

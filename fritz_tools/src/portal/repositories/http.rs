//! Portal access over the SkyPortal REST API.
//!
//! One `reqwest::Client` is built per portal and reused for every call so
//! connections are pooled across a batch. Calls are awaited one at a time;
//! there are no timeouts and nothing is retried.

use async_trait::async_trait;
use reqwest::header::AUTHORIZATION;
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode, Url};
use tracing::{debug, warn};

use crate::models::{
    FollowupRequest, FollowupState, RequestId, ResponseEnvelope, SourceDraft, StatusUpdate,
};
use crate::portal::config::{PortalConfig, Token};
use crate::portal::repository::{
    ErrorContext, FollowupRepository, PortalError, PortalResult, SourceRepository,
};

const USER_AGENT: &str = concat!("fritz-tools/", env!("CARGO_PKG_VERSION"));

/// Portal implementation backed by HTTP.
pub struct HttpPortal {
    client: Client,
    base: Url,
    token: Token,
}

impl HttpPortal {
    /// Create a portal handle for `config.host`.
    ///
    /// # Errors
    /// `ConfigurationError` if the host is not an absolute http(s) URL or the
    /// client cannot be built.
    pub fn new(config: &PortalConfig) -> PortalResult<Self> {
        let context = || ErrorContext::new("create_portal").with_entity_id(&config.host);

        let base = Url::parse(&config.host).map_err(|e| PortalError::ConfigurationError {
            message: format!("Invalid portal host: {}", e),
            context: context(),
        })?;
        if base.cannot_be_a_base() || !matches!(base.scheme(), "http" | "https") {
            return Err(PortalError::ConfigurationError {
                message: "Portal host must be an http(s) URL".to_string(),
                context: context(),
            });
        }

        let client = Client::builder()
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| PortalError::ConfigurationError {
                message: format!("Failed to create HTTP client: {}", e),
                context: context(),
            })?;

        Ok(Self {
            client,
            base,
            token: config.token.clone(),
        })
    }

    /// `{host}/api/{segments...}`; each segment is percent-encoded.
    pub fn endpoint(&self, segments: &[&str]) -> PortalResult<Url> {
        let mut url = self.base.clone();
        {
            let mut path = url
                .path_segments_mut()
                .map_err(|_| PortalError::configuration("Portal host cannot take a path"))?;
            path.pop_if_empty().push("api").extend(segments);
        }
        Ok(url)
    }

    fn request(&self, method: Method, url: Url) -> RequestBuilder {
        debug!("{} {}", method, url);
        self.client
            .request(method, url)
            .header(AUTHORIZATION, self.token.header_value())
    }

    async fn read_envelope(
        response: Response,
        context: ErrorContext,
    ) -> PortalResult<ResponseEnvelope> {
        let status = response.status();
        let body = response.text().await?;
        debug!("Response {}: {}", status, body);
        ResponseEnvelope::parse(&body).map_err(|e| PortalError::FormatError {
            message: e.message().to_string(),
            context: context.with_details(format!("http_status={}", status.as_u16())),
        })
    }
}

#[async_trait]
impl SourceRepository for HttpPortal {
    async fn source_exists(&self, object_id: &str) -> bool {
        let url = match self.endpoint(&["sources", object_id]) {
            Ok(url) => url,
            Err(e) => {
                warn!("Cannot build source URL for {}: {}", object_id, e);
                return false;
            }
        };

        match self.request(Method::GET, url).send().await {
            Ok(response) => {
                let status = response.status();
                debug!("Source {} lookup returned {}", object_id, status);
                status == StatusCode::OK
            }
            Err(e) => {
                warn!("Source lookup for {} failed: {}", object_id, e);
                false
            }
        }
    }

    async fn create_source(&self, draft: &SourceDraft) -> PortalResult<bool> {
        let context = ErrorContext::new("create_source")
            .with_entity("source")
            .with_entity_id(draft.id());
        let url = self.endpoint(&["sources"])?;

        let response = self
            .request(Method::POST, url)
            .json(draft)
            .send()
            .await
            .map_err(|e| PortalError::RemoteError {
                message: e.to_string(),
                context: context.clone(),
            })?;

        let status = response.status();
        if status == StatusCode::OK {
            return Ok(true);
        }

        let body = response.text().await.unwrap_or_default();
        warn!(
            "Portal refused source {} with {}: {}",
            draft.id(),
            status,
            body
        );
        Ok(false)
    }
}

#[async_trait]
impl FollowupRepository for HttpPortal {
    async fn submit_followup(&self, request: &FollowupRequest) -> PortalResult<()> {
        let context = ErrorContext::new("submit_followup")
            .with_entity("followup_request")
            .with_entity_id(&request.obj_id);
        let url = self.endpoint(&["followup_request"])?;

        let response = self
            .request(Method::POST, url)
            .json(request)
            .send()
            .await
            .map_err(|e| PortalError::RemoteError {
                message: e.to_string(),
                context: context.clone(),
            })?;

        let status = response.status();
        if status == StatusCode::OK {
            return Ok(());
        }

        let body = response.text().await.unwrap_or_default();
        Err(PortalError::RemoteError {
            message: format!(
                "Request {} for {} rejected: {}",
                request.payload.observation_choice, request.obj_id, body
            ),
            context: context.with_details(format!("http_status={}", status.as_u16())),
        })
    }

    async fn get_followup(&self, request_id: RequestId) -> PortalResult<FollowupState> {
        let context = ErrorContext::new("get_followup")
            .with_entity("followup_request")
            .with_entity_id(request_id);
        let url = self.endpoint(&["followup_request", &request_id.to_string()])?;

        let response = self
            .request(Method::GET, url)
            .send()
            .await
            .map_err(|e| PortalError::RemoteError {
                message: e.to_string(),
                context: context.clone(),
            })?;

        let envelope = Self::read_envelope(response, context).await?;
        FollowupState::from_envelope(request_id, envelope)
    }

    async fn put_status(
        &self,
        request_id: RequestId,
        update: &StatusUpdate,
    ) -> PortalResult<ResponseEnvelope> {
        let context = ErrorContext::new("put_status")
            .with_entity("followup_request")
            .with_entity_id(request_id);
        let url = self.endpoint(&["followup_request", &request_id.to_string()])?;

        let response = self
            .request(Method::PUT, url)
            .json(update)
            .send()
            .await
            .map_err(|e| PortalError::RemoteError {
                message: e.to_string(),
                context: context.clone(),
            })?;

        Self::read_envelope(response, context).await
    }
}

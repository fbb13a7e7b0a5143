use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{ACCEPT, CONTENT_TYPE, HOST};
use reqwest::multipart::{Form, Part};
use reqwest::{Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::debug;

use crate::app::ports::{BrandingSourcePort, BrandingTargetPort, ImagePayload};
use crate::common::constants::{BRANDING_FILES_PATH, BRANDING_PATH, PUBLIC_BRANDING_PATH, SOFTWARE_VERSION_PATH};
use crate::common::error::{BrandingError, Result};
use crate::common::url::host_of;
use crate::common::version::SoftwareVersion;
use crate::domain::{BrandingDescriptor, ImageKind, UpdateBrandingPayload};

#[derive(Debug, Deserialize)]
struct UploadResponse {
    id: u64,
}

/// reqwest based session bound to one DRACOON instance.
#[derive(Clone, Debug)]
pub struct DracoonClient {
    http: reqwest::Client,
    base_url: String,
    host_override: Option<String>,
    access_token: Option<String>,
}

impl DracoonClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("dcspray/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            host_override: None,
            access_token: None,
        })
    }

    /// On-premises installations keep their branding in the public cloud.
    /// Requests go to `cloud_host`, the original host travels in the `Host` header.
    pub fn routed_via(mut self, cloud_host: &str) -> Result<Self> {
        let tenant_host = host_of(&self.base_url)?;
        self.base_url = format!("https://{}", cloud_host.trim_end_matches('/'));
        self.host_override = Some(tenant_host);
        Ok(self)
    }

    pub fn with_access_token(mut self, token: String) -> Self {
        self.access_token = Some(token);
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn is_authenticated(&self) -> bool {
        self.access_token.is_some()
    }

    pub(crate) fn http(&self) -> &reqwest::Client {
        &self.http
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let builder = self.http.request(method, self.url(path)).header(ACCEPT, "application/json");
        match &self.access_token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    fn public_branding_request(&self) -> RequestBuilder {
        let builder = self.request(Method::GET, PUBLIC_BRANDING_PATH);
        match &self.host_override {
            Some(host) => builder.header(HOST, host),
            None => builder,
        }
    }

    pub(crate) async fn send_checked(builder: RequestBuilder) -> Result<Response> {
        let resp = builder.send().await?;
        Self::check_status(resp).await
    }

    /// Passes 2xx responses through, maps everything else to an error carrying the body.
    async fn check_status(resp: Response) -> Result<Response> {
        let status = resp.status();
        if status.is_success() {
            return Ok(resp);
        }
        let body = resp.text().await.unwrap_or_default();
        Err(BrandingError::from_status(status.as_u16(), body))
    }

    pub(crate) async fn read_json<T: DeserializeOwned>(resp: Response) -> Result<T> {
        let status = resp.status().as_u16();
        let bytes = resp.bytes().await?;
        serde_json::from_slice(&bytes).map_err(|e| BrandingError::Remote {
            status,
            body: format!("unparseable response: {}", e),
        })
    }
}

fn mime_for(file_name: &str) -> Option<&'static str> {
    let extension = file_name.rsplit_once('.').map(|(_, ext)| ext.to_ascii_lowercase())?;
    match extension.as_str() {
        "png" => Some("image/png"),
        "jpg" | "jpeg" => Some("image/jpeg"),
        "gif" => Some("image/gif"),
        "webp" => Some("image/webp"),
        "svg" => Some("image/svg+xml"),
        "ico" => Some("image/x-icon"),
        _ => None,
    }
}

#[async_trait]
impl BrandingSourcePort for DracoonClient {
    async fn software_version(&self) -> Result<String> {
        let resp = Self::send_checked(self.request(Method::GET, SOFTWARE_VERSION_PATH)).await?;
        let version: SoftwareVersion = Self::read_json(resp).await?;
        debug!("{} reports REST API version {}", self.base_url, version.rest_api_version);
        Ok(version.rest_api_version)
    }

    async fn public_branding(&self) -> Result<BrandingDescriptor> {
        debug!("GET public branding from {} (host override: {:?})", self.base_url, self.host_override);
        let resp = Self::send_checked(self.public_branding_request()).await?;
        Self::read_json(resp).await
    }

    async fn download_image(&self, url: &str) -> Result<ImagePayload> {
        debug!("GET image {}", url);
        let resp = Self::send_checked(self.http.get(url)).await?;
        let content_type = resp
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|s| s.to_string());
        let bytes = resp.bytes().await?.to_vec();
        Ok(ImagePayload { bytes, content_type })
    }
}

#[async_trait]
impl BrandingTargetPort for DracoonClient {
    async fn upload_image(&self, kind: ImageKind, file_name: &str, bytes: Vec<u8>) -> Result<u64> {
        let mut part = Part::bytes(bytes).file_name(file_name.to_string());
        if let Some(mime) = mime_for(file_name) {
            part = part.mime_str(mime)?;
        }
        let form = Form::new().part("file", part);

        let builder = self
            .request(Method::POST, BRANDING_FILES_PATH)
            .query(&[("type", kind.as_str())])
            .multipart(form);
        let resp = Self::send_checked(builder).await?;
        let uploaded: UploadResponse = Self::read_json(resp).await?;
        debug!("Uploaded {} as image {}", file_name, uploaded.id);
        Ok(uploaded.id)
    }

    async fn update_branding(&self, payload: &UpdateBrandingPayload) -> Result<()> {
        Self::send_checked(self.request(Method::PUT, BRANDING_PATH).json(payload)).await?;
        Ok(())
    }

    async fn current_branding(&self) -> Result<BrandingDescriptor> {
        self.public_branding().await
    }
}

// Copyright 2024 The DocAssert Authors
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
// http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use std::str::FromStr;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::{Body, Client, Method};
use tracing::debug;

use crate::domain::{HttpMethod, Request, Response};
use crate::error::{ContextError, Result};

/// Sends HTTP requests on behalf of the API steps.
#[async_trait]
pub trait RestBrowser: Send + Sync {
    async fn send(&self, request: Request) -> Result<Response>;
}

/// [`RestBrowser`] backed by a reqwest client.
///
/// Relative URLs are resolved against the base URL.
#[derive(Debug, Clone)]
pub struct ReqwestBrowser {
    client: Client,
    base_url: String,
}

impl ReqwestBrowser {
    pub fn new(base_url: &str) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn absolute_url(&self, url: &str) -> String {
        if url.starts_with("http://") || url.starts_with("https://") {
            return url.to_string();
        }

        format!("{}/{}", self.base_url, url.trim_start_matches('/'))
    }
}

#[async_trait]
impl RestBrowser for ReqwestBrowser {
    async fn send(&self, request: Request) -> Result<Response> {
        let url = self.absolute_url(&request.url);
        debug!(method = %request.http_method, url = %url, "sending request");

        let mut request_builder = self
            .client
            .request(map_method(request.http_method), url.as_str())
            .headers(map_headers(&request.headers)?);

        if let Some(body) = request.body {
            request_builder = request_builder.body(Body::from(body));
        }

        let response = request_builder.send().await?;
        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .map(|(name, value)| {
                let value = String::from_utf8_lossy(value.as_bytes()).into_owned();
                (name.as_str().to_string(), value)
            })
            .collect();
        let body = response.text().await?;

        debug!(status, url = %url, "received response");

        Ok(Response {
            status,
            headers,
            body,
        })
    }
}

fn map_headers(headers: &[(String, String)]) -> Result<HeaderMap> {
    let mut header_map = HeaderMap::new();
    for (key, value) in headers {
        let header_name = HeaderName::from_str(key.as_str())
            .map_err(|e| ContextError::Configuration(e.to_string()))?;
        let header_value = HeaderValue::from_str(value.as_str())
            .map_err(|e| ContextError::Configuration(e.to_string()))?;
        header_map.append(header_name, header_value);
    }
    Ok(header_map)
}

fn map_method(http_method: HttpMethod) -> Method {
    match http_method {
        HttpMethod::Get => Method::GET,
        HttpMethod::Post => Method::POST,
        HttpMethod::Put => Method::PUT,
        HttpMethod::Patch => Method::PATCH,
        HttpMethod::Delete => Method::DELETE,
        HttpMethod::Head => Method::HEAD,
        HttpMethod::Options => Method::OPTIONS,
    }
}

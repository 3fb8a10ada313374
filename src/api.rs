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

use std::fs;

use regex::Regex;
use tracing::{debug, info};

use crate::browser::RestBrowser;
use crate::config::ContextConfig;
use crate::domain::{HttpMethod, Request, Response};
use crate::error::{mismatch, ContextError, Result};
use crate::json_diff::path::Path;
use crate::json_diff::{compare_with, parse_document, Config};

const MALFORMED_EXPECTED: &str = "The response expected given is not a valid Json string.";
const MALFORMED_BODY: &str = "The response body given is not a valid Json string.";

/// Steps sending HTTP requests and asserting on the last response.
///
/// # Examples
///
/// ```no_run
/// use api_contexts::{ApiContext, ContextConfig, ReqwestBrowser};
///
/// async fn scenario() -> api_contexts::Result<()> {
///     let config = ContextConfig::new().with_project_dir("/srv/app");
///     let mut api = ApiContext::new(ReqwestBrowser::new("http://localhost:8080"), &config);
///     api.send_request_with_body_from_file("POST", "/users", "new_user.json").await?;
///     api.response_status_should_be(201)?;
///     api.json_response_should_be_equal_to_file("created_user.json")
/// }
/// ```
#[derive(Debug)]
pub struct ApiContext<B> {
    browser: B,
    config: ContextConfig,
    default_headers: Vec<(String, String)>,
    response: Option<Response>,
}

impl<B: RestBrowser> ApiContext<B> {
    pub fn new(browser: B, config: &ContextConfig) -> Self {
        Self {
            browser,
            config: config.clone(),
            default_headers: vec![],
            response: None,
        }
    }

    /// Header sent with every following request.
    pub fn set_header(&mut self, name: &str, value: &str) {
        self.default_headers
            .retain(|(key, _)| !key.eq_ignore_ascii_case(name));
        self.default_headers
            .push((name.to_string(), value.to_string()));
    }

    /// The last response received.
    pub fn response(&self) -> Result<&Response> {
        self.response.as_ref().ok_or_else(|| {
            ContextError::Configuration("no request has been sent yet".to_string())
        })
    }

    /// `When I send a :method request to :url`
    pub async fn send_request(&mut self, method: &str, url: &str, body: Option<String>) -> Result<()> {
        let http_method = method.parse::<HttpMethod>()?;
        let mut request = Request::new(http_method, url);
        request.headers = self.default_headers.clone();
        request.body = body;

        let response = self.browser.send(request).await?;
        info!(method = %http_method, url, status = response.status, "request sent");
        self.response = Some(response);
        Ok(())
    }

    /// `When I send a :method request to :url with content from file :bodyFileName as body`
    pub async fn send_request_with_body_from_file(
        &mut self,
        method: &str,
        url: &str,
        body_file_name: &str,
    ) -> Result<()> {
        let path = self
            .config
            .resolve(&self.config.request_fixtures, body_file_name);
        debug!(path = %path.display(), "reading request body");
        let body = fs::read_to_string(&path)?;
        self.send_request(method, url, Some(body)).await
    }

    /// `Then the response status code should be :code`
    pub fn response_status_should_be(&self, code: u16) -> Result<()> {
        let status = self.response()?.status;
        if status != code {
            return mismatch!("Response status code is {} instead of {}.", status, code);
        }
        Ok(())
    }

    /// `Then The response header :header should be equal to :value`
    pub fn response_header_should_be_equal_to(&self, header: &str, value: &str) -> Result<()> {
        let header_in_response = self.header_in_response(header)?;

        if header_in_response != value {
            return mismatch!(
                "Response header value \"{}\" is not equals to \"{}\".",
                header_in_response,
                value
            );
        }
        Ok(())
    }

    /// `Then the response header :header should be match with pattern :regex`
    ///
    /// The pattern may be wrapped in `/` delimiters; use a full match pattern
    /// such as `/^text\/html/` when possible.
    pub fn response_header_should_match(&self, header: &str, pattern: &str) -> Result<()> {
        let header_in_response = self.header_in_response(header)?;
        let regex = Regex::new(strip_delimiters(pattern))?;

        if !regex.is_match(&header_in_response) {
            return mismatch!(
                "Pattern \"{}\" not match with \"{}\" for header \"{}\".",
                pattern,
                header_in_response,
                header
            );
        }
        Ok(())
    }

    /// `Then The JSON response body should be equal to content from :responseFileName`
    pub fn json_response_should_be_equal_to_file(&self, response_file_name: &str) -> Result<()> {
        self.json_response_should_be_equal_to_file_ignoring(response_file_name, &[])
    }

    /// Same as [`Self::json_response_should_be_equal_to_file`], skipping the
    /// given JSONPaths (for generated identifiers, timestamps...).
    pub fn json_response_should_be_equal_to_file_ignoring(
        &self,
        response_file_name: &str,
        ignored: &[&str],
    ) -> Result<()> {
        let path = self
            .config
            .resolve(&self.config.response_fixtures, response_file_name);
        debug!(path = %path.display(), "reading expected response");
        let expected = fs::read_to_string(&path)?;
        self.assert_json_body(&expected, ignored)
    }

    /// `Then the JSON response body should be equal to:` with an inline document.
    pub fn json_response_should_be_equal_to(&self, expected: &str) -> Result<()> {
        self.assert_json_body(expected, &[])
    }

    fn assert_json_body(&self, expected: &str, ignored: &[&str]) -> Result<()> {
        let expected = parse_document(expected, MALFORMED_EXPECTED)?;
        let body = parse_document(&self.response()?.body, MALFORMED_BODY)?;

        let mut config = Config::new();
        for path in ignored {
            config = config.ignore_path(Path::from_jsonpath(path)?);
        }

        let report = compare_with(&body, &expected, &config);
        if !report.is_empty() {
            debug!(differences = report.len(), "json response differs");
            return mismatch!("Json don't match.\n{}", report);
        }
        Ok(())
    }

    fn header_in_response(&self, header: &str) -> Result<String> {
        match self.response()?.header(header) {
            Some(value) if !value.is_empty() => Ok(value),
            _ => mismatch!("Header \"{}\" not found.", header),
        }
    }
}

/// Accepts both `^foo$` and the delimited `/^foo$/` form.
pub(crate) fn strip_delimiters(pattern: &str) -> &str {
    match pattern
        .strip_prefix('/')
        .and_then(|inner| inner.strip_suffix('/'))
    {
        Some(inner) if !inner.is_empty() => inner,
        _ => pattern,
    }
}

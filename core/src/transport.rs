use futures::future::BoxFuture;
use reqwest::Client;
use reqwest::Method;
use tracing::debug;
use url::Url;

use crate::config::Config;
use crate::error::Result;
use crate::protocol::FormResponse;
use crate::protocol::HttpMethod;
use crate::protocol::SearchResult;

/// Header the server uses to tell AJAX submissions from full page posts.
pub const AJAX_HEADER: (&str, &str) = ("X-Requested-With", "XMLHttpRequest");

/// A resolved search request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchRequest {
    /// Endpoint with `q` already appended.
    pub url: Url,
    pub query: String,
    pub access_token: Option<String>,
}

/// A resolved form submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormSubmission {
    pub url: Url,
    pub method: HttpMethod,
    pub fields: Vec<(String, String)>,
    pub access_token: Option<String>,
}

/// Network seam of the controller.
///
/// Futures are `'static` so the controller can spawn them and keep its event
/// loop free while requests are in flight.
pub trait Transport: Send + Sync {
    fn search(&self, request: SearchRequest) -> BoxFuture<'static, Result<Vec<SearchResult>>>;

    fn submit_form(&self, submission: FormSubmission) -> BoxFuture<'static, Result<FormResponse>>;
}

/// `{endpoint}?q=<query>` resolved against the page URL.
pub fn search_url(base: &Url, endpoint: &str, query: &str) -> Result<Url> {
    let raw = format!("{endpoint}?q={}", urlencoding::encode(query));
    Ok(base.join(&raw)?)
}

/// The form's action resolved against the page URL; no action means the page
/// itself.
pub fn form_url(base: &Url, action: Option<&str>) -> Result<Url> {
    match action.map(str::trim).filter(|a| !a.is_empty()) {
        Some(action) => Ok(base.join(action)?),
        None => Ok(base.clone()),
    }
}

/// [`Transport`] over HTTP with reqwest.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    http: Client,
}

impl HttpTransport {
    pub fn new(config: &Config) -> Result<Self> {
        let mut builder = Client::builder().user_agent(concat!(
            env!("CARGO_PKG_NAME"),
            "/",
            env!("CARGO_PKG_VERSION")
        ));
        if let Some(timeout) = config.http_timeout {
            builder = builder.timeout(timeout);
        }
        Ok(Self {
            http: builder.build()?,
        })
    }

    pub fn with_client(http: Client) -> Self {
        Self { http }
    }
}

impl Transport for HttpTransport {
    fn search(&self, request: SearchRequest) -> BoxFuture<'static, Result<Vec<SearchResult>>> {
        let http = self.http.clone();
        Box::pin(async move {
            debug!("GET {}", request.url);
            let mut builder = http
                .get(request.url)
                .header(reqwest::header::ACCEPT, "application/json");
            if let Some(token) = &request.access_token {
                builder = builder.bearer_auth(token);
            }
            // The status code is not consulted: any body that is a JSON
            // array of results is rendered, anything else is a failure.
            let resp = builder.send().await?;
            let results = resp.json::<Vec<SearchResult>>().await?;
            Ok(results)
        })
    }

    fn submit_form(&self, submission: FormSubmission) -> BoxFuture<'static, Result<FormResponse>> {
        let http = self.http.clone();
        Box::pin(async move {
            let FormSubmission {
                url,
                method,
                fields,
                access_token,
            } = submission;
            debug!("{method} {url} ({} fields)", fields.len());

            let mut builder = http
                .request(reqwest_method(method), url)
                .header(AJAX_HEADER.0, AJAX_HEADER.1)
                .header(reqwest::header::ACCEPT, "application/json");
            builder = match method {
                HttpMethod::Get => builder.query(&fields),
                _ => builder.form(&fields),
            };
            if let Some(token) = &access_token {
                builder = builder.bearer_auth(token);
            }

            // Error statuses still carry the JSON contract.
            let resp = builder.send().await?;
            let body = resp.json::<FormResponse>().await?;
            Ok(body)
        })
    }
}

fn reqwest_method(method: HttpMethod) -> Method {
    match method {
        HttpMethod::Get => Method::GET,
        HttpMethod::Post => Method::POST,
        HttpMethod::Put => Method::PUT,
        HttpMethod::Patch => Method::PATCH,
        HttpMethod::Delete => Method::DELETE,
    }
}

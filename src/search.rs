use tracing::debug;
use url::Url;

use crate::error::Result;
use crate::http::{HttpGet, HttpResponse, default_http_client};
use crate::options::SearchOptions;

/// Fixed search endpoint.
/// See <https://api.stackexchange.com/docs/search>.
pub const API_URL: &str = "https://api.stackexchange.com/2.2/search";

/// One search invocation: validated options, an optional injected HTTP
/// client, and (after [`run`](Search::run)) the raw response.
///
/// # Examples
///
/// ```no_run
/// use stackexchange_search::Search;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let mut search = Search::new(serde_json::json!({ "intitle": "borrow checker" }))?;
/// let body = search.run().await?;
/// println!("{body}");
///
/// // the endpoint signals bad queries with a 400 body, not an error
/// let response = search.response().unwrap();
/// assert_eq!(response.status, 200);
/// # Ok(())
/// # }
/// ```
pub struct Search {
    options: SearchOptions,
    http: Option<Box<dyn HttpGet>>,
    request_url: Option<Url>,
    response: Option<HttpResponse>,
}

impl Search {
    /// Validates the raw options and builds a search. Fails with a
    /// validation error before any network activity if the mapping
    /// contains unknown keys, wrong types, or disallowed values.
    pub fn new(raw: serde_json::Value) -> Result<Self> {
        Ok(Self::from_options(SearchOptions::from_value(raw)?))
    }

    /// Builds a search from already-resolved options.
    pub fn from_options(options: SearchOptions) -> Self {
        Self {
            options,
            http: None,
            request_url: None,
            response: None,
        }
    }

    pub fn options(&self) -> &SearchOptions {
        &self.options
    }

    /// Injects the HTTP client to use instead of the default one.
    /// Has no effect on a request already performed.
    pub fn set_http_client(&mut self, http: impl HttpGet + 'static) {
        self.http = Some(Box::new(http));
    }

    /// The full request URL, built from the normalized options on first
    /// access and cached afterwards. Unset fields are omitted from the
    /// query string entirely.
    pub fn request_url(&mut self) -> &Url {
        if self.request_url.is_none() {
            self.request_url = Some(build_request_url(&self.options));
        }
        self.request_url.as_ref().unwrap()
    }

    /// Performs the search: exactly one GET against [`API_URL`].
    ///
    /// Returns the raw response body. Any HTTP status is a normal
    /// outcome; inspect [`response`](Search::response) for the code.
    /// Only transport-level failures surface as [`Error::Transport`].
    ///
    /// [`Error::Transport`]: crate::Error::Transport
    pub async fn run(&mut self) -> Result<String> {
        if self.request_url.is_none() {
            self.request_url = Some(build_request_url(&self.options));
        }
        let url = self.request_url.as_ref().unwrap();

        let http = self
            .http
            .get_or_insert_with(|| Box::new(default_http_client()));

        debug!(%url, "GET search");
        let response = http.send_get(url).await?;
        debug!(status = response.status, bytes = response.body.len(), "search response");

        let body = response.body.clone();
        self.response = Some(response);
        Ok(body)
    }

    /// The response from the last [`run`](Search::run), if any.
    pub fn response(&self) -> Option<&HttpResponse> {
        self.response.as_ref()
    }
}

fn build_request_url(options: &SearchOptions) -> Url {
    let mut url = Url::parse(API_URL).expect("API_URL is a valid URL");
    {
        let mut pairs = url.query_pairs_mut();
        for (name, value) in options.iter() {
            pairs.append_pair(name, &value.to_string());
        }
    }
    url
}

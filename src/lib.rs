//! A parser for reqline statements: single-line descriptions of an HTTP request.
//!
//! A statement is a sequence of sections separated by ` | ` (exactly one space on each side):
//!
//! ```text
//! HTTP GET | URL https://api.example.com/users | HEADERS {"Accept": "application/json"} | QUERY {"page": 2}
//! ```
//!
//! `HTTP` and `URL` are required and must be the first and second section. `HEADERS`, `QUERY`
//! and `BODY` are optional, carry a JSON object and may appear in any order after them. Each
//! section appears at most once.
//!
//! # Architecture
//!
//! Parsing is a hand-written pipeline with no backtracking:
//!
//! 1. **Segmentation**: the statement is split on padded `|` delimiters. Spacing is strict:
//!    no leading/trailing spaces and no doubled spaces around a delimiter
//! 2. **Keyword extraction**: each segment yields a [`Keyword`] and its raw value, separated by
//!    exactly one space
//! 3. **Section decoding**: `HEADERS`, `QUERY` and `BODY` values are decoded as JSON objects
//! 4. **Assembly**: sections are checked for order, uniqueness and method (GET or POST only),
//!    then the query is merged into [`ParsedRequest::full_url`]
//!
//! Every failure is an [`Error`] variant; [`Error::kind`] tells which stage rejected the input.
//!
//! # Examples
//!
//! ```
//! use reqline::ParsedRequest;
//! # fn main() -> Result<(), reqline::Error> {
//! let statement = r#"HTTP GET | URL https://dummyjson.com/quotes | QUERY {"limit": 3, "skip": 10}"#;
//! let request: ParsedRequest = statement.parse()?;
//! assert_eq!(request.full_url, "https://dummyjson.com/quotes?limit=3&skip=10");
//! # Ok(())
//! # }
//! ```
//!
//! Statements can be templates, rendered before parsing:
//!
//! ```
//! use reqline::ParsedRequest;
//! use serde_json::json;
//! # fn main() -> Result<(), reqline::Error> {
//! let statement = r#"HTTP POST | URL https://api.example.com/users | HEADERS {"Authorization": "Bearer {{ token }}"} | BODY {"name": "John Doe"}"#;
//! let request = ParsedRequest::load(statement, json!({ "token": "123456" }))?;
//! assert_eq!(request.headers["Authorization"], "Bearer 123456");
//! # Ok(())
//! # }
//! ```
//!
//! Executing with reqwest (requires `reqwest` feature):
//!
//! ```no_run
//! # #[cfg(feature = "reqwest")]
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let parsed = reqline::parse("HTTP GET | URL https://dummyjson.com/quotes/3")?;
//! let client = reqwest::Client::new();
//! let execution = reqline::execute(&client, &parsed).await;
//! println!("{} in {}ms", execution.http_status, execution.duration);
//! # Ok(())
//! # }
//! ```

pub(crate) mod error;
#[cfg(feature = "reqwest")]
mod exec;
mod parser;
#[cfg(feature = "server")]
pub mod server;
mod url;

use http::Method;
use serde::Serialize;
use serde_json::{Map, Value};

pub use error::{Error, ErrorKind};
#[cfg(feature = "reqwest")]
pub use exec::{Execution, execute};
pub use parser::Keyword;

/// A validated reqline statement.
///
/// Serializes to the `request` object of the HTTP front end: `query`, `body`, `headers` and
/// `full_url`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParsedRequest {
    /// Always [`Method::GET`] or [`Method::POST`].
    #[serde(skip)]
    pub method: Method,
    /// The URL section, verbatim.
    #[serde(skip)]
    pub url: String,
    pub headers: Map<String, Value>,
    pub query: Map<String, Value>,
    pub body: Map<String, Value>,
    /// `url` with the serialized query appended.
    pub full_url: String,
}

/// Parse a reqline statement.
pub fn parse(statement: &str) -> Result<ParsedRequest, Error> {
    statement.parse()
}

#[cfg(feature = "reqwest")]
impl ParsedRequest {
    /// Build the outgoing request on `client`.
    ///
    /// GET carries headers only; POST also sends `body` as JSON. Non-string header values are
    /// coerced the same way query values are.
    pub fn request_builder(&self, client: &reqwest::Client) -> reqwest::RequestBuilder {
        let builder = if self.method == Method::POST {
            client.post(&self.full_url).json(&self.body)
        } else {
            client.get(&self.full_url)
        };

        self.headers
            .iter()
            .fold(builder, |builder, (name, value)| {
                builder.header(name.as_str(), url::coerce(value))
            })
    }
}

#[cfg(feature = "reqwest")]
impl TryFrom<&ParsedRequest> for reqwest::RequestBuilder {
    type Error = reqwest::Error;

    fn try_from(req: &ParsedRequest) -> Result<Self, Self::Error> {
        let client = reqwest::Client::builder().build()?;
        Ok(req.request_builder(&client))
    }
}

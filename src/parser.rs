use crate::{ParsedRequest, error::*, url};
use http::Method;
use log::debug;
use minijinja::Environment;
use serde::Serialize;
use serde_json::{Map, Value};
use snafu::{OptionExt, ResultExt, ensure};
use std::{fmt, str::FromStr};

/// Section keywords, in the order they are expected to appear.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Keyword {
    Http,
    Url,
    Headers,
    Query,
    Body,
}

impl Keyword {
    pub const ALL: [Keyword; 5] = [
        Keyword::Http,
        Keyword::Url,
        Keyword::Headers,
        Keyword::Query,
        Keyword::Body,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Keyword::Http => "HTTP",
            Keyword::Url => "URL",
            Keyword::Headers => "HEADERS",
            Keyword::Query => "QUERY",
            Keyword::Body => "BODY",
        }
    }

    /// Exact, case-sensitive lookup.
    pub fn lookup(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.as_str() == s)
    }
}

impl fmt::Display for Keyword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Sections already seen in a statement.
#[derive(Debug, Default)]
struct KeywordSet([bool; Keyword::ALL.len()]);

impl KeywordSet {
    /// Returns `false` if `keyword` was already present.
    fn insert(&mut self, keyword: Keyword) -> bool {
        !std::mem::replace(&mut self.0[keyword as usize], true)
    }
}

/// Byte cursor over a statement with fixed lookahead/lookbehind around the current position.
struct Cursor<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn new(input: &'a str) -> Self {
        Self {
            bytes: input.as_bytes(),
            pos: 0,
        }
    }

    /// Move to the next occurrence of `byte` at or after the current position.
    fn seek(&mut self, byte: u8) -> Option<usize> {
        let offset = self.bytes.get(self.pos..)?.iter().position(|b| *b == byte)?;
        self.pos += offset;
        Some(self.pos)
    }

    fn advance(&mut self) {
        self.pos += 1;
    }

    fn peek(&self, offset: isize) -> Option<u8> {
        let idx = self.pos.checked_add_signed(offset)?;
        self.bytes.get(idx).copied()
    }

    fn prev_prev(&self) -> Option<u8> {
        self.peek(-2)
    }

    fn prev(&self) -> Option<u8> {
        self.peek(-1)
    }

    fn next(&self) -> Option<u8> {
        self.peek(1)
    }

    fn next_next(&self) -> Option<u8> {
        self.peek(2)
    }

    /// ` | ` with exactly one space on each side.
    fn at_padded_delimiter(&self) -> bool {
        let space = Some(b' ');
        let solid = |b: Option<u8>| b.is_some_and(|b| b != b' ');
        self.prev() == space
            && self.next() == space
            && solid(self.prev_prev())
            && solid(self.next_next())
    }
}

/// Split a statement into its ` | ` separated segments.
pub(crate) fn segment(input: &str) -> Result<Vec<&str>> {
    ensure!(!input.is_empty(), EmptyInputSnafu);
    ensure!(
        !input.starts_with(' ') && !input.ends_with(' '),
        BoundarySpacingSnafu
    );

    let mut segments = Vec::with_capacity(Keyword::ALL.len());
    let mut start = 0;
    let mut cursor = Cursor::new(input);
    while let Some(position) = cursor.seek(b'|') {
        ensure!(cursor.at_padded_delimiter(), PipeSpacingSnafu { position });
        // the delimiter is ASCII, so both ends are char boundaries
        let segment = input
            .get(start..position - 1)
            .filter(|s| !s.is_empty())
            .context(PipeSpacingSnafu { position })?;
        segments.push(segment);
        start = position + 2;
        cursor.advance();
    }

    let rest = input
        .get(start..)
        .filter(|s| !s.is_empty())
        .context(PipeSpacingSnafu {
            position: input.len(),
        })?;
    segments.push(rest);
    Ok(segments)
}

/// Split a segment into its keyword and raw value.
pub(crate) fn extract(segment: &str) -> Result<(Keyword, &str)> {
    let (keyword, value) = segment
        .split_once(' ')
        .context(MissingSpaceAfterKeywordSnafu)?;
    let keyword = Keyword::lookup(keyword).context(NonUppercaseKeywordSnafu { keyword })?;
    ensure!(!value.is_empty(), MissingSpaceAfterKeywordSnafu);
    ensure!(!value.starts_with(' '), MultipleSpacesSnafu);
    Ok((keyword, value))
}

/// Decode the JSON object carried by a HEADERS, QUERY or BODY section.
pub(crate) fn decode_section(raw: &str, section: Keyword) -> Result<Map<String, Value>> {
    serde_json::from_str(raw).context(InvalidSectionJsonSnafu { section })
}

fn parse_method(value: &str) -> Result<Method> {
    ensure!(
        value == value.to_uppercase(),
        NonUppercaseMethodSnafu { method: value }
    );
    match value {
        "GET" => Ok(Method::GET),
        "POST" => Ok(Method::POST),
        _ => UnsupportedMethodSnafu { method: value }.fail(),
    }
}

fn leading_token(segment: &str) -> &str {
    segment.split(' ').next().unwrap_or_default()
}

fn parse_input(input: &str) -> Result<ParsedRequest> {
    let segments = segment(input)?;
    ensure!(
        segments.first().copied().map(leading_token) == Some(Keyword::Http.as_str()),
        MissingHttpKeywordSnafu
    );
    ensure!(
        segments.get(1).copied().map(leading_token) == Some(Keyword::Url.as_str()),
        MissingUrlKeywordSnafu
    );

    let mut seen = KeywordSet::default();
    let mut method = None;
    let mut url = None;
    let mut headers = Map::new();
    let mut query = Map::new();
    let mut body = Map::new();
    for segment in segments {
        let (keyword, value) = extract(segment)?;
        ensure!(seen.insert(keyword), DuplicateSectionSnafu { keyword });
        match keyword {
            Keyword::Http => method = Some(parse_method(value)?),
            Keyword::Url => url = Some(value.to_owned()),
            Keyword::Headers => headers = decode_section(value, keyword)?,
            Keyword::Query => query = decode_section(value, keyword)?,
            Keyword::Body => body = decode_section(value, keyword)?,
        }
    }

    let method = method.context(MissingHttpKeywordSnafu)?;
    let url = url.context(MissingUrlKeywordSnafu)?;
    let full_url = url::build(&url, &query);
    Ok(ParsedRequest {
        method,
        url,
        headers,
        query,
        body,
        full_url,
    })
}

impl ParsedRequest {
    /// Render `input` as a template with `context`, then parse the result.
    pub fn load(input: &str, context: impl Serialize) -> Result<Self> {
        let env = Environment::new();
        let input = env.render_str(input, context).context(RenderSnafu)?;
        input.parse()
    }
}

impl FromStr for ParsedRequest {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        parse_input(s).inspect_err(|e| debug!("rejected reqline statement {s:?}: {e}"))
    }
}

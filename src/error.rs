use crate::parser::Keyword;
use snafu::Snafu;

pub(crate) type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum Error {
    #[snafu(display("Reqline statement is empty"))]
    EmptyInput,
    #[snafu(display("Reqline statement must not start or end with a space"))]
    BoundarySpacing,
    #[snafu(display("Invalid spacing around pipe delimiter at position {position}"))]
    PipeSpacing { position: usize },

    #[snafu(display("Missing space after keyword"))]
    MissingSpaceAfterKeyword,
    #[snafu(display("Multiple spaces found where single space expected"))]
    MultipleSpaces,
    #[snafu(display("Keywords must be one of HTTP, URL, HEADERS, QUERY, BODY in uppercase: {keyword}"))]
    NonUppercaseKeyword { keyword: String },

    #[snafu(display("Missing required HTTP keyword"))]
    MissingHttpKeyword,
    #[snafu(display("Missing required URL keyword"))]
    MissingUrlKeyword,
    #[snafu(display("Duplicate {keyword} section"))]
    DuplicateSection { keyword: Keyword },
    #[snafu(display("HTTP method must be uppercase: {method}"))]
    NonUppercaseMethod { method: String },
    #[snafu(display("Invalid HTTP method {method}. Only GET and POST are supported"))]
    UnsupportedMethod { method: String },

    #[snafu(display("Invalid JSON format in {section} section: {source}"))]
    InvalidSectionJson {
        section: Keyword,
        source: serde_json::Error,
    },

    #[snafu(display("Failed to render reqline template"))]
    Render { source: minijinja::Error },
}

/// Coarse classification of [`Error`], one class per pipeline stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Whitespace and delimiter layout of the statement.
    Structural,
    /// Keywords, section ordering and the HTTP method.
    Grammar,
    /// JSON payload of HEADERS, QUERY or BODY.
    SectionDecode,
    /// Template rendering before parsing.
    Template,
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::EmptyInput
            | Error::BoundarySpacing
            | Error::PipeSpacing { .. }
            | Error::MissingSpaceAfterKeyword
            | Error::MultipleSpaces => ErrorKind::Structural,
            Error::NonUppercaseKeyword { .. }
            | Error::MissingHttpKeyword
            | Error::MissingUrlKeyword
            | Error::DuplicateSection { .. }
            | Error::NonUppercaseMethod { .. }
            | Error::UnsupportedMethod { .. } => ErrorKind::Grammar,
            Error::InvalidSectionJson { .. } => ErrorKind::SectionDecode,
            Error::Render { .. } => ErrorKind::Template,
        }
    }

    /// The section this error is attributed to, if any.
    pub fn section(&self) -> Option<Keyword> {
        match self {
            Error::InvalidSectionJson { section, .. } => Some(*section),
            Error::DuplicateSection { keyword } => Some(*keyword),
            _ => None,
        }
    }
}

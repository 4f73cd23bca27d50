//! Test report parsing error types.

use thiserror::Error;

/// Errors that can occur while turning a build payload into test results.
///
/// Any of these aborts the whole report: no partial actions are taken.
#[derive(Debug, Error)]
pub enum ParseError {
    /// The report was empty.
    #[error("Test report is empty")]
    Empty,

    /// The payload carried neither `xunitXML` nor `testsFailed`.
    #[error("Payload has no test report (expected xunitXML or testsFailed)")]
    MissingReport,

    /// The payload does not name a repository.
    #[error("Payload does not identify a repository")]
    MissingRepository,

    /// `xunitXML` was not valid base64.
    #[error("Failed to decode xunitXML: {0}")]
    Base64(#[from] base64::DecodeError),

    /// The decoded report was not UTF-8.
    #[error("Test report is not valid UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),

    /// The report is not well-formed XML.
    #[error("Malformed XML: {0}")]
    Xml(#[from] quick_xml::Error),

    /// An entity could not be unescaped.
    #[error("Malformed XML escape: {0}")]
    Escape(#[from] quick_xml::escape::EscapeError),

    /// An attribute could not be read.
    #[error("Malformed XML attribute: {0}")]
    Attribute(#[from] quick_xml::events::attributes::AttrError),

    /// The document root is not a test suite.
    #[error("Unexpected root element <{0}>, expected <testsuites> or <testsuite>")]
    UnexpectedRoot(String),

    /// The document ended inside an open element.
    #[error("Test report ends before all elements are closed")]
    Truncated,

    /// A test case has no name.
    #[error("Test case without a name attribute")]
    UnnamedTestCase,
}

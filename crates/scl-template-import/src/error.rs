// crates/scl-template-import/src/error.rs

use crate::templates::TypeKind;
use quick_xml::Error as XmlError;
use quick_xml::escape::EscapeError;
use std::fmt;
use std::io;
use std::str::Utf8Error;

/// Errors that can occur while loading SCL documents or merging template IEDs.
#[derive(Debug)]
pub enum SclError {
    /// An error from the underlying `quick-xml` reader (malformed XML).
    XmlParsing(XmlError),

    /// An error from the underlying `quick-xml` writer (e.g., I/O).
    XmlWriting(io::Error),

    /// An attribute value or text contained an invalid escape sequence.
    Escape(EscapeError),

    /// The document contained bytes that are not valid UTF-8.
    Utf8(Utf8Error),

    /// The input ended while an element was still open.
    UnclosedElement { element: String },

    /// More than one element was found at the top level of the document.
    MultipleRootElements,

    /// A required XML element was missing (e.g., the document root).
    MissingElement { element: &'static str },

    /// A required attribute was missing (e.g., `IED@name`).
    MissingAttribute {
        element: &'static str,
        attribute: &'static str,
    },

    /// The parser reported a `parsererror` marker instead of a document.
    ParserError,

    /// The document has no root-level `IED` named `TEMPLATE`.
    MissingTemplate,

    /// An edit refers to a node that does not exist or cannot take children.
    InvalidEditTarget(&'static str),

    /// The data type templates reference each other in a cycle.
    CyclicTypeReference { kind: TypeKind, id: String },

    /// The next batch was requested before the previous one was applied.
    BatchNotApplied,
}

impl From<XmlError> for SclError {
    fn from(e: XmlError) -> Self {
        SclError::XmlParsing(e)
    }
}

impl From<io::Error> for SclError {
    fn from(e: io::Error) -> Self {
        SclError::XmlWriting(e)
    }
}

impl From<EscapeError> for SclError {
    fn from(e: EscapeError) -> Self {
        SclError::Escape(e)
    }
}

impl From<Utf8Error> for SclError {
    fn from(e: Utf8Error) -> Self {
        SclError::Utf8(e)
    }
}

impl fmt::Display for SclError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SclError::XmlParsing(e) => write!(f, "XML parsing error: {}", e),
            SclError::XmlWriting(e) => write!(f, "XML writing error: {}", e),
            SclError::Escape(e) => write!(f, "Invalid escape sequence: {}", e),
            SclError::Utf8(e) => write!(f, "Invalid UTF-8: {}", e),
            SclError::UnclosedElement { element } => {
                write!(f, "Unexpected end of input inside element: {}", element)
            }
            SclError::MultipleRootElements => {
                write!(f, "Document has more than one root element")
            }
            SclError::MissingElement { element } => {
                write!(f, "Missing required XML element: {}", element)
            }
            SclError::MissingAttribute { element, attribute } => {
                write!(f, "Missing required attribute: {}@{}", element, attribute)
            }
            SclError::ParserError => write!(f, "Document contains a parser error"),
            SclError::MissingTemplate => {
                write!(f, "No IED named TEMPLATE at the document root")
            }
            SclError::InvalidEditTarget(msg) => write!(f, "Invalid edit target: {}", msg),
            SclError::CyclicTypeReference { kind, id } => {
                write!(f, "Cyclic reference through {} id={}", kind, id)
            }
            SclError::BatchNotApplied => {
                write!(f, "The previous edit batch has not been applied yet")
            }
        }
    }
}

impl std::error::Error for SclError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SclError::XmlParsing(e) => Some(e),
            SclError::XmlWriting(e) => Some(e),
            SclError::Escape(e) => Some(e),
            SclError::Utf8(e) => Some(e),
            _ => None,
        }
    }
}

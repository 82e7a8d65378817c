use std::fmt;

use crate::ProtocolError;
use crate::OK_REPLY;

/// Reply value as produced by the module's host server
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    Nil,
    Status(String),
    Int(i64),
    Bulk(Vec<u8>),
    Array(Vec<Reply>),
    Error(String),
}

impl Reply {
    /// `true` for the literal `OK` acknowledgement, status or bulk
    pub fn is_ok(&self) -> bool {
        self.as_text().is_some_and(|s| s == OK_REPLY)
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Reply::Status(s) => Some(s),
            Reply::Bulk(b) => std::str::from_utf8(b).ok(),
            _ => None,
        }
    }

    /// Integer value of an integer reply or of a numeric text reply
    pub fn as_i64(&self) -> std::result::Result<i64, ProtocolError> {
        match self {
            Reply::Int(i) => Ok(*i),
            other => other
                .as_text()
                .and_then(|s| s.trim().parse::<i64>().ok())
                .ok_or_else(|| ProtocolError::InvalidInteger(other.to_string())),
        }
    }

    pub fn into_array(
        self,
        command: &'static str,
    ) -> std::result::Result<Vec<Reply>, ProtocolError> {
        match self {
            Reply::Array(items) => Ok(items),
            other => Err(ProtocolError::UnexpectedReply {
                command,
                expected: "array",
                got: other.to_string(),
            }),
        }
    }

    /// Text of a bulk/status reply, or the message of an error reply
    pub fn into_string(
        self,
        command: &'static str,
    ) -> std::result::Result<String, ProtocolError> {
        match self {
            Reply::Status(s) | Reply::Error(s) => Ok(s),
            Reply::Bulk(b) => String::from_utf8(b).map_err(|e| ProtocolError::UnexpectedReply {
                command,
                expected: "utf-8 string",
                got: format!("<{} invalid bytes>", e.as_bytes().len()),
            }),
            Reply::Int(i) => Ok(i.to_string()),
            other => Err(ProtocolError::UnexpectedReply {
                command,
                expected: "string",
                got: other.to_string(),
            }),
        }
    }
}

impl fmt::Display for Reply {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        match self {
            Reply::Nil => write!(f, "(nil)"),
            Reply::Status(s) => write!(f, "{s}"),
            Reply::Int(i) => write!(f, "(integer) {i}"),
            Reply::Bulk(b) => match std::str::from_utf8(b) {
                Ok(s) => write!(f, "{s:?}"),
                Err(_) => write!(f, "<{} bytes>", b.len()),
            },
            Reply::Array(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{item}")?;
                }
                write!(f, "]")
            }
            Reply::Error(e) => write!(f, "(error) {e}"),
        }
    }
}

impl From<&str> for Reply {
    fn from(s: &str) -> Self {
        Reply::Bulk(s.as_bytes().to_vec())
    }
}

impl From<String> for Reply {
    fn from(s: String) -> Self {
        Reply::Bulk(s.into_bytes())
    }
}

impl From<i64> for Reply {
    fn from(i: i64) -> Self {
        Reply::Int(i)
    }
}

impl From<Vec<Reply>> for Reply {
    fn from(items: Vec<Reply>) -> Self {
        Reply::Array(items)
    }
}

/// One row of a registration or execution dump: `(metadata..., id, ...)`.
///
/// Dumps are flat key/value arrays whose second element carries the id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DumpEntry {
    pub id: String,
    pub fields: Vec<Reply>,
}

impl DumpEntry {
    pub fn parse(
        reply: Reply,
        command: &'static str,
    ) -> std::result::Result<Self, ProtocolError> {
        let fields = reply.into_array(command)?;
        let id = fields
            .get(1)
            .cloned()
            .ok_or_else(|| ProtocolError::UnexpectedReply {
                command,
                expected: "(metadata, id) tuple",
                got: Reply::Array(fields.clone()).to_string(),
            })?
            .into_string(command)?;

        Ok(Self { id, fields })
    }

    pub fn parse_all(
        reply: Reply,
        command: &'static str,
    ) -> std::result::Result<Vec<Self>, ProtocolError> {
        reply
            .into_array(command)?
            .into_iter()
            .map(|r| Self::parse(r, command))
            .collect()
    }
}

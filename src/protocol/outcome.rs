use serde_json::Value;

use crate::ProtocolError;
use crate::Reply;
use crate::RG_JEXECUTE;

/// Reply of a submit-execution call, decided once at the protocol boundary
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmissionOutcome {
    /// Artifact ran and answered with the bare `OK` literal
    Simple,
    /// Artifact produced a `(results, errors)` pair
    Detailed {
        results: Vec<String>,
        errors: Vec<String>,
    },
}

impl SubmissionOutcome {
    pub fn parse(reply: Reply) -> std::result::Result<Self, ProtocolError> {
        if reply.is_ok() {
            return Ok(Self::Simple);
        }

        let got = reply.to_string();
        let mut parts = reply.into_array(RG_JEXECUTE)?.into_iter();
        let (Some(results), Some(errors), None) = (parts.next(), parts.next(), parts.next()) else {
            return Err(ProtocolError::UnexpectedReply {
                command: RG_JEXECUTE,
                expected: "\"OK\" or (results, errors) pair",
                got,
            });
        };

        Ok(Self::Detailed {
            results: strings(results)?,
            errors: strings(errors)?,
        })
    }

    /// Empty outcome used when the submission itself failed
    pub fn empty() -> Self {
        Self::Detailed {
            results: Vec::new(),
            errors: Vec::new(),
        }
    }

    /// Decodes each result as a structured record and returns the error
    /// entries alongside. `OK` passes through without decoding.
    pub fn decode(&self) -> std::result::Result<(DecodedResults, Vec<String>), ProtocolError> {
        match self {
            Self::Simple => Ok((DecodedResults::Ok, Vec::new())),
            Self::Detailed { results, errors } => {
                let records = results
                    .iter()
                    .map(|r| serde_json::from_str::<Value>(r))
                    .collect::<std::result::Result<Vec<_>, _>>()?;
                Ok((DecodedResults::Records(records), errors.clone()))
            }
        }
    }
}

/// Results handed to the test body
#[derive(Debug, Clone, PartialEq)]
pub enum DecodedResults {
    Ok,
    Records(Vec<Value>),
}

impl DecodedResults {
    pub fn is_ok_literal(&self) -> bool {
        matches!(self, DecodedResults::Ok)
    }

    /// Decoded records, empty for the `OK` literal
    pub fn records(&self) -> &[Value] {
        match self {
            DecodedResults::Ok => &[],
            DecodedResults::Records(records) => records,
        }
    }
}

fn strings(reply: Reply) -> std::result::Result<Vec<String>, ProtocolError> {
    reply
        .into_array(RG_JEXECUTE)?
        .into_iter()
        .map(|r| r.into_string(RG_JEXECUTE))
        .collect()
}

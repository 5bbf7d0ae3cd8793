//! Purpose: JSON request/response shapes for the sort endpoints.
//! Exports: `SortRequest`, `SortResponse`, `decode_request`.
//! Role: Request decoder and response encoder shared by the server and `compare`.
//! Invariants: Decode failures are `Usage` errors whose message is the parser text.
//! Invariants: Missing or null batches and null rows decode as empty.
//! Invariants: The `to_sort` key matches case-insensitively; the last occurrence wins.
//! Invariants: Only the first JSON value in a body is decoded; trailing bytes are ignored.

use std::fmt;

use serde::de::{IgnoredAny, MapAccess, Visitor};
use serde::{Deserialize, Deserializer, Serialize};

use crate::core::error::{Error, ErrorKind};
use crate::core::sort::SortOutcome;

const BATCH_FIELD: &str = "to_sort";

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct SortRequest {
    pub to_sort: Vec<Vec<i64>>,
}

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct SortResponse {
    pub sorted_arrays: Vec<Vec<i64>>,
    pub time_ns: u64,
}

impl From<SortOutcome> for SortResponse {
    fn from(outcome: SortOutcome) -> Self {
        let time_ns = outcome.time_ns();
        Self {
            sorted_arrays: outcome.sorted,
            time_ns,
        }
    }
}

impl<'de> Deserialize<'de> for SortRequest {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_map(SortRequestVisitor)
    }
}

struct SortRequestVisitor;

impl<'de> Visitor<'de> for SortRequestVisitor {
    type Value = SortRequest;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("an object with a `to_sort` field")
    }

    fn visit_map<A>(self, mut map: A) -> Result<SortRequest, A::Error>
    where
        A: MapAccess<'de>,
    {
        let mut to_sort = Vec::new();
        while let Some(key) = map.next_key::<String>()? {
            if key.eq_ignore_ascii_case(BATCH_FIELD) {
                let rows = map.next_value::<Option<Vec<Option<Vec<i64>>>>>()?;
                to_sort = rows
                    .unwrap_or_default()
                    .into_iter()
                    .map(Option::unwrap_or_default)
                    .collect();
            } else {
                map.next_value::<IgnoredAny>()?;
            }
        }
        Ok(SortRequest { to_sort })
    }
}

pub fn decode_request(body: &[u8]) -> Result<SortRequest, Error> {
    let mut values = serde_json::Deserializer::from_slice(body).into_iter::<Option<SortRequest>>();
    match values.next() {
        Some(Ok(request)) => Ok(request.unwrap_or_default()),
        Some(Err(err)) => Err(decode_error(err.to_string()).with_source(err)),
        None => Err(decode_error("EOF")),
    }
}

fn decode_error(message: impl Into<String>) -> Error {
    Error::new(ErrorKind::Usage)
        .with_message(message)
        .with_hint(r#"Send a JSON object like {"to_sort": [[3, 1, 2]]}."#)
}

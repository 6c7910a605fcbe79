// ai
//! ✉️ The Envelope - what the upstream API actually sends, before we flatten it into rows.
//!
//! ```text
//!  {
//!    "results": [ { shift, with breaks/allowances/award_interpretations inside } ],
//!    "links":   { "base": "http://host", "next": "/api/shifts?start=1&limit=1" },
//!    "start": 0, "limit": 1, "size": 1
//!  }
//! ```
//!
//! 🧠 Knowledge graph:
//! - `ShiftPageBody` + `Api*` structs → consumed by `transforms::transform_page`
//! - `PageLinks` → consumed by the supervisor to decide FETCHING vs DONE
//! - Missing required keys fail deserialization, which `transforms` turns into
//!   `EtlError::StructuralFormat`. Partial records are not a thing here.
//!
//! The "next link" is typed: it leaves this module as a resolved absolute `Url` or not at all.
//! No string surgery on URLs downstream. The string surgery happens here, once, supervised. 🦆

use chrono::NaiveDate;
use reqwest::Url;
use serde::{Deserialize, Deserializer};
use serde_json::{Map, Value};

use crate::error::EtlError;

/// 🪪 Upstream ids are UUID strings in practice, but a bare integer is still an id.
#[derive(Deserialize)]
#[serde(untagged)]
enum RawId {
    Text(String),
    Integer(i64),
}

// -- every id lands in a TEXT primary key, so integers become their decimal string
fn id_as_text<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match RawId::deserialize(deserializer)? {
        RawId::Text(text) => text,
        RawId::Integer(number) => number.to_string(),
    })
}

/// 📦 The part of a page the transformer cares about.
#[derive(Debug, Deserialize)]
pub(crate) struct ShiftPageBody {
    pub results: Vec<ApiShift>,
}

/// 🗓️ A shift as upstream sends it. The three nested lists are required, empty is fine.
#[derive(Debug, Deserialize)]
pub(crate) struct ApiShift {
    #[serde(deserialize_with = "id_as_text")]
    pub id: String,
    pub date: NaiveDate,
    // -- raw on purpose: the timestamp normalizer decides what counts as a timestamp
    #[serde(default)]
    pub start: Value,
    #[serde(default)]
    pub finish: Value,
    pub breaks: Vec<ApiBreak>,
    pub allowances: Vec<ApiAllowance>,
    pub award_interpretations: Vec<ApiAwardInterpretation>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ApiBreak {
    #[serde(deserialize_with = "id_as_text")]
    pub id: String,
    #[serde(default)]
    pub start: Value,
    #[serde(default)]
    pub finish: Value,
    pub paid: bool,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ApiAllowance {
    #[serde(deserialize_with = "id_as_text")]
    pub id: String,
    pub value: f64,
    pub cost: f64,
    // -- anything we don't map rides along untouched
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ApiAwardInterpretation {
    #[serde(deserialize_with = "id_as_text")]
    pub id: String,
    pub date: NaiveDate,
    pub units: f64,
    pub cost: f64,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// 🔗 The pagination half of the envelope.
///
/// `base` only shows up in some envelope versions. When it's there, `next` is relative to it.
/// When it isn't, `next` is relative to whatever URL served the page.
#[derive(Debug, Default, Deserialize, PartialEq, Eq)]
pub(crate) struct PageLinks {
    #[serde(default)]
    pub next: Option<String>,
    #[serde(default)]
    pub base: Option<String>,
}

impl PageLinks {
    /// 📬 Pull `links` out of a page body. No `links` object at all means "last page".
    pub(crate) fn from_page(body: &Value) -> Result<Self, EtlError> {
        match body.get("links") {
            None | Some(Value::Null) => Ok(Self::default()),
            Some(links) => PageLinks::deserialize(links)
                .map_err(|err| EtlError::structural(format!("'links' is malformed: {err}"))),
        }
    }

    /// 🧭 Resolve `next` into an absolute URL, or `None` when the chain ends here.
    ///
    /// An absolute `next` wins outright (that's just how `Url::join` works, bless it).
    pub(crate) fn resolve_next(&self, page_url: &Url) -> Result<Option<Url>, EtlError> {
        let Some(next) = self.next.as_deref().map(str::trim).filter(|n| !n.is_empty()) else {
            return Ok(None);
        };

        let anchor = match self.base.as_deref().map(str::trim).filter(|b| !b.is_empty()) {
            Some(base) => Url::parse(base).map_err(|err| EtlError::InvalidUrl {
                url: base.to_string(),
                reason: err.to_string(),
            })?,
            None => page_url.clone(),
        };

        anchor.join(next).map(Some).map_err(|err| EtlError::InvalidUrl {
            url: next.to_string(),
            reason: err.to_string(),
        })
    }
}

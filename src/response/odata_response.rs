//! Uniform access to decoded responses

use std::io::Read;

use log::debug;

use crate::errors::{ODataError, Result};
use crate::response::feed::{AnnotatedEntry, AnnotatedFeed, ResponseNode};
use crate::response::RESULT_KEY;
use crate::value::{FromValue, Properties, Value};

#[derive(Debug, Clone)]
enum Payload {
    Feed(AnnotatedFeed),
    Batch(Vec<ODataResponse>),
    StatusCode(u16),
}

/// A decoded response: a feed, a batch of sub-responses, or a bare status
/// code. Exactly one of the three is present.
#[derive(Debug, Clone)]
pub struct ODataResponse {
    payload: Payload,
}

impl ODataResponse {
    /// From a decoded feed, or a single entry wrapped into a feed
    pub fn from_node(node: ResponseNode) -> Self {
        let feed = match node.feed {
            Some(feed) => feed,
            None => AnnotatedFeed::new(node.entry.into_iter().collect()),
        };
        ODataResponse::from_feed(feed)
    }

    /// A single named value; without a name the value is stored under `__result`
    pub fn from_property<V: Into<Value>>(name: Option<&str>, value: V) -> Self {
        let mut data = Properties::new();
        data.insert(name.unwrap_or(RESULT_KEY).to_string(), value.into());
        ODataResponse::from_feed(AnnotatedFeed::new(vec![AnnotatedEntry::new(data)]))
    }

    /// Read a raw value body (`$value`, `$count`) as one text property
    pub fn from_value_stream<R: Read>(mut reader: R) -> Result<Self> {
        let mut text = String::new();
        reader.read_to_string(&mut text)?;
        debug!("Read {} bytes of raw value", text.len());
        Ok(ODataResponse::from_property(None, text))
    }

    /// Each value becomes a single-property entry under `__result`
    pub fn from_collection<I>(values: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<Value>,
    {
        let entries = values
            .into_iter()
            .map(|value| {
                let mut data = Properties::new();
                data.insert(RESULT_KEY.to_string(), value.into());
                AnnotatedEntry::new(data)
            })
            .collect();
        ODataResponse::from_feed(AnnotatedFeed::new(entries))
    }

    pub fn from_batch(responses: Vec<ODataResponse>) -> Self {
        ODataResponse {
            payload: Payload::Batch(responses),
        }
    }

    pub fn from_status_code(code: u16) -> Self {
        ODataResponse {
            payload: Payload::StatusCode(code),
        }
    }

    pub fn empty_feed() -> Self {
        ODataResponse::from_feed(AnnotatedFeed::default())
    }

    fn from_feed(feed: AnnotatedFeed) -> Self {
        ODataResponse {
            payload: Payload::Feed(feed),
        }
    }

    pub fn feed(&self) -> Option<&AnnotatedFeed> {
        match &self.payload {
            Payload::Feed(feed) => Some(feed),
            _ => None,
        }
    }

    /// Mutable feed access, for attaching annotations of later pages
    pub fn feed_mut(&mut self) -> Option<&mut AnnotatedFeed> {
        match &mut self.payload {
            Payload::Feed(feed) => Some(feed),
            _ => None,
        }
    }

    pub fn batch(&self) -> Option<&[ODataResponse]> {
        match &self.payload {
            Payload::Batch(responses) => Some(responses),
            _ => None,
        }
    }

    pub fn status_code(&self) -> Option<u16> {
        match self.payload {
            Payload::StatusCode(code) => Some(code),
            _ => None,
        }
    }

    /// Entry data of the feed, `None` when the response carries no feed.
    ///
    /// When every entry is a lone `__result` property holding a property
    /// map, the maps themselves are returned.
    pub fn as_entries(&self, include_annotations: bool) -> Option<Vec<Properties>> {
        let entries = self.feed()?.entries();

        let wrapped = !entries.is_empty()
            && entries.iter().all(|entry| {
                entry.data().len() == 1
                    && matches!(entry.data().get(RESULT_KEY), Some(Value::Object(_)))
            });

        let data = entries
            .iter()
            .map(|entry| match entry.data().get(RESULT_KEY) {
                Some(Value::Object(inner)) if wrapped => inner.clone(),
                _ => entry.data_with_annotations(include_annotations).into_owned(),
            })
            .collect();
        Some(data)
    }

    /// First entry, if any
    pub fn as_entry(&self, include_annotations: bool) -> Option<Properties> {
        self.as_entries(include_annotations)?.into_iter().next()
    }

    /// First value of the first entry; null or absent yields `T::default()`.
    ///
    /// Entry properties are kept sorted by name, so "first" means the
    /// alphabetically first property, not the first one in the payload.
    pub fn as_scalar<T: FromValue + Default>(&self) -> Result<T> {
        let value = self
            .as_entry(false)
            .and_then(|entry| entry.into_values().next());

        match value {
            None | Some(Value::Null) => Ok(T::default()),
            Some(value) => T::from_value(&value),
        }
    }

    /// Every value of every entry, in feed order; within an entry values
    /// follow property-name order
    pub fn as_array<T: FromValue>(&self) -> Result<Vec<T>> {
        let entries = self
            .as_entries(false)
            .ok_or_else(|| ODataError::InvalidOperation("Response does not contain a feed".to_string()))?;

        entries
            .iter()
            .flat_map(|entry| entry.values())
            .map(T::from_value)
            .collect()
    }
}

//! Annotated entries and feeds

use std::borrow::Cow;

use crate::response::annotations::{EntryAnnotations, FeedAnnotations};
use crate::response::ANNOTATIONS_KEY;
use crate::value::Properties;

/// Property data of one entry plus its optional annotations
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AnnotatedEntry {
    data: Properties,
    annotations: Option<EntryAnnotations>,
}

impl AnnotatedEntry {
    pub fn new(data: Properties) -> Self {
        AnnotatedEntry {
            data,
            annotations: None,
        }
    }

    pub fn with_annotations(data: Properties, annotations: EntryAnnotations) -> Self {
        AnnotatedEntry {
            data,
            annotations: Some(annotations),
        }
    }

    pub fn data(&self) -> &Properties {
        &self.data
    }

    pub fn annotations(&self) -> Option<&EntryAnnotations> {
        self.annotations.as_ref()
    }

    /// Set annotations, merging into any already present
    pub fn set_annotations(&mut self, annotations: EntryAnnotations) {
        match self.annotations.as_mut() {
            Some(existing) => existing.merge(annotations),
            None => self.annotations = Some(annotations),
        }
    }

    /// Entry data, with annotations under `__annotations` when requested.
    ///
    /// The stored data is never modified; annotations go into a copy.
    pub fn data_with_annotations(&self, include_annotations: bool) -> Cow<'_, Properties> {
        match (&self.annotations, include_annotations) {
            (Some(annotations), true) => {
                let mut data = self.data.clone();
                data.insert(ANNOTATIONS_KEY.to_string(), annotations.to_value());
                Cow::Owned(data)
            }
            _ => Cow::Borrowed(&self.data),
        }
    }
}

/// Ordered entries plus optional feed annotations
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AnnotatedFeed {
    entries: Vec<AnnotatedEntry>,
    annotations: Option<FeedAnnotations>,
}

impl AnnotatedFeed {
    pub fn new(entries: Vec<AnnotatedEntry>) -> Self {
        AnnotatedFeed {
            entries,
            annotations: None,
        }
    }

    pub fn with_annotations(entries: Vec<AnnotatedEntry>, annotations: FeedAnnotations) -> Self {
        AnnotatedFeed {
            entries,
            annotations: Some(annotations),
        }
    }

    pub fn entries(&self) -> &[AnnotatedEntry] {
        &self.entries
    }

    pub fn annotations(&self) -> Option<&FeedAnnotations> {
        self.annotations.as_ref()
    }

    /// Set annotations, merging into any already present
    pub fn set_annotations(&mut self, annotations: FeedAnnotations) {
        match self.annotations.as_mut() {
            Some(existing) => existing.merge(annotations),
            None => self.annotations = Some(annotations),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Decoded payload: either a feed or a single entry
#[derive(Debug, Clone, Default)]
pub struct ResponseNode {
    pub feed: Option<AnnotatedFeed>,
    pub entry: Option<AnnotatedEntry>,
}

impl ResponseNode {
    pub fn from_feed(feed: AnnotatedFeed) -> Self {
        ResponseNode {
            feed: Some(feed),
            entry: None,
        }
    }

    pub fn from_entry(entry: AnnotatedEntry) -> Self {
        ResponseNode {
            feed: None,
            entry: Some(entry),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::Value;

    fn entry(name: &str) -> AnnotatedEntry {
        let mut data = Properties::new();
        data.insert("Name".to_string(), Value::from(name));
        AnnotatedEntry::new(data)
    }

    #[test]
    fn test_data_with_annotations_is_a_copy() {
        let mut e = entry("Chai");
        assert!(matches!(e.data_with_annotations(true), Cow::Borrowed(_)));

        e.set_annotations(EntryAnnotations {
            etag: Some("W/\"1\"".to_string()),
            ..Default::default()
        });
        let with = e.data_with_annotations(true);
        assert!(with.contains_key(ANNOTATIONS_KEY));
        assert!(!e.data().contains_key(ANNOTATIONS_KEY));
        assert!(!e.data_with_annotations(false).contains_key(ANNOTATIONS_KEY));
    }

    #[test]
    fn test_feed_annotations_set_then_merge() {
        let mut feed = AnnotatedFeed::new(vec![entry("Chai"), entry("Chang")]);
        assert!(feed.annotations().is_none());

        feed.set_annotations(FeedAnnotations {
            next_page_link: Some("next".to_string()),
            ..Default::default()
        });
        feed.set_annotations(FeedAnnotations {
            count: Some(2),
            ..Default::default()
        });

        let annotations = feed.annotations().unwrap();
        assert_eq!(annotations.next_page_link.as_deref(), Some("next"));
        assert_eq!(annotations.count, Some(2));
        assert_eq!(feed.len(), 2);
    }
}

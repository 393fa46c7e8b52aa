//! Feed- and entry-level protocol annotations
//!
//! Annotations arrive page by page. Setting them a second time merges the
//! incoming set into the existing one instead of replacing it.

use std::collections::BTreeMap;

use crate::value::{Properties, Value};

/// Side information attached to a feed (count, paging links)
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FeedAnnotations {
    pub id: Option<String>,
    /// Total number of entries on the server (`$count`)
    pub count: Option<i64>,
    pub next_page_link: Option<String>,
    pub delta_link: Option<String>,
    pub instance_annotations: BTreeMap<String, Value>,
}

impl FeedAnnotations {
    /// Merge annotations read from a later page.
    ///
    /// The feed id and count describe the whole result and keep their first
    /// value; links follow the most recent page that carries one.
    pub fn merge(&mut self, incoming: FeedAnnotations) {
        if self.id.is_none() {
            self.id = incoming.id;
        }
        if self.count.is_none() {
            self.count = incoming.count;
        }
        if incoming.next_page_link.is_some() {
            self.next_page_link = incoming.next_page_link;
        }
        if incoming.delta_link.is_some() {
            self.delta_link = incoming.delta_link;
        }
        self.instance_annotations.extend(incoming.instance_annotations);
    }

    /// Property-map form, as injected under `__annotations`
    pub fn to_value(&self) -> Value {
        let mut map = Properties::new();
        insert_text(&mut map, "id", &self.id);
        if let Some(count) = self.count {
            map.insert("count".to_string(), Value::Integer(count));
        }
        insert_text(&mut map, "nextLink", &self.next_page_link);
        insert_text(&mut map, "deltaLink", &self.delta_link);
        insert_instance(&mut map, &self.instance_annotations);
        Value::Object(map)
    }
}

/// Side information attached to a single entry (ETag, links, type)
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EntryAnnotations {
    pub id: Option<String>,
    pub type_name: Option<String>,
    pub etag: Option<String>,
    pub read_link: Option<String>,
    pub edit_link: Option<String>,
    pub media_read_link: Option<String>,
    pub media_edit_link: Option<String>,
    pub media_content_type: Option<String>,
    pub instance_annotations: BTreeMap<String, Value>,
}

impl EntryAnnotations {
    /// Merge a later annotation set: present fields override, absent ones
    /// leave the existing value alone
    pub fn merge(&mut self, incoming: EntryAnnotations) {
        fn take(target: &mut Option<String>, incoming: Option<String>) {
            if incoming.is_some() {
                *target = incoming;
            }
        }

        take(&mut self.id, incoming.id);
        take(&mut self.type_name, incoming.type_name);
        take(&mut self.etag, incoming.etag);
        take(&mut self.read_link, incoming.read_link);
        take(&mut self.edit_link, incoming.edit_link);
        take(&mut self.media_read_link, incoming.media_read_link);
        take(&mut self.media_edit_link, incoming.media_edit_link);
        take(&mut self.media_content_type, incoming.media_content_type);
        self.instance_annotations.extend(incoming.instance_annotations);
    }

    pub fn to_value(&self) -> Value {
        let mut map = Properties::new();
        insert_text(&mut map, "id", &self.id);
        insert_text(&mut map, "type", &self.type_name);
        insert_text(&mut map, "etag", &self.etag);
        insert_text(&mut map, "readLink", &self.read_link);
        insert_text(&mut map, "editLink", &self.edit_link);
        insert_text(&mut map, "mediaReadLink", &self.media_read_link);
        insert_text(&mut map, "mediaEditLink", &self.media_edit_link);
        insert_text(&mut map, "mediaContentType", &self.media_content_type);
        insert_instance(&mut map, &self.instance_annotations);
        Value::Object(map)
    }
}

fn insert_text(map: &mut Properties, key: &str, value: &Option<String>) {
    if let Some(text) = value {
        map.insert(key.to_string(), Value::String(text.clone()));
    }
}

fn insert_instance(map: &mut Properties, annotations: &BTreeMap<String, Value>) {
    if !annotations.is_empty() {
        map.insert("instance".to_string(), Value::Object(annotations.clone()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_feed_merge_keeps_link_and_count() {
        let mut annotations = FeedAnnotations {
            next_page_link: Some("Products?$skiptoken=10".to_string()),
            ..Default::default()
        };
        annotations.merge(FeedAnnotations {
            count: Some(77),
            ..Default::default()
        });

        assert_eq!(annotations.next_page_link.as_deref(), Some("Products?$skiptoken=10"));
        assert_eq!(annotations.count, Some(77));
    }

    #[test]
    fn test_feed_merge_follows_latest_page() {
        let mut annotations = FeedAnnotations {
            count: Some(77),
            next_page_link: Some("page2".to_string()),
            ..Default::default()
        };
        annotations.merge(FeedAnnotations {
            count: Some(12),
            next_page_link: Some("page3".to_string()),
            ..Default::default()
        });

        assert_eq!(annotations.count, Some(77));
        assert_eq!(annotations.next_page_link.as_deref(), Some("page3"));
    }

    #[test]
    fn test_entry_merge() {
        let mut annotations = EntryAnnotations {
            etag: Some("W/\"1\"".to_string()),
            read_link: Some("Products(1)".to_string()),
            ..Default::default()
        };
        let mut instance = BTreeMap::new();
        instance.insert("ns.flag".to_string(), Value::Boolean(true));
        annotations.merge(EntryAnnotations {
            etag: Some("W/\"2\"".to_string()),
            instance_annotations: instance,
            ..Default::default()
        });

        assert_eq!(annotations.etag.as_deref(), Some("W/\"2\""));
        assert_eq!(annotations.read_link.as_deref(), Some("Products(1)"));
        assert_eq!(annotations.instance_annotations.len(), 1);

        let value = annotations.to_value();
        let map = value.as_object().unwrap();
        assert_eq!(map.get("etag"), Some(&Value::from("W/\"2\"")));
        assert!(map.contains_key("instance"));
    }
}

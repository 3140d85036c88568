//! Manifest Meta-Data
//!
//! Android passes static configuration to SDKs via `<meta-data>` elements
//! of the application. Handlers first describe the desired entries as a
//! `MetaDataItemMap`, keyed by meta-data name, and then write that map into
//! the manifest. Writing is an upsert by `android:name`, so repeating it
//! never duplicates entries.

use crate::android::manifest::Element;
use serde;
use tracing::debug;

/// Tag of meta-data elements.
pub const META_DATA: &str = "meta-data";

/// Attribute holding the value of a meta-data element.
pub const ANDROID_VALUE: &str = "android:value";

/// A single meta-data value.
#[derive(Clone, Debug, Default, PartialEq, Eq, serde::Deserialize, serde::Serialize)]
pub struct MetaDataItem {
    pub value: String,
}

/// Meta-data entries keyed by name. Ordered, so rendering is stable.
pub type MetaDataItemMap = std::collections::BTreeMap<String, MetaDataItem>;

/// Add or remove a map entry
///
/// Set `name` to `value` if a value is given, otherwise remove `name` from
/// the map.
pub fn add_or_remove_item(
    mut map: MetaDataItemMap,
    name: &str,
    value: Option<String>,
) -> MetaDataItemMap {
    match value {
        Some(value) => {
            map.insert(name.to_string(), MetaDataItem { value });
        },
        None => {
            map.remove(name);
        },
    }
    map
}

/// Upsert a meta-data element
///
/// Update the value of the first `<meta-data>` named `name`, or insert a new
/// element if there is none.
pub fn add_item_to_application(app: &mut Element, name: &str, value: &str) {
    let item = app.upsert_keyed_child(META_DATA, name);
    if item.attribute(ANDROID_VALUE) != Some(value) {
        debug!(name, value, "set meta-data");
        item.set_attribute(ANDROID_VALUE, value);
    }
}

/// Remove all `<meta-data>` elements named `name`. Returns whether any
/// element was removed.
pub fn remove_item_from_application(app: &mut Element, name: &str) -> bool {
    let removed = app.remove_keyed_children(META_DATA, name) > 0;
    if removed {
        debug!(name, "removed meta-data");
    }
    removed
}

/// Write an item map into an application
///
/// Upsert every entry of `map`. Names listed in `managed` that are not in
/// the map are removed from the application, so disabling a feature drops
/// its entries. Entries not mentioned in either are left untouched.
pub fn apply_item_map(app: &mut Element, map: &MetaDataItemMap, managed: &[&str]) {
    for (name, item) in map.iter() {
        add_item_to_application(app, name, &item.value);
    }

    for name in managed.iter().filter(|v| !map.contains_key(**v)) {
        remove_item_from_application(app, name);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::android::manifest::ANDROID_NAME;

    fn item(value: &str) -> MetaDataItem {
        MetaDataItem { value: value.to_string() }
    }

    // Verify map editing
    //
    // Values are inserted and replaced, while `None` removes the entry and
    // is a no-op for missing entries.
    #[test]
    fn add_or_remove() {
        let map = add_or_remove_item(MetaDataItemMap::new(), "a", Some("1".into()));
        let map = add_or_remove_item(map, "a", Some("2".into()));
        assert_eq!(map["a"], item("2"));

        let map = add_or_remove_item(map, "b", None);
        assert_eq!(map.len(), 1);

        let map = add_or_remove_item(map, "a", None);
        assert!(map.is_empty());
    }

    // Verify applying a map is idempotent
    //
    // Apply the same map twice and verify no duplicates appear, while
    // unmanaged entries survive and managed stale entries are dropped.
    #[test]
    fn apply_idempotent() {
        let mut app = Element::new("application")
            .with_child(
                Element::new(META_DATA)
                    .with_attribute(ANDROID_NAME, "user")
                    .with_attribute(ANDROID_VALUE, "keep"),
            )
            .with_child(
                Element::new(META_DATA)
                    .with_attribute(ANDROID_NAME, "stale")
                    .with_attribute(ANDROID_VALUE, "drop"),
            );

        let mut map = MetaDataItemMap::new();
        map.insert("a".into(), item("1"));

        apply_item_map(&mut app, &map, &["a", "stale"]);
        let once = app.clone();
        apply_item_map(&mut app, &map, &["a", "stale"]);
        assert_eq!(app, once);

        let names: Vec<_> = app.children_by_tag(META_DATA)
            .map(|v| v.attribute(ANDROID_NAME).unwrap())
            .collect();
        assert_eq!(names, ["user", "a"]);
        assert_eq!(
            app.find_keyed_child(META_DATA, "a").unwrap().attribute(ANDROID_VALUE),
            Some("1"),
        );
    }

    // Verify metadata maps deserialize from `{ name: { value } }`
    #[test]
    fn deserialize_map() {
        let map: MetaDataItemMap = serde_json::from_str(
            r#"{ "com.example.A": { "value": "x" } }"#
        ).unwrap();

        assert_eq!(map["com.example.A"], item("x"));
    }
}

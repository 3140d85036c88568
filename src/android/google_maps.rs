//! Google Maps
//!
//! The Maps SDK reads its API key from the `com.google.android.geo.API_KEY`
//! meta-data entry and needs the legacy Apache HTTP library on older
//! devices.

use crate::android::manifest::{self, Document};
use crate::android::metadata::{self, MetaDataItemMap};
use crate::config::AppConfig;
use tracing::debug;

pub const API_KEY_META_DATA: &str = "com.google.android.geo.API_KEY";
pub const LEGACY_HTTP_LIBRARY: &str = "org.apache.http.legacy";

const USES_LIBRARY: &str = "uses-library";
const ANDROID_REQUIRED: &str = "android:required";

pub fn get_api_key(config: &AppConfig) -> Option<&str> {
    config
        .android_native()
        .and_then(|v| v.google_maps.as_ref())
        .and_then(|v| v.api_key.as_deref())
        .filter(|v| !v.is_empty())
}

/// Sync the API key into `map`, removing it if no key is configured.
pub fn sync_meta_data_into(config: &AppConfig, map: MetaDataItemMap) -> MetaDataItemMap {
    metadata::add_or_remove_item(
        map,
        API_KEY_META_DATA,
        get_api_key(config).map(str::to_string),
    )
}

/// Sync the API key into the configured `android.metadata`.
pub fn sync_meta_data(config: &AppConfig) -> MetaDataItemMap {
    sync_meta_data_into(config, config.metadata())
}

/// Ensure the legacy HTTP library
///
/// Make sure the main application has exactly one `uses-library` entry for
/// `org.apache.http.legacy` marked as not required.
///
/// This runs whether or not an API key is configured.
pub fn apply_to_document(_config: &AppConfig, doc: &mut Document) -> Result<(), manifest::Error> {
    let app = doc.main_application_mut()?;

    let library = app.upsert_keyed_child(USES_LIBRARY, LEGACY_HTTP_LIBRARY);
    if library.attribute(ANDROID_REQUIRED) != Some("false") {
        debug!(library = LEGACY_HTTP_LIBRARY, "set uses-library");
        library.set_attribute(ANDROID_REQUIRED, "false");
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::android::fixtures;
    use crate::android::manifest::ANDROID_NAME;
    use crate::config::{AndroidConfig, AndroidNativeConfig, GoogleMapsConfig};

    fn config(api_key: Option<&str>, metadata: Option<MetaDataItemMap>) -> AppConfig {
        AppConfig {
            android: Some(AndroidConfig {
                metadata,
                config: Some(AndroidNativeConfig {
                    google_maps: Some(GoogleMapsConfig {
                        api_key: api_key.map(str::to_string),
                    }),
                    ..Default::default()
                }),
                ..Default::default()
            }),
            ..Default::default()
        }
    }

    // Verify the key getter
    #[test]
    fn getter() {
        assert_eq!(get_api_key(&AppConfig::default()), None);
        assert_eq!(get_api_key(&config(None, None)), None);
        assert_eq!(get_api_key(&config(Some("key"), None)), Some("key"));
        assert_eq!(get_api_key(&config(Some(""), None)), None);
    }

    // Verify metadata syncing
    //
    // The key is added when configured, and removed from existing metadata
    // when missing. Unrelated entries are kept.
    #[test]
    fn sync() {
        let map = sync_meta_data(&config(Some("key"), None));
        assert_eq!(map[API_KEY_META_DATA].value, "key");

        let existing = metadata::add_or_remove_item(
            map,
            "com.example.Other",
            Some("x".into()),
        );
        let map = sync_meta_data(&config(None, Some(existing)));
        assert_eq!(map.len(), 1);
        assert!(map.contains_key("com.example.Other"));
    }

    // Verify the uses-library entry is added once
    #[test]
    fn uses_library_idempotent() {
        let c = config(Some("key"), None);
        let mut doc = Document::parse_str(fixtures::SAMPLE_MANIFEST).unwrap();

        apply_to_document(&c, &mut doc).unwrap();
        let once = doc.clone();
        apply_to_document(&c, &mut doc).unwrap();
        assert_eq!(doc, once);

        let app = doc.main_application().unwrap();
        let libraries: Vec<_> = app.children_by_tag(USES_LIBRARY).collect();
        assert_eq!(libraries.len(), 1);
        assert_eq!(libraries[0].attribute(ANDROID_NAME), Some(LEGACY_HTTP_LIBRARY));
        assert_eq!(libraries[0].attribute(ANDROID_REQUIRED), Some("false"));
    }

    // Verify an existing entry is updated in place
    #[test]
    fn uses_library_update() {
        let mut doc = Document::parse_str(concat!(
            "<manifest xmlns:android=\"http://schemas.android.com/apk/res/android\">",
            "<application android:name=\".MainApplication\">",
            "<uses-library android:name=\"org.apache.http.legacy\" android:required=\"true\"/>",
            "</application>",
            "</manifest>",
        )).unwrap();

        apply_to_document(&AppConfig::default(), &mut doc).unwrap();

        let app = doc.main_application().unwrap();
        let children: Vec<_> = app.elements().collect();
        assert_eq!(children.len(), 1);
        assert_eq!(children[0].attribute(ANDROID_REQUIRED), Some("false"));
    }

    // The uses-library entry does not depend on the API key. Every other
    // handler is gated on its config field, this one is not. Pin the
    // current behavior so a change is deliberate.
    #[test]
    fn uses_library_without_api_key() {
        let mut doc = Document::parse_str(fixtures::SAMPLE_MANIFEST).unwrap();

        apply_to_document(&AppConfig::default(), &mut doc).unwrap();

        let app = doc.main_application().unwrap();
        assert!(app.find_keyed_child(USES_LIBRARY, LEGACY_HTTP_LIBRARY).is_some());
    }
}

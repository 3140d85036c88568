//! Facebook SDK
//!
//! The Facebook SDK is configured through five meta-data entries, a
//! `facebook_app_id` string resource referenced by one of them, and a
//! `CustomTabActivity` that receives login redirects on the app's custom
//! scheme. Unlike the other integrations, every piece is removed again when
//! its config field goes away.

use crate::android::manifest::{self, Document, Element, ANDROID_NAME};
use crate::android::metadata::{self, MetaDataItemMap};
use crate::config::AppConfig;
use tracing::debug;

pub const APPLICATION_ID_META_DATA: &str = "com.facebook.sdk.ApplicationId";
pub const APPLICATION_NAME_META_DATA: &str = "com.facebook.sdk.ApplicationName";
pub const AUTO_INIT_ENABLED_META_DATA: &str = "com.facebook.sdk.AutoInitEnabled";
pub const AUTO_LOG_APP_EVENTS_META_DATA: &str = "com.facebook.sdk.AutoLogAppEventsEnabled";
pub const ADVERTISER_ID_COLLECTION_META_DATA: &str =
    "com.facebook.sdk.AdvertiserIDCollectionEnabled";

/// All meta-data names owned by this integration.
pub const META_DATA_NAMES: [&str; 5] = [
    APPLICATION_ID_META_DATA,
    APPLICATION_NAME_META_DATA,
    AUTO_INIT_ENABLED_META_DATA,
    AUTO_LOG_APP_EVENTS_META_DATA,
    ADVERTISER_ID_COLLECTION_META_DATA,
];

/// Name of the string resource holding the app id.
pub const APP_ID_STRING: &str = "facebook_app_id";
/// Meta-data value referencing `APP_ID_STRING`.
pub const APP_ID_STRING_REFERENCE: &str = "@string/facebook_app_id";

pub const CUSTOM_TAB_ACTIVITY: &str = "com.facebook.CustomTabActivity";

const ACTIVITY: &str = "activity";

pub fn get_scheme(config: &AppConfig) -> Option<&str> {
    config.facebook_scheme.as_deref().filter(|v| !v.is_empty())
}

pub fn get_app_id(config: &AppConfig) -> Option<&str> {
    config.facebook_app_id.as_deref().filter(|v| !v.is_empty())
}

pub fn get_display_name(config: &AppConfig) -> Option<&str> {
    config.facebook_display_name.as_deref().filter(|v| !v.is_empty())
}

pub fn get_auto_init_enabled(config: &AppConfig) -> Option<bool> {
    config.facebook_auto_init_enabled
}

pub fn get_auto_log_app_events(config: &AppConfig) -> Option<bool> {
    config.facebook_auto_log_app_events_enabled
}

pub fn get_advertiser_id_collection(config: &AppConfig) -> Option<bool> {
    config.facebook_advertiser_id_collection_enabled
}

/// Sync Facebook meta-data into `map`
///
/// Each of the five entries is set if its config field is set, and removed
/// from `map` otherwise.
pub fn sync_meta_data_into(config: &AppConfig, map: MetaDataItemMap) -> MetaDataItemMap {
    let flag = |v: Option<bool>| v.map(|v| v.to_string());

    let entries = [
        (
            APPLICATION_ID_META_DATA,
            get_app_id(config).map(|_| APP_ID_STRING_REFERENCE.to_string()),
        ),
        (
            APPLICATION_NAME_META_DATA,
            get_display_name(config).map(str::to_string),
        ),
        (AUTO_INIT_ENABLED_META_DATA, flag(get_auto_init_enabled(config))),
        (AUTO_LOG_APP_EVENTS_META_DATA, flag(get_auto_log_app_events(config))),
        (ADVERTISER_ID_COLLECTION_META_DATA, flag(get_advertiser_id_collection(config))),
    ];

    entries.into_iter().fold(map, |map, (name, value)| {
        metadata::add_or_remove_item(map, name, value)
    })
}

/// Sync Facebook meta-data into the configured `android.metadata`.
pub fn sync_meta_data(config: &AppConfig) -> MetaDataItemMap {
    sync_meta_data_into(config, config.metadata())
}

// Build the login redirect activity for `scheme`.
fn custom_tab_activity(scheme: &str) -> Element {
    let intent_filter = Element::new("intent-filter")
        .with_child(
            Element::new("action")
                .with_attribute(ANDROID_NAME, "android.intent.action.VIEW"),
        )
        .with_child(
            Element::new("category")
                .with_attribute(ANDROID_NAME, "android.intent.category.DEFAULT"),
        )
        .with_child(
            Element::new("category")
                .with_attribute(ANDROID_NAME, "android.intent.category.BROWSABLE"),
        )
        .with_child(
            Element::new("data")
                .with_attribute("android:scheme", scheme),
        );

    Element::new(ACTIVITY)
        .with_attribute(ANDROID_NAME, CUSTOM_TAB_ACTIVITY)
        .with_attribute("android:exported", "true")
        .with_child(intent_filter)
}

/// Apply Facebook configuration
///
/// Write the synced meta-data into the main application, dropping entries
/// of unset fields. Any existing `CustomTabActivity` is removed, and a fresh
/// one is added if a scheme is configured. Running this repeatedly with the
/// same configuration yields the same document.
pub fn set_facebook_config(config: &AppConfig, doc: &mut Document) -> Result<(), manifest::Error> {
    let map = sync_meta_data_into(config, MetaDataItemMap::new());
    let app = doc.main_application_mut()?;

    metadata::apply_item_map(app, &map, &META_DATA_NAMES);

    let removed = app.remove_keyed_children(ACTIVITY, CUSTOM_TAB_ACTIVITY);
    if let Some(scheme) = get_scheme(config) {
        app.insert_child(custom_tab_activity(scheme));
        if removed == 0 {
            debug!(scheme, "added {}", CUSTOM_TAB_ACTIVITY);
        }
    } else if removed > 0 {
        debug!("removed {}", CUSTOM_TAB_ACTIVITY);
    }

    Ok(())
}

/// Sync the app id string resource
///
/// Upsert `<string name="facebook_app_id">` in a `strings.xml` document if
/// an app id is configured, remove it otherwise. Other resources, including
/// styled strings and comments, are left as they are.
pub fn set_facebook_app_id_string(config: &AppConfig, strings: &mut Document) {
    let resources = &mut strings.root;
    let is_app_id = |v: &Element| v.tag == "string" && v.attribute("name") == Some(APP_ID_STRING);

    match get_app_id(config) {
        Some(app_id) => match resources.find_element_mut(is_app_id) {
            Some(entry) => {
                if entry.text().as_deref() != Some(app_id) {
                    debug!(app_id, "updated {}", APP_ID_STRING);
                    entry.set_text(app_id);
                }
            },
            None => {
                debug!(app_id, "added {}", APP_ID_STRING);
                resources.insert_child(
                    Element::new("string")
                        .with_attribute("name", APP_ID_STRING)
                        .with_text(app_id),
                );
            },
        },
        None => {
            if resources.retain_elements(|v| !is_app_id(v)) > 0 {
                debug!("removed {}", APP_ID_STRING);
            }
        },
    }
}

//! Google Mobile Ads

use crate::android::manifest::{self, Document};
use crate::android::metadata;
use crate::config::AppConfig;

pub const APPLICATION_ID_META_DATA: &str = "com.google.android.gms.ads.APPLICATION_ID";
pub const DELAY_APP_MEASUREMENT_INIT_META_DATA: &str =
    "com.google.android.gms.ads.DELAY_APP_MEASUREMENT_INIT";

pub fn get_app_id(config: &AppConfig) -> Option<&str> {
    config
        .android_native()
        .and_then(|v| v.google_mobile_ads_app_id.as_deref())
        .filter(|v| !v.is_empty())
}

/// Return whether the SDK initializes itself. Defaults to `false`.
pub fn get_auto_init(config: &AppConfig) -> bool {
    config
        .android_native()
        .and_then(|v| v.google_mobile_ads_auto_init)
        .unwrap_or(false)
}

/// Apply Mobile Ads configuration
///
/// Without an app id this does nothing. Otherwise the application id and
/// the measurement delay flag are written to the main application. The
/// delay flag is the inverse of auto-init.
pub fn apply_to_document(config: &AppConfig, doc: &mut Document) -> Result<(), manifest::Error> {
    let Some(app_id) = get_app_id(config) else {
        return Ok(());
    };
    let delay = !get_auto_init(config);

    let app = doc.main_application_mut()?;
    metadata::add_item_to_application(app, APPLICATION_ID_META_DATA, app_id);
    metadata::add_item_to_application(
        app,
        DELAY_APP_MEASUREMENT_INIT_META_DATA,
        if delay { "true" } else { "false" },
    );

    Ok(())
}

//! Native Project Synchronization
//!
//! The `sync` operation applies all handlers to the Android project of an
//! application. It reads each native file, threads it through the handlers
//! that care about it, and writes it back. Files are only written if their
//! content actually changed, so a second run with the same configuration
//! leaves the project untouched, including file timestamps.

use crate::android::{facebook, google_maps, google_mobile_ads, google_services, manifest, metadata};
use crate::config::AppConfig;
use std::borrow::Cow;
use tracing::{debug, info};

/// Manifest location relative to the project directory.
pub const MANIFEST_PATH: &str = "android/app/src/main/AndroidManifest.xml";
/// Root Gradle build file relative to the project directory.
pub const BUILD_GRADLE_PATH: &str = "android/build.gradle";
/// App module Gradle build file relative to the project directory.
pub const APP_BUILD_GRADLE_PATH: &str = "android/app/build.gradle";
/// Default string resources relative to the project directory.
pub const STRINGS_PATH: &str = "android/app/src/main/res/values/strings.xml";

/// Sync Errors
///
/// This is the exhaustive list of possible errors raised by the sync
/// operation. See each error for details.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The XML document at the specified path could not be processed.
    #[error("cannot process {0:?}: {1}")]
    Document(std::path::PathBuf, manifest::Error),
    /// Reading the file at the specified path failed with the given error.
    #[error("cannot read {0:?}: {1}")]
    FileRead(std::path::PathBuf, std::io::Error),
    /// Updating the file at the specified path failed with the given error.
    #[error("cannot update {0:?}: {1}")]
    FileUpdate(std::path::PathBuf, std::io::Error),
    /// Copying `google-services.json` failed.
    #[error(transparent)]
    GoogleServices(#[from] google_services::Error),
}

/// Sync Options
#[derive(Clone, Debug, Default)]
pub struct Options {
    /// Destination of `google-services.json`, overriding
    /// `google_services::DEFAULT_TARGET_PATH`.
    pub services_target: Option<std::path::PathBuf>,
}

/// Sync Report
///
/// Summary of the changes performed by a sync operation.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Report {
    /// Files whose content was rewritten, in the order they were written.
    pub updated: Vec<std::path::PathBuf>,
    /// Whether `google-services.json` was copied.
    pub services_file_copied: bool,
}

// Update a file if required
//
// This writes the given content to the specified file, but only if the file
// content does not already match the new content. This avoids modifying a file
// unless necessary. Thus, the file timestamp is only modified if the content
// really changed. Returns whether the file was written.
fn update_file(
    path: &std::path::Path,
    content: &str,
) -> Result<bool, Error> {
    // Open the file read+write and create it if it does not exist, yet.
    let mut f = std::fs::OpenOptions::new()
        .read(true)
        .write(true)
        .create(true)
        .truncate(false)
        .open(path)
        .map_err(
            |v| Error::FileUpdate(path.to_path_buf(), v),
        )?;

    // Read the entire file content into memory.
    let mut old = String::new();
    <std::fs::File as std::io::Read>::read_to_string(&mut f, &mut old)
        .map_err(
            |v| Error::FileUpdate(path.to_path_buf(), v),
        )?;

    if old == content {
        return Ok(false);
    }

    // Rewind the position, truncate the file and write the new contents.
    <std::fs::File as std::io::Seek>::rewind(&mut f)
        .map_err(
            |v| Error::FileUpdate(path.to_path_buf(), v),
        )?;

    f.set_len(0).map_err(
        |v| Error::FileUpdate(path.to_path_buf(), v),
    )?;

    <std::fs::File as std::io::Write>::write_all(&mut f, content.as_bytes())
        .map_err(
            |v| Error::FileUpdate(path.to_path_buf(), v),
        )?;

    // Sync the file now to ensure errors are caught properly.
    f.sync_all().map_err(
        |v| Error::FileUpdate(path.to_path_buf(), v),
    )?;

    info!(path = ?path, "updated");

    Ok(true)
}

// Read a file if it exists
//
// Like `std::fs::read_to_string()`, but yields `None` for missing files.
fn read_optional(path: &std::path::Path) -> Result<Option<String>, Error> {
    match std::fs::read_to_string(path) {
        Ok(v) => Ok(Some(v)),
        Err(v) if v.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(v) => Err(Error::FileRead(path.to_path_buf(), v)),
    }
}

/// Apply all manifest handlers
///
/// Run every manifest handler on `doc`, in order: user supplied
/// `android.metadata` together with the Maps API key, the Maps library,
/// Mobile Ads and Facebook.
pub fn apply_manifest(config: &AppConfig, doc: &mut manifest::Document) -> Result<(), manifest::Error> {
    let map = google_maps::sync_meta_data(config);
    metadata::apply_item_map(
        doc.main_application_mut()?,
        &map,
        &[google_maps::API_KEY_META_DATA],
    );

    google_maps::apply_to_document(config, doc)?;
    google_mobile_ads::apply_to_document(config, doc)?;
    facebook::set_facebook_config(config, doc)?;

    Ok(())
}

// Sync `AndroidManifest.xml`.
fn sync_manifest(
    config: &AppConfig,
    path: &std::path::Path,
    report: &mut Report,
) -> Result<(), Error> {
    let mut doc = manifest::Document::parse_path(path)
        .map_err(|v| Error::Document(path.to_path_buf(), v))?;

    apply_manifest(config, &mut doc)
        .map_err(|v| Error::Document(path.to_path_buf(), v))?;

    let content = doc.to_xml_string()
        .map_err(|v| Error::Document(path.to_path_buf(), v))?;
    if update_file(path, &content)? {
        report.updated.push(path.to_path_buf());
    }

    Ok(())
}

// Sync `res/values/strings.xml`, if present.
fn sync_strings(
    config: &AppConfig,
    path: &std::path::Path,
    report: &mut Report,
) -> Result<(), Error> {
    let Some(content) = read_optional(path)? else {
        if facebook::get_app_id(config).is_some() {
            debug!(path = ?path, "no string resources, skipping facebook_app_id");
        }
        return Ok(());
    };

    let mut doc = manifest::Document::parse_str(&content)
        .map_err(|v| Error::Document(path.to_path_buf(), v))?;
    let orig = doc.clone();

    facebook::set_facebook_app_id_string(config, &mut doc);

    // Avoid reformatting untouched resource files.
    if doc != orig {
        let content = doc.to_xml_string()
            .map_err(|v| Error::Document(path.to_path_buf(), v))?;
        if update_file(path, &content)? {
            report.updated.push(path.to_path_buf());
        }
    }

    Ok(())
}

// Patch a Gradle file, if present.
fn sync_gradle(
    path: &std::path::Path,
    report: &mut Report,
    patch: impl for<'a> Fn(&'a str) -> Cow<'a, str>,
) -> Result<(), Error> {
    let Some(content) = read_optional(path)? else {
        debug!(path = ?path, "no gradle file, skipping");
        return Ok(());
    };

    if let Cow::Owned(v) = patch(&content) {
        if update_file(path, &v)? {
            report.updated.push(path.to_path_buf());
        }
    }

    Ok(())
}

/// Synchronize a native Android project
///
/// Apply the configuration to the Android project below `project_dir`. The
/// manifest is required. Gradle files and string resources are patched if
/// they exist. Finally, the configured `google-services.json` is copied.
///
/// Handlers run strictly one after another against the same in-memory
/// documents. Each file is written at most once.
pub fn sync(
    config: &AppConfig,
    project_dir: &std::path::Path,
    options: &Options,
) -> Result<Report, Error> {
    let mut report = Report::default();

    sync_manifest(config, &project_dir.join(MANIFEST_PATH), &mut report)?;
    sync_strings(config, &project_dir.join(STRINGS_PATH), &mut report)?;

    sync_gradle(
        &project_dir.join(BUILD_GRADLE_PATH),
        &mut report,
        |v| google_services::set_class_path(config, v),
    )?;
    sync_gradle(
        &project_dir.join(APP_BUILD_GRADLE_PATH),
        &mut report,
        |v| google_services::apply_plugin(config, v),
    )?;

    report.services_file_copied = google_services::copy_services_file(
        config,
        project_dir,
        options.services_target.as_deref(),
    )?;

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::android::fixtures;
    use crate::config::Format;

    // Create a project directory populated with the sample files.
    fn project() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        let files = [
            (MANIFEST_PATH, fixtures::SAMPLE_MANIFEST),
            (STRINGS_PATH, fixtures::STRINGS),
            (BUILD_GRADLE_PATH, fixtures::BUILD_GRADLE),
            (APP_BUILD_GRADLE_PATH, fixtures::APP_BUILD_GRADLE),
            ("google-services.json", "{}"),
        ];

        for (path, content) in files {
            let path = dir.path().join(path);
            std::fs::create_dir_all(path.parent().unwrap()).unwrap();
            std::fs::write(path, content).unwrap();
        }

        dir
    }

    fn full_config() -> AppConfig {
        AppConfig::parse_str(
            r#"{
                "facebookScheme": "fb123",
                "facebookAppId": "123",
                "facebookAutoInitEnabled": true,
                "android": {
                    "googleServicesFile": "./google-services.json",
                    "metadata": { "com.example.Custom": { "value": "custom" } },
                    "config": {
                        "googleMaps": { "apiKey": "maps-key" },
                        "googleMobileAdsAppId": "ads-id"
                    }
                }
            }"#,
            Format::Json,
        ).unwrap()
    }

    // Verify a full sync converges
    //
    // The first run touches every file, a second run with the same
    // configuration must not write anything.
    #[test]
    fn sync_converges() {
        let dir = project();
        let c = full_config();

        let report = sync(&c, dir.path(), &Options::default()).unwrap();
        assert_eq!(report.updated.len(), 4);
        assert!(report.services_file_copied);

        let manifest = std::fs::read_to_string(dir.path().join(MANIFEST_PATH)).unwrap();
        let strings = std::fs::read_to_string(dir.path().join(STRINGS_PATH)).unwrap();

        let report = sync(&c, dir.path(), &Options::default()).unwrap();
        assert!(report.updated.is_empty());

        assert_eq!(std::fs::read_to_string(dir.path().join(MANIFEST_PATH)).unwrap(), manifest);
        assert_eq!(std::fs::read_to_string(dir.path().join(STRINGS_PATH)).unwrap(), strings);
        assert!(dir.path().join("android/app/google-services.json").exists());
    }

    // Verify the synced manifest content
    #[test]
    fn sync_manifest_content() {
        let dir = project();

        sync(&full_config(), dir.path(), &Options::default()).unwrap();

        let doc = manifest::Document::parse_path(&dir.path().join(MANIFEST_PATH)).unwrap();
        let app = doc.main_application().unwrap();
        let value = |name: &str| {
            app.find_keyed_child(metadata::META_DATA, name)
                .and_then(|v| v.attribute(metadata::ANDROID_VALUE))
                .map(str::to_string)
        };

        assert_eq!(value("com.example.Custom").as_deref(), Some("custom"));
        assert_eq!(value(google_maps::API_KEY_META_DATA).as_deref(), Some("maps-key"));
        assert_eq!(value(google_mobile_ads::APPLICATION_ID_META_DATA).as_deref(), Some("ads-id"));
        assert_eq!(value(facebook::AUTO_INIT_ENABLED_META_DATA).as_deref(), Some("true"));
        assert_eq!(value(facebook::APPLICATION_NAME_META_DATA), None);
        assert!(app.find_keyed_child("activity", facebook::CUSTOM_TAB_ACTIVITY).is_some());
    }

    // Verify an empty configuration
    //
    // Gradle files and string resources stay untouched, and no services
    // file is copied. The manifest only gains the legacy HTTP library.
    #[test]
    fn sync_empty() {
        let dir = project();

        let report = sync(&AppConfig::default(), dir.path(), &Options::default()).unwrap();

        assert_eq!(report.updated, [dir.path().join(MANIFEST_PATH)]);
        assert!(!report.services_file_copied);
        assert_eq!(
            std::fs::read_to_string(dir.path().join(BUILD_GRADLE_PATH)).unwrap(),
            fixtures::BUILD_GRADLE,
        );
        assert_eq!(
            std::fs::read_to_string(dir.path().join(STRINGS_PATH)).unwrap(),
            fixtures::STRINGS,
        );
    }

    // Verify missing optional files are skipped
    #[test]
    fn sync_optional_files() {
        let dir = project();
        std::fs::remove_file(dir.path().join(BUILD_GRADLE_PATH)).unwrap();
        std::fs::remove_file(dir.path().join(STRINGS_PATH)).unwrap();

        let report = sync(&full_config(), dir.path(), &Options::default()).unwrap();

        assert!(!dir.path().join(BUILD_GRADLE_PATH).exists());
        assert_eq!(report.updated.len(), 2);
    }

    // Verify styled strings and comments in string resources survive
    #[test]
    fn sync_styled_strings() {
        let dir = project();
        let strings = concat!(
            "<?xml version=\"1.0\" encoding=\"utf-8\"?>\n",
            "<!-- Generated -->\n",
            "<resources>\n",
            "    <string name=\"greet\">Hello <b>world</b> again</string>\n",
            "    <string name=\"facebook_app_id\">old</string>\n",
            "</resources>\n",
        );
        std::fs::write(dir.path().join(STRINGS_PATH), strings).unwrap();

        sync(&full_config(), dir.path(), &Options::default()).unwrap();

        assert_eq!(
            std::fs::read_to_string(dir.path().join(STRINGS_PATH)).unwrap(),
            strings.replace(">old<", ">123<"),
        );
    }

    // Verify empty config values count as unset
    //
    // An empty services file or ads app id must neither copy anything nor
    // patch Gradle files nor add meta-data.
    #[test]
    fn sync_empty_values() {
        let dir = project();
        let c = AppConfig::parse_str(
            r#"{
                "facebookAppId": "",
                "android": {
                    "googleServicesFile": "",
                    "config": { "googleMobileAdsAppId": "" }
                }
            }"#,
            Format::Json,
        ).unwrap();

        let report = sync(&c, dir.path(), &Options::default()).unwrap();

        assert_eq!(report.updated, [dir.path().join(MANIFEST_PATH)]);
        assert!(!report.services_file_copied);
        let doc = manifest::Document::parse_path(&dir.path().join(MANIFEST_PATH)).unwrap();
        assert_eq!(doc.main_application().unwrap().children_by_tag("meta-data").count(), 0);
    }

    // Verify a missing manifest is an error
    #[test]
    fn sync_no_manifest() {
        let dir = tempfile::tempdir().unwrap();

        assert!(matches!(
            sync(&AppConfig::default(), dir.path(), &Options::default()),
            Err(Error::Document(_, manifest::Error::Read(..))),
        ));
    }

    // Verify the services target override and copy failures
    #[test]
    fn sync_services_target() {
        let dir = project();
        let options = Options {
            services_target: Some("android/app/src/google-services.json".into()),
        };

        let report = sync(&full_config(), dir.path(), &options).unwrap();
        assert!(report.services_file_copied);
        assert!(dir.path().join("android/app/src/google-services.json").exists());

        std::fs::remove_file(dir.path().join("google-services.json")).unwrap();
        assert!(matches!(
            sync(&full_config(), dir.path(), &options),
            Err(Error::GoogleServices(_)),
        ));
    }
}

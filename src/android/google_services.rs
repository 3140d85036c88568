//! Google Services
//!
//! Firebase and friends are configured through `google-services.json`,
//! which has to be copied into the app module, and the Google Services
//! Gradle plugin, which has to be put on the build classpath and applied to
//! the app module.
//!
//! Gradle files are patched as plain text. There is no attempt at parsing
//! Gradle. Each edit is skipped if its result is already present, and
//! otherwise anchored on a literal pattern.

use crate::config::AppConfig;
use once_cell::sync::Lazy;
use regex::Regex;
use std::borrow::Cow;
use tracing::debug;

/// Default destination of `google-services.json`, relative to the project.
pub const DEFAULT_TARGET_PATH: &str = "./android/app/google-services.json";

pub const CLASS_PATH: &str = "com.google.gms:google-services";
pub const PLUGIN: &str = "com.google.gms.google-services";
pub const VERSION: &str = "4.3.3";

static DEPENDENCIES_BLOCK: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"dependencies\s?\{").expect("valid dependencies pattern")
});

static APPLY_PLUGIN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(
        r#"apply\s+plugin:\s+['"]{}['"]"#,
        regex::escape(PLUGIN),
    )).expect("valid apply-plugin pattern")
});

/// Google Services Errors
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Copying `google-services.json` from the first to the second path
    /// failed.
    #[error(
        "cannot copy google-services.json from {0:?} to {1:?}, make sure the source and destination paths exist: {2}"
    )]
    Copy(std::path::PathBuf, std::path::PathBuf, std::io::Error),
}

pub fn get_services_file_path(config: &AppConfig) -> Option<&str> {
    config
        .android
        .as_ref()
        .and_then(|v| v.google_services_file.as_deref())
        .filter(|v| !v.is_empty())
}

/// Copy `google-services.json`
///
/// Copy the configured services file into the project. Both the source and
/// `target_path` are resolved relative to `project_dir`, unless absolute.
/// `None` selects `DEFAULT_TARGET_PATH`.
///
/// Returns `false` if no services file is configured, `true` if the file
/// was copied.
pub fn copy_services_file(
    config: &AppConfig,
    project_dir: &std::path::Path,
    target_path: Option<&std::path::Path>,
) -> Result<bool, Error> {
    let Some(source) = get_services_file_path(config) else {
        return Ok(false);
    };

    let source = project_dir.join(source);
    let destination = project_dir.join(
        target_path.unwrap_or(std::path::Path::new(DEFAULT_TARGET_PATH)),
    );

    std::fs::copy(&source, &destination)
        .map_err(|v| Error::Copy(source.clone(), destination.clone(), v))?;

    debug!(source = ?source, destination = ?destination, "copied google-services.json");

    Ok(true)
}

/// Add the classpath declaration
///
/// Insert `classpath '<CLASS_PATH>:<VERSION>'` right after the first
/// `dependencies {` of the root `build.gradle`. The text is returned as is
/// if no services file is configured or the classpath is mentioned
/// anywhere already.
pub fn set_class_path<'a>(config: &AppConfig, build_gradle: &'a str) -> Cow<'a, str> {
    if get_services_file_path(config).is_none() || build_gradle.contains(CLASS_PATH) {
        return Cow::Borrowed(build_gradle);
    }

    let replacement = format!(
        "dependencies {{\n        classpath '{}:{}'",
        CLASS_PATH,
        VERSION,
    );
    let patched = DEPENDENCIES_BLOCK.replace(build_gradle, regex::NoExpand(&replacement));
    if let Cow::Owned(_) = patched {
        debug!(class_path = CLASS_PATH, "added classpath");
    }

    patched
}

/// Apply the plugin
///
/// Append `apply plugin: '<PLUGIN>'` to the app `build.gradle`. The text is
/// returned as is if no services file is configured or the plugin is
/// applied already, with either quote style.
pub fn apply_plugin<'a>(config: &AppConfig, app_build_gradle: &'a str) -> Cow<'a, str> {
    if get_services_file_path(config).is_none() || APPLY_PLUGIN.is_match(app_build_gradle) {
        return Cow::Borrowed(app_build_gradle);
    }

    debug!(plugin = PLUGIN, "applied plugin");

    Cow::Owned(format!("{}\napply plugin: '{}'", app_build_gradle, PLUGIN))
}

//! Android Configuration Synchronization
//!
//! This crate keeps the native Android project of a mobile application in
//! line with its declarative configuration. Applications describe which
//! native integrations they use (Google Maps, Google Mobile Ads, Google
//! Services, Facebook) in a configuration object, and this crate edits
//! `AndroidManifest.xml`, the Gradle build files and the string resources
//! accordingly.
//!
//! Model
//! -----
//!
//! Every integration is a handler that reads a few optional fields of the
//! configuration and inserts, updates or removes the corresponding pieces
//! of a native file. Handlers are independent of each other. They all read
//! the same immutable configuration snapshot and are applied one after the
//! other to the same in-memory document.
//!
//! All handlers converge: applying a handler twice with the same
//! configuration yields the same document as applying it once. Keyed
//! manifest entries (`meta-data`, `uses-library`) are looked up by their
//! `android:name` and updated in place, rather than appended blindly.
//!
//! Gradle files are patched as plain text with anchored patterns. Each
//! patch is skipped if its result is already present.
//!
//! Layout
//! ------
//!
//! The handlers expect the usual layout of a generated native project:
//!
//! ```text
//! <app>/
//! ├── app.json
//! ├── google-services.json
//! └── android/
//!     ├── build.gradle
//!     └── app/
//!         ├── build.gradle
//!         ├── google-services.json
//!         └── src/
//!             └── main/
//!                 ├── AndroidManifest.xml
//!                 └── res/
//!                     └── values/
//!                         └── strings.xml
//! ```
//!
//! The `android-confsync` command-line tool loads the configuration and runs
//! the [sync](op::sync) operation on such a project.

pub mod config;

/// Native Android Integrations
///
/// The `android` module contains the XML document model and one submodule
/// per supported integration. Each integration module exposes getters for
/// its configuration fields and functions that apply them to a document.
pub mod android {
    pub mod facebook;
    pub mod google_maps;
    pub mod google_mobile_ads;
    pub mod google_services;
    pub mod manifest;
    pub mod metadata;

    #[cfg(test)]
    pub(crate) mod fixtures;
}

/// Operations
///
/// The `op` module is a collection of all operations that can be performed via
/// the command-line interface. Each operation is implemented in a submodule
/// and can be used independently.
pub mod op {
    pub mod sync;
}

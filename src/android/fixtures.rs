// Sample documents shared by the handler tests.

/// Manifest of a freshly generated react-native application.
pub const SAMPLE_MANIFEST: &str = r#"<manifest xmlns:android="http://schemas.android.com/apk/res/android"
  package="com.expo.mycoolapp">

    <uses-permission android:name="android.permission.INTERNET" />

    <application
      android:name=".MainApplication"
      android:label="@string/app_name"
      android:icon="@mipmap/ic_launcher"
      android:roundIcon="@mipmap/ic_launcher_round"
      android:allowBackup="false"
      android:theme="@style/AppTheme">
      <activity
        android:name=".MainActivity"
        android:label="@string/app_name"
        android:configChanges="keyboard|keyboardHidden|orientation|screenSize"
        android:launchMode="singleTask"
        android:windowSoftInputMode="adjustResize">
        <intent-filter>
            <action android:name="android.intent.action.MAIN" />
            <category android:name="android.intent.category.LAUNCHER" />
        </intent-filter>
      </activity>
      <activity android:name="com.facebook.react.devsupport.DevSettingsActivity" />
    </application>

</manifest>
"#;

/// Manifest with every Facebook integration already in place.
pub const FACEBOOK_MANIFEST: &str = r#"<manifest xmlns:android="http://schemas.android.com/apk/res/android" package="com.expo.mycoolapp">

    <uses-permission android:name="android.permission.INTERNET" />

    <application
      android:name=".MainApplication"
      android:label="@string/app_name"
      android:icon="@mipmap/ic_launcher"
      android:roundIcon="@mipmap/ic_launcher_round"
      android:allowBackup="true"
      android:theme="@style/AppTheme">

      <meta-data android:name="com.facebook.sdk.ApplicationId" android:value="@string/facebook_app_id"/>
      <meta-data android:name="com.facebook.sdk.ApplicationName" android:value="my-display-name"/>
      <meta-data android:name="com.facebook.sdk.AutoInitEnabled" android:value="true"/>
      <meta-data android:name="com.facebook.sdk.AutoLogAppEventsEnabled" android:value="false"/>
      <meta-data android:name="com.facebook.sdk.AdvertiserIDCollectionEnabled" android:value="false"/>

      <activity
        android:name=".MainActivity"
        android:launchMode="singleTask"
        android:label="@string/app_name"
        android:configChanges="keyboard|keyboardHidden|orientation|screenSize"
        android:windowSoftInputMode="adjustResize">
        <intent-filter>
            <action android:name="android.intent.action.MAIN" />
            <category android:name="android.intent.category.LAUNCHER" />
        </intent-filter>
      </activity>
      <activity android:name="com.facebook.react.devsupport.DevSettingsActivity" />

      <activity android:name="com.facebook.CustomTabActivity" android:exported="true">
        <intent-filter>
          <action android:name="android.intent.action.VIEW"/>
          <category android:name="android.intent.category.DEFAULT"/>
          <category android:name="android.intent.category.BROWSABLE"/>
          <data android:scheme="myscheme"/>
        </intent-filter>
      </activity>
    </application>

</manifest>
"#;

/// Root `build.gradle` of a react-native application.
pub const BUILD_GRADLE: &str = r#"buildscript {
    ext {
        buildToolsVersion = "28.0.3"
        minSdkVersion = 21
    }
    repositories {
        google()
        jcenter()
    }
    dependencies {
        classpath("com.android.tools.build:gradle:3.5.3")
    }
}

allprojects {
    repositories {
        mavenLocal()
        google()
    }
}
"#;

/// `app/build.gradle` of a react-native application.
pub const APP_BUILD_GRADLE: &str = r#"apply plugin: "com.android.application"

android {
    compileSdkVersion rootProject.ext.compileSdkVersion
}

dependencies {
    implementation fileTree(dir: "libs", include: ["*.jar"])
}
"#;

/// Default `res/values/strings.xml`.
pub const STRINGS: &str = r#"<resources>
    <string name="app_name">My Cool App</string>
</resources>
"#;

//! Fixed XML templates for generated drawables and descriptors.

/// Layer-list drawable behind the splash screen. The color resource is
/// wired in by the injection plan; the bitmap layer points at the
/// generated splash image when one exists.
pub fn splash_background() -> String {
    concat!(
        "<?xml version=\"1.0\" encoding=\"utf-8\"?>\n",
        "<layer-list xmlns:android=\"http://schemas.android.com/apk/res/android\">\n",
        "    <item android:drawable=\"@color/partner_primary\"/>\n",
        "    <item>\n",
        "        <bitmap\n",
        "            android:gravity=\"center\"\n",
        "            android:src=\"@drawable/splash_image\"/>\n",
        "    </item>\n",
        "</layer-list>",
    )
    .to_string()
}

/// Adaptive icon descriptor. Round and non-round variants reference
/// the same two generated layers.
pub fn adaptive_icon() -> String {
    concat!(
        "<?xml version=\"1.0\" encoding=\"utf-8\"?>\n",
        "<adaptive-icon xmlns:android=\"http://schemas.android.com/apk/res/android\">\n",
        "    <background android:drawable=\"@mipmap/ic_launcher_background\"/>\n",
        "    <foreground android:drawable=\"@mipmap/ic_launcher_foreground\"/>\n",
        "</adaptive-icon>",
    )
    .to_string()
}

/// Splash theme style injected into `styles.xml`.
pub fn splash_theme_style() -> String {
    concat!(
        "    <style name=\"SplashTheme\" parent=\"Theme.AppCompat.Light.NoActionBar\">\n",
        "        <item name=\"android:windowBackground\">@drawable/splash_background</item>\n",
        "    </style>",
    )
    .to_string()
}

/// Partner color resources injected into `colors.xml`.
pub fn partner_colors(primary: &str, primary_dark: &str) -> String {
    format!(
        concat!(
            "    <color name=\"partner_primary\">{primary}</color>\n",
            "    <color name=\"partner_primary_dark\">{dark}</color>",
        ),
        primary = primary,
        dark = primary_dark,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_splash_background_references_resources() {
        let xml = splash_background();
        assert!(xml.starts_with("<?xml"));
        assert!(xml.contains("@color/partner_primary"));
        assert!(xml.contains("@drawable/splash_image"));
    }

    #[test]
    fn test_adaptive_icon_references_both_layers() {
        let xml = adaptive_icon();
        assert!(xml.contains("@mipmap/ic_launcher_background"));
        assert!(xml.contains("@mipmap/ic_launcher_foreground"));
    }

    #[test]
    fn test_partner_colors_substitution() {
        let xml = partner_colors("#2196F3", "#1976D2");
        assert!(xml.contains(">#2196F3</color>"));
        assert!(xml.contains(">#1976D2</color>"));
        assert!(xml.contains("partner_primary_dark"));
    }
}

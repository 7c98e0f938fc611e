//! Platform detection and settings guidance
//!
//! When the location permission is denied, recovery lives in a different
//! place on every platform. This module maps a coarse user-agent signature
//! to step-by-step settings instructions. Detection is deliberately crude
//! (case-insensitive substring checks) and the whole table lives here so it
//! can be swapped wholesale.

/// Coarse operating system family
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Os {
    Android,
    Ios,
    Other,
}

impl Os {
    fn detect(user_agent_lower: &str) -> Self {
        if user_agent_lower.contains("android") {
            Os::Android
        } else if ["iphone", "ipad", "ipod"]
            .iter()
            .any(|token| user_agent_lower.contains(token))
        {
            Os::Ios
        } else {
            Os::Other
        }
    }
}

/// Coarse browser family
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Browser {
    Chrome,
    Safari,
    Other,
}

impl Browser {
    fn detect(user_agent_lower: &str) -> Self {
        // Chrome UAs also carry a "Safari" token, so Chrome wins ties.
        // "crios" is Chrome on iOS.
        if user_agent_lower.contains("chrome") || user_agent_lower.contains("crios") {
            Browser::Chrome
        } else if user_agent_lower.contains("safari") {
            Browser::Safari
        } else {
            Browser::Other
        }
    }
}

/// Platform signature derived from a user-agent string
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlatformSignature {
    pub os: Os,
    pub browser: Browser,
}

impl PlatformSignature {
    pub fn detect(user_agent: &str) -> Self {
        let lower = user_agent.to_lowercase();
        Self {
            os: Os::detect(&lower),
            browser: Browser::detect(&lower),
        }
    }

    /// Settings instructions for this platform, falling back to the desktop
    /// entry for signatures the table does not know.
    pub fn guidance(&self) -> &'static SettingsGuidance {
        match (self.os, self.browser) {
            (Os::Android, _) => &ANDROID_CHROME,
            (Os::Ios, Browser::Chrome) => &IOS_CHROME,
            (Os::Ios, _) => &IOS_SAFARI,
            _ => &DESKTOP,
        }
    }
}

/// Step-by-step settings-navigation instructions for one platform
#[derive(Debug)]
pub struct SettingsGuidance {
    /// Ordered steps through the platform's settings UI
    pub steps: &'static [&'static str],
    /// One-line hint shown under the steps
    pub hint: &'static str,
}

static ANDROID_CHROME: SettingsGuidance = SettingsGuidance {
    steps: &[
        "Tap the three dots in the top right corner of Chrome",
        "Open Settings, then Site settings",
        "Tap Location and set it to Allowed",
        "Find this site in the list and allow Location",
        "Return here and tap Retry",
    ],
    hint: "If the prompt never appears, also check Android Settings > Location",
};

static IOS_SAFARI: SettingsGuidance = SettingsGuidance {
    steps: &[
        "Open the iPhone Settings app",
        "Go to Privacy & Security, then Location Services",
        "Scroll to Safari Websites",
        "Choose While Using the App",
        "Return here and tap Retry",
    ],
    hint: "Location Services must be enabled at the top of the same screen",
};

static IOS_CHROME: SettingsGuidance = SettingsGuidance {
    steps: &[
        "Open the iPhone Settings app",
        "Scroll down and tap Chrome",
        "Tap Location",
        "Choose While Using the App",
        "Return here and tap Retry",
    ],
    hint: "Location Services must be enabled under Privacy & Security",
};

static DESKTOP: SettingsGuidance = SettingsGuidance {
    steps: &[
        "Click the lock icon next to the address bar",
        "Open Site settings",
        "Set Location to Allow",
        "Reload this page",
    ],
    hint: "Some browsers only ask once; reloading repeats the prompt",
};

#[cfg(test)]
mod tests {
    use super::*;

    const ANDROID_UA: &str = "Mozilla/5.0 (Linux; Android 14; Pixel 8) AppleWebKit/537.36 \
         (KHTML, like Gecko) Chrome/126.0.0.0 Mobile Safari/537.36";
    const IPHONE_SAFARI_UA: &str = "Mozilla/5.0 (iPhone; CPU iPhone OS 17_5 like Mac OS X) \
         AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.5 Mobile/15E148 Safari/604.1";
    const IPAD_CHROME_UA: &str = "Mozilla/5.0 (iPad; CPU OS 17_5 like Mac OS X) \
         AppleWebKit/605.1.15 (KHTML, like Gecko) CriOS/126.0.0.0 Mobile/15E148 Safari/604.1";
    const DESKTOP_FIREFOX_UA: &str =
        "Mozilla/5.0 (X11; Linux x86_64; rv:127.0) Gecko/20100101 Firefox/127.0";

    #[test]
    fn test_detect_android_chrome() {
        let sig = PlatformSignature::detect(ANDROID_UA);
        assert_eq!(sig.os, Os::Android);
        assert_eq!(sig.browser, Browser::Chrome);
    }

    #[test]
    fn test_detect_iphone_safari() {
        let sig = PlatformSignature::detect(IPHONE_SAFARI_UA);
        assert_eq!(sig.os, Os::Ios);
        assert_eq!(sig.browser, Browser::Safari);
    }

    #[test]
    fn test_detect_ipad_chrome_via_crios() {
        let sig = PlatformSignature::detect(IPAD_CHROME_UA);
        assert_eq!(sig.os, Os::Ios);
        assert_eq!(sig.browser, Browser::Chrome);
    }

    #[test]
    fn test_detect_unknown_falls_through() {
        let sig = PlatformSignature::detect(DESKTOP_FIREFOX_UA);
        assert_eq!(sig.os, Os::Other);
        assert_eq!(sig.browser, Browser::Other);
    }

    #[test]
    fn test_detection_is_case_insensitive() {
        let sig = PlatformSignature::detect("MOZILLA/5.0 (LINUX; ANDROID 14) CHROME/126");
        assert_eq!(sig.os, Os::Android);
        assert_eq!(sig.browser, Browser::Chrome);
    }

    #[test]
    fn test_chrome_wins_over_embedded_safari_token() {
        // Chrome UAs end in "Safari/537.36"
        let sig = PlatformSignature::detect(ANDROID_UA);
        assert_eq!(sig.browser, Browser::Chrome);
    }

    #[test]
    fn test_known_platforms_get_distinct_guidance() {
        let android = PlatformSignature::detect(ANDROID_UA).guidance();
        let ios_safari = PlatformSignature::detect(IPHONE_SAFARI_UA).guidance();
        let ios_chrome = PlatformSignature::detect(IPAD_CHROME_UA).guidance();

        assert_ne!(android.steps, ios_safari.steps);
        assert_ne!(android.steps, ios_chrome.steps);
        assert_ne!(ios_safari.steps, ios_chrome.steps);
    }

    #[test]
    fn test_unknown_platform_gets_desktop_guidance() {
        let guidance = PlatformSignature::detect(DESKTOP_FIREFOX_UA).guidance();
        assert!(guidance.steps.iter().any(|s| s.contains("lock icon")));
    }

    #[test]
    fn test_guidance_always_has_steps_and_hint() {
        for ua in [ANDROID_UA, IPHONE_SAFARI_UA, IPAD_CHROME_UA, DESKTOP_FIREFOX_UA] {
            let guidance = PlatformSignature::detect(ua).guidance();
            assert!(!guidance.steps.is_empty());
            assert!(!guidance.hint.is_empty());
        }
    }
}

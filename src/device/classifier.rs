//! User-agent classification.
//!
//! Plain token matching on the lower-cased header. Each table is checked in
//! order and the first hit wins, so more specific tokens must come first:
//! Chrome user agents also carry "safari", and Android ones carry "linux".

use crate::device::types::{Browser, DeviceInfo, DeviceType, OperatingSystem};

const HANDHELD_TOKENS: &[&str] = &["mobile", "android", "iphone", "ipad", "ipod"];
const TABLET_TOKENS: &[&str] = &["tablet", "ipad"];

const BROWSER_RULES: &[(&[&str], Browser)] = &[
    (&["chrome"], Browser::Chrome),
    (&["firefox"], Browser::Firefox),
    (&["safari"], Browser::Safari),
    (&["edge"], Browser::Edge),
    (&["opera", "opr"], Browser::Opera),
];

const OS_RULES: &[(&[&str], OperatingSystem)] = &[
    (&["windows"], OperatingSystem::Windows),
    (&["mac os"], OperatingSystem::MacOs),
    (&["linux"], OperatingSystem::Linux),
    (&["android"], OperatingSystem::Android),
    (&["ios", "iphone", "ipad"], OperatingSystem::Ios),
];

/// Classify a raw `User-Agent` header value.
pub fn classify(user_agent: &str) -> DeviceInfo {
    let ua = user_agent.to_lowercase();

    DeviceInfo {
        device_type: device_type(&ua),
        browser: first_match(&ua, BROWSER_RULES).unwrap_or(Browser::Unknown),
        operating_system: first_match(&ua, OS_RULES).unwrap_or(OperatingSystem::Unknown),
        user_agent: user_agent.to_string(),
    }
}

fn device_type(ua: &str) -> DeviceType {
    if !contains_any(ua, HANDHELD_TOKENS) {
        DeviceType::Desktop
    } else if contains_any(ua, TABLET_TOKENS) {
        DeviceType::Tablet
    } else {
        DeviceType::Mobile
    }
}

fn first_match<T: Copy>(ua: &str, rules: &[(&[&str], T)]) -> Option<T> {
    rules
        .iter()
        .find(|(tokens, _)| contains_any(ua, tokens))
        .map(|(_, label)| *label)
}

fn contains_any(haystack: &str, tokens: &[&str]) -> bool {
    tokens.iter().any(|t| haystack.contains(t))
}

#[cfg(test)]
mod tests {
    use super::*;

    const CHROME_WINDOWS: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
        (KHTML, like Gecko) Chrome/100.0.4896.75 Safari/537.36";
    const SAFARI_IPAD: &str = "Mozilla/5.0 (iPad; CPU OS 16_0 like Mac OS X) AppleWebKit/605.1.15 \
        (KHTML, like Gecko) Version/16.0 Mobile/15E148 Safari/604.1";
    const SAFARI_IPHONE: &str = "Mozilla/5.0 (iPhone; CPU iPhone OS 17_1 like Mac OS X) \
        AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.1 Mobile/15E148 Safari/604.1";
    const FIREFOX_LINUX: &str =
        "Mozilla/5.0 (X11; Ubuntu; Linux x86_64; rv:120.0) Gecko/20100101 Firefox/120.0";
    const CHROME_ANDROID: &str = "Mozilla/5.0 (Linux; Android 14; Pixel 8) AppleWebKit/537.36 \
        (KHTML, like Gecko) Chrome/119.0.0.0 Mobile Safari/537.36";

    #[test]
    fn test_chrome_on_windows_desktop() {
        let info = classify(CHROME_WINDOWS);
        assert_eq!(info.device_type, DeviceType::Desktop);
        assert_eq!(info.browser, Browser::Chrome);
        assert_eq!(info.operating_system, OperatingSystem::Windows);
        assert_eq!(info.user_agent, CHROME_WINDOWS);
    }

    #[test]
    fn test_chrome_wins_over_safari_token() {
        for ua in [CHROME_WINDOWS, CHROME_ANDROID, "chrome safari", "SAFARI CHROME"] {
            assert_eq!(classify(ua).browser, Browser::Chrome, "ua: {}", ua);
        }
    }

    #[test]
    fn test_ipad_is_tablet() {
        let info = classify(SAFARI_IPAD);
        assert_eq!(info.device_type, DeviceType::Tablet);
        assert_eq!(info.browser, Browser::Safari);
        // "like Mac OS X" is checked before the iOS tokens.
        assert_eq!(info.operating_system, OperatingSystem::MacOs);
    }

    #[test]
    fn test_iphone_is_mobile() {
        let info = classify(SAFARI_IPHONE);
        assert_eq!(info.device_type, DeviceType::Mobile);
        assert_eq!(info.browser, Browser::Safari);
    }

    #[test]
    fn test_android_reports_linux() {
        let info = classify(CHROME_ANDROID);
        assert_eq!(info.device_type, DeviceType::Mobile);
        assert_eq!(info.operating_system, OperatingSystem::Linux);
    }

    #[test]
    fn test_android_tablet() {
        let info = classify("Dalvik/2.1.0 (Android 13; Tablet)");
        assert_eq!(info.device_type, DeviceType::Tablet);
        assert_eq!(info.operating_system, OperatingSystem::Android);
    }

    #[test]
    fn test_firefox_on_linux() {
        let info = classify(FIREFOX_LINUX);
        assert_eq!(info.device_type, DeviceType::Desktop);
        assert_eq!(info.browser, Browser::Firefox);
        assert_eq!(info.operating_system, OperatingSystem::Linux);
    }

    #[test]
    fn test_opera_via_opr_token() {
        assert_eq!(classify("Something OPR/90.0").browser, Browser::Opera);
        assert_eq!(classify("Opera/9.80").browser, Browser::Opera);
    }

    #[test]
    fn test_empty_user_agent() {
        let info = classify("");
        assert_eq!(info.device_type, DeviceType::Desktop);
        assert_eq!(info.browser, Browser::Unknown);
        assert_eq!(info.operating_system, OperatingSystem::Unknown);
    }

    #[test]
    fn test_classification_is_idempotent() {
        for ua in [CHROME_WINDOWS, SAFARI_IPAD, FIREFOX_LINUX, "", "curl/8.4.0"] {
            assert_eq!(classify(ua), classify(ua));
        }
    }
}

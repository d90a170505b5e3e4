//! Device and preset lookup in the host catalog
//!
//! Both lookups walk the top-level categories in priority order
//! (instruments, drums, audio effects) and only look at each category's
//! direct children. Devices match by exact name, presets by substring.

use apc_core::{Browser, BrowserCategory, BrowserItem};

/// Catalog uri fragments that mark an instrument (matched lower-cased)
pub const INSTRUMENT_URI_KEYWORDS: [&str; 3] =
    ["query:synths", "query:drums", "query:instruments"];

/// Whether a catalog item is an instrument-class device
pub fn is_instrument(item: &BrowserItem) -> bool {
    let uri = item.uri.to_lowercase();
    INSTRUMENT_URI_KEYWORDS
        .iter()
        .any(|keyword| uri.contains(keyword))
}

/// Instrument/effect classification of a resolved device
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceKind {
    /// Gets a fresh MIDI track
    Instrument,
    /// Goes onto the selected track
    Effect,
}

impl DeviceKind {
    pub fn classify(item: &BrowserItem) -> Self {
        if is_instrument(item) {
            Self::Instrument
        } else {
            Self::Effect
        }
    }
}

/// A device found in the catalog, classified once at lookup time
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedDevice {
    pub item: BrowserItem,
    pub kind: DeviceKind,
    /// Category the device was found in
    pub category: BrowserCategory,
}

/// Lookup failures, reported but never fatal
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LookupError {
    #[error("Device '{0}' not found in browser")]
    DeviceNotFound(String),

    #[error("Preset '{preset}' not found for device '{device}'")]
    PresetNotFound { preset: String, device: String },
}

/// First direct child of a category named exactly `name`
pub fn find_in_category<'a>(items: &'a [BrowserItem], name: &str) -> Option<&'a BrowserItem> {
    items.iter().find(|item| item.name == name)
}

fn find_device_with_category<'a, B: Browser>(
    browser: &'a B,
    device_name: &str,
) -> Option<(BrowserCategory, &'a BrowserItem)> {
    BrowserCategory::SEARCH_ORDER.into_iter().find_map(|category| {
        find_in_category(browser.category(category), device_name).map(|item| (category, item))
    })
}

/// Find a device by exact name
pub fn find_device<'a, B: Browser>(browser: &'a B, device_name: &str) -> Option<&'a BrowserItem> {
    find_device_with_category(browser, device_name).map(|(_, item)| item)
}

/// Find the first item whose name contains `preset_name` (case-sensitive)
pub fn find_preset<'a, B: Browser>(browser: &'a B, preset_name: &str) -> Option<&'a BrowserItem> {
    BrowserCategory::SEARCH_ORDER.into_iter().find_map(|category| {
        browser
            .category(category)
            .iter()
            .find(|item| item.name.contains(preset_name))
    })
}

/// Find and classify a device
pub fn resolve_device<B: Browser>(
    browser: &B,
    device_name: &str,
) -> Result<ResolvedDevice, LookupError> {
    let (category, item) = find_device_with_category(browser, device_name)
        .ok_or_else(|| LookupError::DeviceNotFound(device_name.to_string()))?;

    let resolved = ResolvedDevice {
        item: item.clone(),
        kind: DeviceKind::classify(item),
        category,
    };
    log::debug!(
        "resolve_device: '{}' found in {} as {:?}",
        device_name,
        category,
        resolved.kind
    );
    Ok(resolved)
}

#[cfg(test)]
mod tests {
    use super::*;
    use apc_core::local::LocalBrowser;

    fn catalog() -> LocalBrowser {
        LocalBrowser::new()
            .with_category(
                BrowserCategory::Instruments,
                vec![
                    BrowserItem::new("Wavetable", "query:Synths#Wavetable").with_children(vec![
                        BrowserItem::new("Deep Pad", "query:Synths#Wavetable:Deep%20Pad"),
                    ]),
                    BrowserItem::new("Operator", "query:Synths#Operator"),
                ],
            )
            .with_category(
                BrowserCategory::Drums,
                vec![BrowserItem::new("Drum Rack", "query:Drums#Drum%20Rack")],
            )
            .with_category(
                BrowserCategory::AudioEffects,
                vec![
                    BrowserItem::new("Reverb", "query:AudioFx#Reverb"),
                    BrowserItem::new("Drum Rack", "query:AudioFx#Drum%20Rack"),
                    BrowserItem::new("Hall Reverb Preset", "query:AudioFx#Reverb:Hall"),
                ],
            )
    }

    #[test]
    fn test_category_priority() {
        let browser = catalog();
        let found = find_device(&browser, "Drum Rack").unwrap();
        assert_eq!(found.uri, "query:Drums#Drum%20Rack");

        let resolved = resolve_device(&browser, "Drum Rack").unwrap();
        assert_eq!(resolved.category, BrowserCategory::Drums);
        assert_eq!(resolved.kind, DeviceKind::Instrument);
    }

    #[test]
    fn test_exact_name_only() {
        let browser = catalog();
        assert!(find_device(&browser, "Wave").is_none());
        assert!(find_device(&browser, "reverb").is_none());
        assert_eq!(
            resolve_device(&browser, "Missing"),
            Err(LookupError::DeviceNotFound("Missing".to_string()))
        );
    }

    #[test]
    fn test_no_recursion_into_children() {
        let browser = catalog();
        assert!(find_device(&browser, "Deep Pad").is_none());
        assert!(find_preset(&browser, "Deep").is_none());
    }

    #[test]
    fn test_find_preset_substring() {
        let browser = catalog();
        // "Reverb" itself matches first in iteration order
        assert_eq!(find_preset(&browser, "Reverb").unwrap().name, "Reverb");
        assert_eq!(
            find_preset(&browser, "Hall").unwrap().name,
            "Hall Reverb Preset"
        );
        // Case-sensitive
        assert!(find_preset(&browser, "hall").is_none());
        // Category order: instruments before effects
        assert_eq!(find_preset(&browser, "ra").unwrap().name, "Operator");
    }

    #[test]
    fn test_is_instrument() {
        assert!(is_instrument(&BrowserItem::new("Bass", "query:Synths#Bass")));
        assert!(is_instrument(&BrowserItem::new("Kit", "QUERY:DRUMS#Kit")));
        assert!(is_instrument(&BrowserItem::new("Sampler", "query:Instruments#Sampler")));
        assert!(!is_instrument(&BrowserItem::new("Reverb", "query:AudioFx#Reverb")));
        assert_eq!(
            DeviceKind::classify(&BrowserItem::new("Reverb", "query:AudioFx#Reverb")),
            DeviceKind::Effect
        );
    }
}

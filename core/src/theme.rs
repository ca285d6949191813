use std::str::FromStr;

use edu_store::KeyValueStore;
use tracing::warn;

use crate::protocol::Theme;

/// Storage key holding the active theme name.
pub const THEME_STORAGE_KEY: &str = "eduplatform-theme";

/// Saved theme, `light` when nothing usable is stored.
pub fn load_theme(store: &dyn KeyValueStore) -> Theme {
    match store.get(THEME_STORAGE_KEY) {
        Ok(Some(value)) => Theme::from_str(value.trim()).unwrap_or_else(|_| {
            warn!("ignoring unknown stored theme {value:?}");
            Theme::default()
        }),
        Ok(None) => Theme::default(),
        Err(e) => {
            warn!("failed to read stored theme: {e}");
            Theme::default()
        }
    }
}

pub fn save_theme(store: &dyn KeyValueStore, theme: Theme) -> std::io::Result<()> {
    store.set(THEME_STORAGE_KEY, &theme.to_string())
}

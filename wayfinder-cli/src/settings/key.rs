//! The keys wayfinder persists.
//!
//! Storage is addressed only through these keys, so every write of a value
//! goes to its one canonical row.

use std::fmt;
use std::marker::PhantomData;

use crate::session::LookupMode;

/// A persisted key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SettingKey {
    MapboxToken,
    LookupMode,
}

impl SettingKey {
    pub const ALL: [SettingKey; 2] = [SettingKey::MapboxToken, SettingKey::LookupMode];

    /// Name of the key in storage.
    pub fn as_str(self) -> &'static str {
        match self {
            SettingKey::MapboxToken => "mapbox_token",
            SettingKey::LookupMode => "lookup_mode",
        }
    }

    /// Spellings written by older builds, folded into this key on open.
    pub fn legacy_names(self) -> &'static [&'static str] {
        match self {
            SettingKey::MapboxToken => &["mapbox-token"],
            SettingKey::LookupMode => &[],
        }
    }
}

impl fmt::Display for SettingKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A key together with the type stored under it.
pub struct Setting<T> {
    key: SettingKey,
    _value: PhantomData<fn() -> T>,
}

impl<T> Setting<T> {
    const fn new(key: SettingKey) -> Self {
        Self {
            key,
            _value: PhantomData,
        }
    }

    pub fn key(&self) -> SettingKey {
        self.key
    }
}

/// Geocoding access token.
pub const MAPBOX_TOKEN: Setting<String> = Setting::new(SettingKey::MapboxToken);
/// Where suggestions come from.
pub const LOOKUP_MODE: Setting<LookupMode> = Setting::new(SettingKey::LookupMode);

//! Whether the directory may be listed at all.

use roster_types::{AppConfig, BackendError};

const APP: &str = "core";
const ALLOW_ENUMERATION: &str = "shareapi_allow_share_dialog_user_enumeration";
const RESTRICT_TO_GROUP: &str = "shareapi_restrict_user_enumeration_to_group";
const RESTRICT_TO_PHONE: &str = "shareapi_restrict_user_enumeration_to_phone";

/// The three sharing flags that control directory enumeration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EnumerationPolicy {
    pub enabled: bool,
    pub restrict_to_group: bool,
    pub restrict_to_phone: bool,
}

impl Default for EnumerationPolicy {
    fn default() -> Self {
        Self {
            enabled: true,
            restrict_to_group: false,
            restrict_to_phone: false,
        }
    }
}

impl EnumerationPolicy {
    /// Reads the current flags. A flag is on only if its value is `yes`.
    pub fn load(config: &dyn AppConfig) -> Result<Self, BackendError> {
        let flag = |key: &str, default: &str| -> Result<bool, BackendError> {
            Ok(config.get_app_value(APP, key, default)? == "yes")
        };

        Ok(Self {
            enabled: flag(ALLOW_ENUMERATION, "yes")?,
            restrict_to_group: flag(RESTRICT_TO_GROUP, "no")?,
            restrict_to_phone: flag(RESTRICT_TO_PHONE, "no")?,
        })
    }

    /// Listing is allowed only when enumeration is on and unrestricted.
    pub fn allows_listing(&self) -> bool {
        self.enabled && !self.restrict_to_group && !self.restrict_to_phone
    }
}

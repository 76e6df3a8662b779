//! Store-wide settings edited from the admin panel.

use serde::{Deserialize, Serialize};

use soko_core::Currency;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreSettings {
    pub store_name: String,
    pub store_description: String,
    /// Printed under the store name on invoices.
    pub store_address: String,
    pub enable_notifications: bool,
    pub enable_email_marketing: bool,
    pub currency: Currency,
    pub timezone: String,
}

impl Default for StoreSettings {
    fn default() -> Self {
        Self {
            store_name: "Soko".to_owned(),
            store_description: "Everyday goods, delivered.".to_owned(),
            store_address: "Moi Avenue, Nairobi, Kenya".to_owned(),
            enable_notifications: true,
            enable_email_marketing: false,
            currency: Currency::BASE,
            timezone: "Africa/Nairobi".to_owned(),
        }
    }
}

impl StoreSettings {
    /// Check fields before saving.
    ///
    /// # Errors
    ///
    /// Returns a human-readable message for the first invalid field.
    pub fn validate(&self) -> Result<(), String> {
        if self.store_name.trim().is_empty() {
            return Err("Store name is required".to_owned());
        }
        if self.timezone.trim().is_empty() {
            return Err("Timezone is required".to_owned());
        }
        Ok(())
    }
}

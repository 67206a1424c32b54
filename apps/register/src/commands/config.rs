//! # Config Commands

use partsdesk_core::receipt::StoreInfo;

use crate::state::ConfigState;

/// Store settings for the front end. Secrets are not serialized.
pub fn get_config(config: &ConfigState) -> ConfigState {
    config.clone()
}

/// The receipt header block.
pub fn get_store_info(config: &ConfigState) -> StoreInfo {
    config.store_info()
}

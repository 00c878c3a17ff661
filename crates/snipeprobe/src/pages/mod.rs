//! Page objects for the Snipe-IT screens the scenario visits.

mod asset_create;
mod asset_list;
mod login;
pub mod select2;

pub use asset_create::{AssetChoices, AssetCreationPage, STATUS_READY_TO_DEPLOY};
pub use asset_list::{
    search_injection_script, AssetListPage, ASSET_DETAIL_PATTERN, RESULT_SIGNATURE_SCRIPT,
};
pub use login::LoginPage;
pub use select2::Select2Field;

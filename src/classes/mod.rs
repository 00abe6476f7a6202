pub mod base;
pub mod card;
pub mod set;

pub use base::{unwrap_default_export, ExtraFields, JsonObject};
pub use card::Card;
pub use set::{BoosterInfo, CardCount, LocalizedName, SetInfo};

pub mod html;
pub mod json;
pub mod layout;
pub mod markdown;

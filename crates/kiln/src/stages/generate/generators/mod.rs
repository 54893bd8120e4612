pub mod css;
pub mod ecmascript;
pub mod formats;

pub mod selector;
pub mod service;
pub mod sets;

pub use selector::*;
pub use service::*;
pub use sets::*;

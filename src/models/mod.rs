//! Domain models

pub mod category;
pub mod enums;
pub mod history;
pub mod loan;
pub mod request;
pub mod tool;
pub mod tool_return;
pub mod user;

pub mod error;
pub mod flags;
pub mod shell;

pub mod conversation;
pub mod core;
pub mod highlight;
pub mod input;
pub mod model;
pub mod process;

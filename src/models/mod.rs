//! Domain models

pub mod author;
pub mod book;
pub mod copy;
pub mod user;

// src/services/mod.rs

pub mod auth;
pub mod content;
pub mod moderation;
pub mod quiz;
pub mod transfer;

#[cfg(test)]
pub(crate) mod test_support;

// src/models/mod.rs

pub mod attempt;
pub mod question;
pub mod report;
pub mod subject;
pub mod suggestion;
pub mod user;

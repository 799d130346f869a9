// src/handlers/mod.rs

pub mod admin;
pub mod auth;
pub mod contribution;
pub mod pages;
pub mod quiz;
pub mod transfer;

//! Askly - session and authorization core of a Q&A backend
//!
//! This library provides user signup/signin/signout, session tokens, the
//! authorization policy and the question and answer services behind the
//! HTTP API.

pub mod api;
pub mod config;
pub mod db;
pub mod models;
pub mod services;

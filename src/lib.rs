//! Turnstile - Per-Client HTTP Admission Control
//!
//! This crate throttles inbound HTTP traffic per originating client. A
//! fixed-window counter per client decides whether each request may reach
//! the protected handler; requests over quota are rejected with
//! `429 Too Many Requests`.

pub mod config;
pub mod error;
pub mod http;
pub mod ratelimit;

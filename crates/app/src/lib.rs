//! Grove cart synchronization.
//!
//! Holds the visitor's cart locally while they are a guest, switches to the
//! backend's cart once they sign in and replays the guest cart into it.

pub mod auth;
pub mod config;
pub mod facade;
pub mod gateway;
pub mod observability;
pub mod render;
pub mod storage;
pub mod synchronizer;

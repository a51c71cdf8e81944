// src/lib.rs

//! LocalHub data layer library

pub mod error;
pub mod models;
pub mod services;
pub mod storage;
pub mod utils;

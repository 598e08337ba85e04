// src/lib.rs

//! gridwatch Library

pub mod commands;
pub mod error;
pub mod gateway;
pub mod models;
pub mod services;
pub mod storage;
pub mod utils;
pub mod watch;

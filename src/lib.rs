pub mod config;
pub mod humanize;
pub mod manifest;
pub mod observability;
pub mod pipeline;
pub mod storage;
pub mod transfer;

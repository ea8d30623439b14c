// Profile Studio Library
// 导出主要模块供二进制和测试使用

pub mod api;
pub mod config;
pub mod db;
pub mod errors;
pub mod health;
pub mod logging;
pub mod services;

pub use health::*;

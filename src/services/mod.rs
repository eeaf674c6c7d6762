pub mod gallery_service;
pub mod image_service;
pub mod query;
pub mod storage;
pub mod thumbnail_service;

pub mod listing_service;
pub mod staging;
pub mod storage;
pub mod upload_service;

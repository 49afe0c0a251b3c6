pub mod db;
pub mod email;
pub mod geocoding;
pub mod minio;
pub mod rabbitmq;
pub mod redis;

pub mod camera_feed;
pub mod chat;
pub mod junction;
pub mod predictor;
pub mod sprite;
pub mod utils;
pub mod violation;

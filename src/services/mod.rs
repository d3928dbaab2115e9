// src/services/mod.rs
pub mod chat_responder;
pub mod edited_video;
pub mod upload_store;

pub use chat_responder::ChatResponder;
pub use upload_store::UploadStore;

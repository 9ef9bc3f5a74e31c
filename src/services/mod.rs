pub mod completion;
pub mod content_generator;
pub mod content_service;
pub mod export;
pub mod http_helpers;
pub mod progress_service;
pub mod quiz_source;
pub mod study_material;
pub mod text_helpers;
pub mod user_service;

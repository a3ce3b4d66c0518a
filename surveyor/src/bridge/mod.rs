pub mod http;

pub use http::SurveyBridge;

// OAuth kickoff modules

pub mod feishu_oauth;

pub use feishu_oauth::{AuthorizationRequest, DEFAULT_APP_ID};

pub mod api_response;
pub mod auth_dto;
pub mod list_dto;

pub use api_response::ApiResponse;
pub use auth_dto::{LoginRequest, LoginResponse, SessionResponse};
pub use list_dto::{ListQuery, ListResponse};

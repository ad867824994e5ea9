pub mod auth_dto;
pub mod common_dto;

pub use common_dto::{ApiResponse, PaginatedResponse, Pagination};

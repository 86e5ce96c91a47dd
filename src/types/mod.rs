//! Shared request and response types.

mod pagination;
mod response;

pub use pagination::{
    Paginated, PaginatedActivity, PaginatedCertificates, PaginationMeta, PaginationParams,
};
pub use response::{MessageResponse, NoContent};

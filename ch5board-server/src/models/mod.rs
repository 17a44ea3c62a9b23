//! Domain models with validation at construction
//!
//! All user input is validated when creating these types.
//! Invalid input returns ValidationError, not panic.

pub mod validation;
pub mod board;
pub mod thread;
pub mod response;
pub mod pagination;

pub use validation::ValidationError;
pub use board::BoardId;
pub use thread::{ThreadSort, ThreadTitle};
pub use response::{ImageUrl, Mail, NewResponse, Poster, PosterName, ResponseBody};
pub use pagination::{Pagination, Paginated, PaginationParams};

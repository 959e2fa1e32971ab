//! Business logic services.

mod blogging;
mod paginator;

pub use blogging::{
    BlogService, MAX_BODY_LENGTH, MAX_DESCRIPTION_LENGTH, MAX_TITLE_LENGTH,
};
pub use paginator::paginate;

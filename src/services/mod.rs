mod token;
mod uploads;

pub use token::{Claims, TokenError, TokenService};
pub use uploads::{UploadError, UploadService};

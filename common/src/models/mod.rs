mod files;
pub use files::*;

mod jobs;
pub use jobs::*;

mod records;
pub use records::*;

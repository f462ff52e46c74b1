mod common;
pub use common::*;

mod fs;

mod jobs;
pub use jobs::*;

mod results;
pub use results::*;

mod reports;
pub use reports::*;

mod uploads;
pub use uploads::*;

pub mod content;
pub mod drivers;
pub mod stamp;

mod dir_loader;
mod front_matter;
mod page;
mod page_loader;

pub use dir_loader::*;
pub use front_matter::*;
pub use page::*;
pub use page_loader::*;

// Base modules
pub mod config;
pub mod consts;
pub mod error;
pub mod session;
pub mod util;

// Decoding engine
pub mod checksum;
pub mod page; // src/page/{mod,header,heap,index,special}.rs
pub mod tags;

// Boundary layer (CLI, file loop, markup)
pub mod cli;
pub mod dump;
pub mod xml;

// Convenient re-exports
pub use config::{BlockRange, Options};
pub use error::DecodeError;
pub use page::special::SpecialKind;
pub use page::{annotate_page, Block, PageAnnotations};
pub use session::Session;
pub use tags::{Annotation, Color};

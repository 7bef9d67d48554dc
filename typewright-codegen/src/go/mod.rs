//! Go source rendering.

pub mod file;
pub mod structs;
pub mod types;

pub use file::{GoFile, reindent};
pub use structs::render_struct_decl;
pub use types::{Rendered, render_name, render_type};

// Raw table rows, where they are read from, and how they are combined.

pub mod loader;
pub mod records;
pub mod source;

pub mod fdtable;
pub mod file;

pub use fdtable::{FdTable, NOFILE};
pub use file::{NFILE, OpenFileTable};

#![cfg_attr(not(test), no_std)]

extern crate alloc;

pub mod error;
pub mod fs;
pub mod proc;
pub mod syscall;
pub mod uvm;
pub mod vfs;

#[cfg(test)]
mod tests;

use alloc::sync::Arc;

use crate::error::{KResult, KernelError};

/// Longest path accepted from user space, including the NUL.
pub const PATH_MAX: usize = 256;

/// Path the first process opens for descriptors 0/1/2. The VFS resolves it
/// to whatever console device is registered.
pub const CONSOLE_PATH: &str = "con:";

bitflags::bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct OpenFlags: u32 {
        const O_WRONLY = 0x01;
        const O_RDWR   = 0x02;
        const O_CREAT  = 0x04;
        const O_EXCL   = 0x08;
        const O_TRUNC  = 0x10;
        const O_APPEND = 0x20;
    }
}

impl OpenFlags {
    /// Read-only is the absence of both write bits.
    pub const O_RDONLY: OpenFlags = OpenFlags::empty();

    pub fn access_mode(self) -> KResult<AccessMode> {
        match (
            self.contains(OpenFlags::O_WRONLY),
            self.contains(OpenFlags::O_RDWR),
        ) {
            (false, false) => Ok(AccessMode::ReadOnly),
            (true, false) => Ok(AccessMode::WriteOnly),
            (false, true) => Ok(AccessMode::ReadWrite),
            (true, true) => Err(KernelError::InvalidArgument),
        }
    }
}

/// Direction an open file permits. Fixed when the entry is created and
/// shared, never renegotiated, by every duplicate of the descriptor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessMode {
    ReadOnly,
    WriteOnly,
    ReadWrite,
}

impl AccessMode {
    pub fn readable(self) -> bool {
        self != AccessMode::WriteOnly
    }

    pub fn writable(self) -> bool {
        self != AccessMode::ReadOnly
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Stat {
    pub size: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Whence {
    Set,
    Cur,
    End,
}

impl Whence {
    pub fn from_raw(raw: usize) -> KResult<Whence> {
        match raw {
            0 => Ok(Whence::Set),
            1 => Ok(Whence::Cur),
            2 => Ok(Whence::End),
            _ => Err(KernelError::InvalidArgument),
        }
    }
}

/// Handle to a filesystem object. I/O takes an explicit offset; position
/// tracking lives entirely in the open-file table.
pub trait Vnode: Send + Sync {
    /// Reads into `buf` starting at `offset`. Short reads are legal and
    /// reported through the return value.
    fn read(&self, buf: &mut [u8], offset: i64) -> KResult<usize>;

    fn write(&self, buf: &[u8], offset: i64) -> KResult<usize>;

    fn stat(&self) -> KResult<Stat>;

    /// False for console- and pipe-like objects that cannot be repositioned.
    fn is_seekable(&self) -> bool;
}

/// The VFS collaborator: resolves paths to vnodes and takes them back when
/// the last reference goes away.
pub trait Vfs: Send + Sync {
    fn open(&self, path: &str, flags: OpenFlags, mode: u32) -> KResult<Arc<dyn Vnode>>;

    fn close(&self, vnode: Arc<dyn Vnode>);
}

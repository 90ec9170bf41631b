use alloc::sync::Arc;

use crate::error::{KResult, KernelError};
use crate::fs::file::OpenFileTable;
use crate::vfs::{CONSOLE_PATH, OpenFlags};

pub const NOFILE: usize = 32; // max descriptors per process

/// Per-process descriptor table: small non-negative integers mapped to
/// open-file slots. The table never owns a vnode, only borrowed indices
/// into the system-wide `OpenFileTable`.
pub struct FdTable {
    oft: Arc<OpenFileTable>,
    fds: [Option<usize>; NOFILE],
}

impl FdTable {
    pub fn new(oft: Arc<OpenFileTable>) -> Self {
        Self {
            oft,
            fds: [None; NOFILE],
        }
    }

    pub fn oft(&self) -> &Arc<OpenFileTable> {
        &self.oft
    }

    /// Binds descriptors 0/1/2 to the console, stdin read-only and
    /// stdout/stderr write-only. Only the first process in the system does
    /// this; its children inherit. A failure unwinds whatever was bound.
    pub fn init_stdio(&mut self) -> KResult<()> {
        let stdio = [
            (0, OpenFlags::O_RDONLY),
            (1, OpenFlags::O_WRONLY),
            (2, OpenFlags::O_WRONLY),
        ];
        for (fd, flags) in stdio {
            match self.oft.open(CONSOLE_PATH, flags, 0) {
                Ok(index) => self.fds[fd] = Some(index),
                Err(e) => {
                    self.close_all();
                    return Err(e);
                }
            }
        }
        Ok(())
    }

    /// Translates a descriptor to its open-file index.
    pub fn get(&self, fd: usize) -> KResult<usize> {
        self.fds
            .get(fd)
            .copied()
            .flatten()
            .ok_or(KernelError::BadFileDescriptor)
    }

    /// Binds the lowest-numbered closed descriptor to an open-file slot.
    /// On failure the caller still owns the slot's reference.
    pub fn bind(&mut self, index: usize) -> KResult<usize> {
        let Some(fd) = self.fds.iter().position(|s| s.is_none()) else {
            return Err(KernelError::TooManyOpenFiles);
        };
        self.fds[fd] = Some(index);
        Ok(fd)
    }

    /// Closes `fd`, releasing the bound open-file entry exactly once.
    pub fn close(&mut self, fd: usize) -> KResult<()> {
        let slot = self.fds.get_mut(fd).ok_or(KernelError::BadFileDescriptor)?;
        let index = slot.take().ok_or(KernelError::BadFileDescriptor)?;
        self.oft.release(index);
        Ok(())
    }

    /// Rebinds `new_fd` to whatever `old_fd` references. A same-descriptor
    /// call is a no-op; an open `new_fd` is fully closed before the rebind.
    pub fn dup2(&mut self, old_fd: usize, new_fd: usize) -> KResult<usize> {
        if new_fd >= NOFILE {
            return Err(KernelError::BadFileDescriptor);
        }
        let index = self.get(old_fd)?;
        if old_fd == new_fd {
            return Ok(new_fd);
        }
        // Take the new reference before dropping the old binding, so an
        // entry shared by both descriptors can never transiently hit zero.
        self.oft.dup(index);
        if let Some(prev) = self.fds[new_fd].take() {
            self.oft.release(prev);
        }
        self.fds[new_fd] = Some(index);
        Ok(new_fd)
    }

    /// Duplicates every live binding for a forked child, adding one
    /// reference per inherited descriptor.
    pub fn inherit(&self) -> FdTable {
        let mut child = FdTable::new(self.oft.clone());
        for (fd, binding) in self.fds.iter().enumerate() {
            if let Some(index) = *binding {
                self.oft.dup(index);
                child.fds[fd] = Some(index);
            }
        }
        child
    }

    /// Process-exit teardown: every live descriptor is released exactly
    /// once, in ascending order.
    pub fn close_all(&mut self) {
        for binding in self.fds.iter_mut() {
            if let Some(index) = binding.take() {
                self.oft.release(index);
            }
        }
    }
}

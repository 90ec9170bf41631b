//! File syscall entry points. Thin by design: validate, move bytes across
//! the user boundary, delegate to the tables, translate errors. No
//! algorithmic logic lives here.

use alloc::sync::Arc;
use alloc::vec::Vec;

use crate::error::{KResult, KernelError};
use crate::fs::file::OpenFileTable;
use crate::proc::Process;
use crate::uvm::UserAddr;
use crate::vfs::{OpenFlags, PATH_MAX, Whence};

/// Kernel-owned staging buffer for a user transfer. Allocation failure is
/// the caller's `OutOfMemory`, not a panic.
fn kernel_buf(len: usize) -> KResult<Vec<u8>> {
    let mut buf = Vec::new();
    buf.try_reserve_exact(len)
        .map_err(|_| KernelError::OutOfMemory)?;
    buf.resize(len, 0);
    Ok(buf)
}

/// Resolves a descriptor once, handing back the open-file index and the
/// table to run it against, without holding the descriptor-table lock.
fn resolve(proc: &Process, fd: usize) -> KResult<(usize, Arc<OpenFileTable>)> {
    let files = proc.files.lock();
    let index = files.get(fd)?;
    Ok((index, files.oft().clone()))
}

pub fn sys_open(proc: &Process, upath: UserAddr, flags: u32, mode: u32) -> KResult<usize> {
    let flags = OpenFlags::from_bits(flags).ok_or(KernelError::InvalidArgument)?;

    let mut kpath = [0u8; PATH_MAX];
    let len = proc.space.copy_in_str(upath, &mut kpath)?;
    let path = core::str::from_utf8(&kpath[..len.saturating_sub(1)])
        .map_err(|_| KernelError::InvalidArgument)?;

    // The VFS open may block, so it runs outside the descriptor-table lock;
    // losing the descriptor race afterwards hands the slot straight back.
    let oft = proc.files.lock().oft().clone();
    let index = oft.open(path, flags, mode)?;
    let bound = proc.files.lock().bind(index);
    match bound {
        Ok(fd) => Ok(fd),
        Err(e) => {
            oft.release(index);
            Err(e)
        }
    }
}

pub fn sys_close(proc: &Process, fd: usize) -> KResult<usize> {
    proc.files.lock().close(fd)?;
    Ok(0)
}

pub fn sys_read(proc: &Process, fd: usize, ubuf: UserAddr, len: usize) -> KResult<usize> {
    let (index, oft) = resolve(proc, fd)?;
    let mut kbuf = kernel_buf(len)?;
    // The copy-out runs inside the offset critical section, so a faulting
    // user buffer leaves the offset untouched.
    oft.read_with(index, &mut kbuf, |data| {
        proc.space.copy_out(ubuf, data)?;
        Ok(())
    })
}

pub fn sys_write(proc: &Process, fd: usize, ubuf: UserAddr, len: usize) -> KResult<usize> {
    let (index, oft) = resolve(proc, fd)?;
    let mut kbuf = kernel_buf(len)?;
    proc.space.copy_in(ubuf, &mut kbuf)?;
    oft.write(index, &kbuf)
}

pub fn sys_lseek(proc: &Process, fd: usize, pos: i64, whence: usize) -> KResult<usize> {
    let whence = Whence::from_raw(whence)?;
    let (index, oft) = resolve(proc, fd)?;
    let offset = oft.seek(index, pos, whence)?;
    Ok(offset as usize)
}

pub fn sys_dup2(proc: &Process, old_fd: usize, new_fd: usize) -> KResult<usize> {
    proc.files.lock().dup2(old_fd, new_fd)
}

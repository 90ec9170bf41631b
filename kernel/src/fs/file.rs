use alloc::sync::Arc;
use spin::Mutex;

use crate::error::{KResult, KernelError};
use crate::vfs::{AccessMode, OpenFlags, Stat, Vfs, Vnode, Whence};

pub const NFILE: usize = 128; // system-wide max open files

/// One open instance of a file. Every descriptor duplicated from the same
/// open shares this entry, and with it the offset and access mode; two
/// independent opens of the same path get two entries.
pub struct OpenFile {
    vnode: Arc<dyn Vnode>,
    mode: AccessMode,
    // Held across the vnode I/O, so the offset-read / transfer /
    // offset-update sequence is atomic per entry.
    offset: Mutex<i64>,
}

struct Slot {
    file: Arc<OpenFile>,
    refs: u32,
}

/// System-wide registry of open files. The slot array lock covers
/// allocation, release and refcounts only; it is never held across vnode
/// I/O. In-flight operations keep their entry alive through the `Arc`.
pub struct OpenFileTable {
    vfs: Arc<dyn Vfs>,
    slots: Mutex<[Option<Slot>; NFILE]>,
}

impl OpenFileTable {
    pub fn new(vfs: Arc<dyn Vfs>) -> Self {
        Self {
            vfs,
            slots: Mutex::new([const { None }; NFILE]),
        }
    }

    /// Resolves `path` through the VFS and installs the result in a free
    /// slot with refcount 1. Returns the slot index.
    pub fn open(&self, path: &str, flags: OpenFlags, mode: u32) -> KResult<usize> {
        let access = flags.access_mode()?;
        let vnode = self.vfs.open(path, flags, mode)?;

        // Append starts at end-of-file; a failed stat fails the whole open.
        let offset = if flags.contains(OpenFlags::O_APPEND) {
            match vnode.stat() {
                Ok(Stat { size }) => size,
                Err(e) => {
                    self.vfs.close(vnode);
                    return Err(e);
                }
            }
        } else {
            0
        };

        let file = Arc::new(OpenFile {
            vnode,
            mode: access,
            offset: Mutex::new(offset),
        });

        let mut slots = self.slots.lock();
        let Some(index) = slots.iter().position(|s| s.is_none()) else {
            drop(slots);
            // The vnode is already open; give it back before failing.
            self.vfs.close(file.vnode.clone());
            return Err(KernelError::TooManyOpenFiles);
        };
        slots[index] = Some(Slot { file, refs: 1 });
        Ok(index)
    }

    /// Adds a reference for one more descriptor bound to `index`. The
    /// caller must already own a descriptor bound to this slot.
    pub fn dup(&self, index: usize) {
        let mut slots = self.slots.lock();
        match slots[index].as_mut() {
            Some(slot) => slot.refs += 1,
            None => panic!("open file dup: slot {} is free", index),
        }
    }

    /// Drops one reference. The last one clears the slot and closes the
    /// vnode through the VFS, exactly once.
    pub fn release(&self, index: usize) {
        let mut slots = self.slots.lock();
        let slot = match slots[index].as_mut() {
            Some(slot) => slot,
            None => panic!("open file release: slot {} is free", index),
        };
        slot.refs -= 1;
        if slot.refs > 0 {
            return;
        }
        let file = slots[index].take().unwrap().file;
        // The close may block; never under the table lock.
        drop(slots);
        self.vfs.close(file.vnode.clone());
    }

    pub fn read(&self, index: usize, buf: &mut [u8]) -> KResult<usize> {
        self.read_with(index, buf, |_| Ok(()))
    }

    /// Reads at the current offset, hands the bytes to `deliver`, and only
    /// then commits the offset update. A failed delivery leaves the offset
    /// unchanged, as if the read never happened.
    pub fn read_with<F>(&self, index: usize, buf: &mut [u8], deliver: F) -> KResult<usize>
    where
        F: FnOnce(&[u8]) -> KResult<()>,
    {
        let file = self.handle(index)?;
        if !file.mode.readable() {
            return Err(KernelError::BadFileDescriptor);
        }
        let mut offset = file.offset.lock();
        let n = file.vnode.read(buf, *offset)?;
        deliver(&buf[..n])?;
        // Advance by what was actually transferred, not what was asked for.
        *offset += n as i64;
        Ok(n)
    }

    pub fn write(&self, index: usize, buf: &[u8]) -> KResult<usize> {
        let file = self.handle(index)?;
        if !file.mode.writable() {
            return Err(KernelError::BadFileDescriptor);
        }
        let mut offset = file.offset.lock();
        let n = file.vnode.write(buf, *offset)?;
        *offset += n as i64;
        Ok(n)
    }

    /// Repositions the entry. A failure leaves the stored offset unchanged.
    pub fn seek(&self, index: usize, pos: i64, whence: Whence) -> KResult<i64> {
        let file = self.handle(index)?;
        if !file.vnode.is_seekable() {
            return Err(KernelError::NotSeekable);
        }
        let mut offset = file.offset.lock();
        let base = match whence {
            Whence::Set => 0,
            Whence::Cur => *offset,
            Whence::End => file.vnode.stat()?.size,
        };
        let new = base.checked_add(pos).ok_or(KernelError::InvalidArgument)?;
        if new < 0 {
            return Err(KernelError::InvalidArgument);
        }
        *offset = new;
        Ok(new)
    }

    /// Resolves an index to its entry so the caller can run blocking vnode
    /// I/O with the table lock released.
    fn handle(&self, index: usize) -> KResult<Arc<OpenFile>> {
        let slots = self.slots.lock();
        slots
            .get(index)
            .and_then(|s| s.as_ref())
            .map(|s| s.file.clone())
            .ok_or(KernelError::BadFileDescriptor)
    }
}

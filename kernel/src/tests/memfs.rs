//! Test doubles: an in-memory VFS with close accounting and a flat fake
//! user address space.

use alloc::collections::BTreeMap;
use alloc::string::String;
use alloc::sync::Arc;
use alloc::vec::Vec;
use core::sync::atomic::{AtomicUsize, Ordering};
use spin::Mutex;

use crate::error::{KResult, KernelError};
use crate::uvm::{CopyError, UserAddr, UserSpace};
use crate::vfs::{CONSOLE_PATH, OpenFlags, Stat, Vfs, Vnode};

/// Named byte vectors plus a console device. Counts VFS closes so tests can
/// check that the last release closes the vnode exactly once.
pub struct MemFs {
    files: Mutex<BTreeMap<String, Arc<Mutex<Vec<u8>>>>>,
    closes: AtomicUsize,
}

impl MemFs {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            files: Mutex::new(BTreeMap::new()),
            closes: AtomicUsize::new(0),
        })
    }

    pub fn close_count(&self) -> usize {
        self.closes.load(Ordering::SeqCst)
    }

    pub fn contents(&self, path: &str) -> Option<Vec<u8>> {
        self.files.lock().get(path).map(|d| d.lock().clone())
    }
}

impl Vfs for MemFs {
    fn open(&self, path: &str, flags: OpenFlags, _mode: u32) -> KResult<Arc<dyn Vnode>> {
        if path == CONSOLE_PATH {
            return Ok(Arc::new(ConsoleVnode));
        }
        let mut files = self.files.lock();
        let data = match files.get(path) {
            Some(data) => {
                if flags.contains(OpenFlags::O_CREAT | OpenFlags::O_EXCL) {
                    return Err(KernelError::Exists);
                }
                if flags.contains(OpenFlags::O_TRUNC) {
                    data.lock().clear();
                }
                data.clone()
            }
            None => {
                if !flags.contains(OpenFlags::O_CREAT) {
                    return Err(KernelError::NotFound);
                }
                let data = Arc::new(Mutex::new(Vec::new()));
                files.insert(String::from(path), data.clone());
                data
            }
        };
        Ok(Arc::new(MemVnode { data }))
    }

    fn close(&self, _vnode: Arc<dyn Vnode>) {
        self.closes.fetch_add(1, Ordering::SeqCst);
    }
}

struct MemVnode {
    data: Arc<Mutex<Vec<u8>>>,
}

impl Vnode for MemVnode {
    fn read(&self, buf: &mut [u8], offset: i64) -> KResult<usize> {
        let data = self.data.lock();
        let off = offset.max(0) as usize;
        if off >= data.len() {
            return Ok(0);
        }
        let n = buf.len().min(data.len() - off);
        buf[..n].copy_from_slice(&data[off..off + n]);
        Ok(n)
    }

    fn write(&self, buf: &[u8], offset: i64) -> KResult<usize> {
        let mut data = self.data.lock();
        let off = offset.max(0) as usize;
        if data.len() < off + buf.len() {
            data.resize(off + buf.len(), 0);
        }
        data[off..off + buf.len()].copy_from_slice(buf);
        Ok(buf.len())
    }

    fn stat(&self) -> KResult<Stat> {
        Ok(Stat {
            size: self.data.lock().len() as i64,
        })
    }

    fn is_seekable(&self) -> bool {
        true
    }
}

/// Console device: reads return nothing, writes are swallowed, never
/// seekable and stat is meaningless.
struct ConsoleVnode;

impl Vnode for ConsoleVnode {
    fn read(&self, _buf: &mut [u8], _offset: i64) -> KResult<usize> {
        Ok(0)
    }

    fn write(&self, buf: &[u8], _offset: i64) -> KResult<usize> {
        Ok(buf.len())
    }

    fn stat(&self) -> KResult<Stat> {
        Err(KernelError::Io)
    }

    fn is_seekable(&self) -> bool {
        false
    }
}

/// Fake user address space: addresses index one shared byte array, so tests
/// can plant paths and buffers and inspect what the kernel copied out.
pub struct FlatSpace {
    mem: Mutex<Vec<u8>>,
}

impl FlatSpace {
    pub fn new(size: usize) -> Arc<Self> {
        Arc::new(Self {
            mem: Mutex::new(vec![0; size]),
        })
    }

    pub fn poke(&self, addr: UserAddr, bytes: &[u8]) {
        self.mem.lock()[addr..addr + bytes.len()].copy_from_slice(bytes);
    }

    /// Plants a NUL-terminated string.
    pub fn poke_str(&self, addr: UserAddr, s: &str) {
        self.poke(addr, s.as_bytes());
        self.mem.lock()[addr + s.len()] = 0;
    }

    pub fn peek(&self, addr: UserAddr, len: usize) -> Vec<u8> {
        self.mem.lock()[addr..addr + len].to_vec()
    }
}

impl UserSpace for FlatSpace {
    fn copy_in(&self, src: UserAddr, dst: &mut [u8]) -> Result<(), CopyError> {
        let mem = self.mem.lock();
        let end = src.checked_add(dst.len()).ok_or(CopyError::Fault)?;
        if end > mem.len() {
            return Err(CopyError::NotMapped);
        }
        dst.copy_from_slice(&mem[src..end]);
        Ok(())
    }

    fn copy_out(&self, dst: UserAddr, src: &[u8]) -> Result<(), CopyError> {
        let mut mem = self.mem.lock();
        let end = dst.checked_add(src.len()).ok_or(CopyError::Fault)?;
        if end > mem.len() {
            return Err(CopyError::NotMapped);
        }
        mem[dst..end].copy_from_slice(src);
        Ok(())
    }

    fn copy_in_str(&self, src: UserAddr, dst: &mut [u8]) -> Result<usize, CopyError> {
        let mem = self.mem.lock();
        let mut copied = 0;
        while copied < dst.len() {
            let byte = *mem.get(src + copied).ok_or(CopyError::NotMapped)?;
            dst[copied] = byte;
            copied += 1;
            if byte == 0 {
                return Ok(copied);
            }
        }
        Err(CopyError::TooLong)
    }
}

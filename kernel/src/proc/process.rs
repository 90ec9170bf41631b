use alloc::sync::Arc;
use core::sync::atomic::{AtomicUsize, Ordering};
use spin::Mutex;

use crate::error::KResult;
use crate::fs::fdtable::FdTable;
use crate::fs::file::OpenFileTable;
use crate::uvm::UserSpace;

static NEXT_PID: AtomicUsize = AtomicUsize::new(1);

/// The slice of a process this subsystem needs: an identity, a descriptor
/// table and a way into its address space. The open-file table is shared
/// system-wide and reached through the descriptor table.
pub struct Process {
    pub pid: usize,
    pub files: Mutex<FdTable>,
    pub space: Arc<dyn UserSpace>,
}

impl Process {
    /// First process in the system. Owns the console on descriptors 0/1/2.
    pub fn spawn_init(oft: Arc<OpenFileTable>, space: Arc<dyn UserSpace>) -> KResult<Arc<Self>> {
        let mut files = FdTable::new(oft);
        files.init_stdio()?;
        let pid = NEXT_PID.fetch_add(1, Ordering::Relaxed);
        log::debug!("proc {}: stdio descriptors initialized", pid);
        Ok(Arc::new(Self {
            pid,
            files: Mutex::new(files),
            space,
        }))
    }

    /// Forked child: live descriptor bindings are inherited, the referenced
    /// open-file entries gain one reference each.
    pub fn fork(self: &Arc<Self>, space: Arc<dyn UserSpace>) -> Arc<Self> {
        let files = self.files.lock().inherit();
        Arc::new(Self {
            pid: NEXT_PID.fetch_add(1, Ordering::Relaxed),
            files: Mutex::new(files),
            space,
        })
    }

    /// Exit teardown: closes every live descriptor.
    pub fn exit(&self) {
        log::debug!("proc {}: exit, closing descriptors", self.pid);
        self.files.lock().close_all();
    }
}

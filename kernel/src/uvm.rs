use crate::error::KernelError;

/// Virtual address in some process's user space. Opaque to this subsystem;
/// only a `UserSpace` implementation can dereference it.
pub type UserAddr = usize;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CopyError {
    NotMapped,
    NoPerm,
    Fault,
    TooLong,
}

impl From<CopyError> for KernelError {
    fn from(e: CopyError) -> Self {
        match e {
            CopyError::TooLong => KernelError::NameTooLong,
            _ => KernelError::AddressFault,
        }
    }
}

/// Bounded transfers between a process's address space and kernel memory.
/// The kernel never dereferences user pointers directly; every path and
/// buffer crosses through one of these methods.
pub trait UserSpace: Send + Sync {
    fn copy_in(&self, src: UserAddr, dst: &mut [u8]) -> Result<(), CopyError>;

    fn copy_out(&self, dst: UserAddr, src: &[u8]) -> Result<(), CopyError>;

    /// Copies a NUL-terminated string into `dst`. Returns the number of
    /// bytes copied including the NUL, or `TooLong` if no terminator fits.
    fn copy_in_str(&self, src: UserAddr, dst: &mut [u8]) -> Result<usize, CopyError>;
}

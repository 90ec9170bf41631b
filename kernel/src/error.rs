/// Kernel-wide error kinds for the file subsystem.
///
/// The first group is raised by the descriptor and open-file tables
/// themselves; the second group passes through from the VFS layer
/// unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KernelError {
    BadFileDescriptor,
    InvalidArgument,
    NotSeekable,
    TooManyOpenFiles,
    AddressFault,
    OutOfMemory,
    NameTooLong,

    NotFound,
    Exists,
    PermissionDenied,
    Io,
}

pub type KResult<T> = Result<T, KernelError>;

impl KernelError {
    /// Process-visible error number, always positive. The syscall layer
    /// negates it on the way out.
    pub fn errno(self) -> isize {
        match self {
            KernelError::BadFileDescriptor => 9,
            KernelError::InvalidArgument => 22,
            KernelError::NotSeekable => 29,
            KernelError::TooManyOpenFiles => 24,
            KernelError::AddressFault => 14,
            KernelError::OutOfMemory => 12,
            KernelError::NameTooLong => 36,
            KernelError::NotFound => 2,
            KernelError::Exists => 17,
            KernelError::PermissionDenied => 13,
            KernelError::Io => 5,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            KernelError::BadFileDescriptor => "bad file descriptor",
            KernelError::InvalidArgument => "invalid argument",
            KernelError::NotSeekable => "object is not seekable",
            KernelError::TooManyOpenFiles => "too many open files",
            KernelError::AddressFault => "bad user address",
            KernelError::OutOfMemory => "out of memory",
            KernelError::NameTooLong => "path name too long",
            KernelError::NotFound => "no such file",
            KernelError::Exists => "file exists",
            KernelError::PermissionDenied => "permission denied",
            KernelError::Io => "I/O error",
        }
    }
}

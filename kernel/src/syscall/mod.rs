use crate::error::KernelError;
use crate::proc::Process;

pub mod fs;

pub const SYS_OPEN: usize = 10;
pub const SYS_CLOSE: usize = 11;
pub const SYS_READ: usize = 12;
pub const SYS_WRITE: usize = 13;
pub const SYS_LSEEK: usize = 14;
pub const SYS_DUP2: usize = 15;

/// Raw syscall argument block, register-shaped: the trap handler fills it
/// from the saved frame before calling in.
#[derive(Debug, Clone, Copy, Default)]
pub struct SyscallArgs {
    pub num: usize,
    pub args: [usize; 4],
}

/// Translates a syscall into table operations and the result back into the
/// process-visible convention: non-negative value, or a negated errno.
pub fn dispatch(proc: &Process, ctx: &SyscallArgs) -> isize {
    let result = match ctx.num {
        SYS_OPEN => fs::sys_open(proc, ctx.args[0], ctx.args[1] as u32, ctx.args[2] as u32),
        SYS_CLOSE => fs::sys_close(proc, ctx.args[0]),
        SYS_READ => fs::sys_read(proc, ctx.args[0], ctx.args[1], ctx.args[2]),
        SYS_WRITE => fs::sys_write(proc, ctx.args[0], ctx.args[1], ctx.args[2]),
        SYS_LSEEK => fs::sys_lseek(proc, ctx.args[0], ctx.args[1] as i64, ctx.args[2]),
        SYS_DUP2 => fs::sys_dup2(proc, ctx.args[0], ctx.args[1]),
        n => {
            log::warn!("syscall: unknown number {}", n);
            Err(KernelError::InvalidArgument)
        }
    };
    match result {
        Ok(value) => value as isize,
        Err(e) => -e.errno(),
    }
}

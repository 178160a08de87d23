//! POSIX terminal driver calls.

use std::io;
use std::os::unix::io::RawFd;

use crate::WindowSize;

/// Typed `TIOCGWINSZ` query.
pub(crate) fn window_size(fd: RawFd) -> io::Result<WindowSize> {
    // SAFETY: winsize is plain old data; all-zero is a valid value.
    let mut ws: libc::winsize = unsafe { std::mem::zeroed() };
    // SAFETY: TIOCGWINSZ writes exactly one winsize through the pointer.
    let ret = unsafe { libc::ioctl(fd, libc::TIOCGWINSZ, &mut ws) };
    if ret < 0 {
        return Err(io::Error::last_os_error());
    }
    Ok(WindowSize::new(ws.ws_row, ws.ws_col))
}

/// Untyped device-control request with an 8-byte (4 × u16) buffer.
pub(crate) fn ioctl(fd: RawFd, request: u64, buf: &mut [u8; 8]) -> io::Result<i32> {
    // SAFETY: every window-size request writes at most 4 × u16 = 8 bytes,
    // which is the size of `buf`.
    let ret = unsafe { libc::ioctl(fd, request as _, buf.as_mut_ptr()) };
    if ret < 0 {
        return Err(io::Error::last_os_error());
    }
    Ok(ret)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn window_size_of_regular_file_is_not_a_tty() {
        use std::os::unix::io::AsRawFd;

        let file = std::fs::File::open("/dev/null").unwrap();
        let err = window_size(file.as_raw_fd()).unwrap_err();
        assert_eq!(err.raw_os_error(), Some(libc::ENOTTY));
    }

    #[test]
    fn raw_ioctl_on_bad_descriptor_fails() {
        let mut buf = [0u8; 8];
        let err = ioctl(-1, 0x5413, &mut buf).unwrap_err();
        assert_eq!(err.raw_os_error(), Some(libc::EBADF));
        assert_eq!(buf, [0u8; 8]);
    }
}

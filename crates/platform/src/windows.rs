//! Windows console calls.

use std::io;

use windows_sys::Win32::Foundation::INVALID_HANDLE_VALUE;
use windows_sys::Win32::System::Console::{
    GetConsoleScreenBufferInfo, GetStdHandle, CONSOLE_SCREEN_BUFFER_INFO, STD_ERROR_HANDLE,
    STD_INPUT_HANDLE, STD_OUTPUT_HANDLE,
};

use crate::{StdStream, WindowSize};

/// Visible window of the console screen buffer behind `stream`.
pub(crate) fn window_size(stream: StdStream) -> io::Result<WindowSize> {
    let which = match stream {
        StdStream::Stdin => STD_INPUT_HANDLE,
        StdStream::Stdout => STD_OUTPUT_HANDLE,
        StdStream::Stderr => STD_ERROR_HANDLE,
    };

    // SAFETY: GetStdHandle has no preconditions.
    let handle = unsafe { GetStdHandle(which) };
    if handle == INVALID_HANDLE_VALUE || handle.is_null() {
        return Err(io::Error::last_os_error());
    }

    // SAFETY: CONSOLE_SCREEN_BUFFER_INFO is plain old data.
    let mut info: CONSOLE_SCREEN_BUFFER_INFO = unsafe { std::mem::zeroed() };
    // SAFETY: `handle` is a valid standard handle and `info` is writable.
    if unsafe { GetConsoleScreenBufferInfo(handle, &mut info) } == 0 {
        return Err(io::Error::last_os_error());
    }

    let window = info.srWindow;
    let rows = (window.Bottom - window.Top + 1).max(0) as u16;
    let cols = (window.Right - window.Left + 1).max(0) as u16;
    Ok(WindowSize::new(rows, cols))
}

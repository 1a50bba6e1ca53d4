//! Conversion between Rust strings and the host's legacy code pages.
//!
//! Adapter names arrive in the ANSI code page, and the configuration tool
//! reads its script in the console input code page and writes its output in
//! the console output code page. Off Windows every code page is UTF-8.

use crate::error::Result;

/// Which of the host's code pages to use.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CodePage {
    /// The system ANSI code page.
    Ansi,
    /// The console input code page, falling back to the OEM code page.
    ConsoleInput,
    /// The console output code page, falling back to the OEM code page.
    ConsoleOutput,
    /// UTF-8 regardless of host settings.
    Utf8,
}

/// Encode text in the given code page.
pub fn encode(text: &str, page: CodePage) -> Result<Vec<u8>> {
    if text.is_empty() {
        return Ok(Vec::new());
    }
    imp::encode(text, page)
}

/// Decode bytes from the given code page, replacing what cannot be mapped.
pub fn decode(bytes: &[u8], page: CodePage) -> String {
    if bytes.is_empty() {
        return String::new();
    }
    imp::decode(bytes, page)
}

#[cfg(not(windows))]
mod imp {
    use super::CodePage;
    use crate::error::Result;

    pub(super) fn encode(text: &str, _page: CodePage) -> Result<Vec<u8>> {
        Ok(text.as_bytes().to_vec())
    }

    pub(super) fn decode(bytes: &[u8], _page: CodePage) -> String {
        String::from_utf8_lossy(bytes).into_owned()
    }
}

#[cfg(windows)]
mod imp {
    use std::ptr;

    use windows_sys::Win32::Foundation::GetLastError;
    use windows_sys::Win32::Globalization::{
        GetACP, GetOEMCP, MultiByteToWideChar, WideCharToMultiByte,
    };
    use windows_sys::Win32::System::Console::{GetConsoleCP, GetConsoleOutputCP};

    use super::CodePage;
    use crate::error::{Error, Result};

    const CP_UTF8: u32 = 65001;

    fn resolve(page: CodePage) -> u32 {
        // SAFETY: these only read process-wide settings
        unsafe {
            match page {
                CodePage::Ansi => GetACP(),
                CodePage::ConsoleInput => match GetConsoleCP() {
                    0 => GetOEMCP(),
                    cp => cp,
                },
                CodePage::ConsoleOutput => match GetConsoleOutputCP() {
                    0 => GetOEMCP(),
                    cp => cp,
                },
                CodePage::Utf8 => CP_UTF8,
            }
        }
    }

    pub(super) fn encode(text: &str, page: CodePage) -> Result<Vec<u8>> {
        let cp = resolve(page);
        if cp == CP_UTF8 {
            return Ok(text.as_bytes().to_vec());
        }

        let wide: Vec<u16> = text.encode_utf16().collect();
        let wide_len = i32::try_from(wide.len())
            .map_err(|_| Error::Parse("text too long to convert".into()))?;

        // SAFETY: `wide` is valid for `wide_len` units; a null output buffer
        // with zero length asks for the required size only.
        let needed = unsafe {
            WideCharToMultiByte(
                cp,
                0,
                wide.as_ptr(),
                wide_len,
                ptr::null_mut(),
                0,
                ptr::null(),
                ptr::null_mut(),
            )
        };
        if needed <= 0 {
            // SAFETY: reads the calling thread's last error
            return Err(Error::from_status_with_context(
                unsafe { GetLastError() },
                "WideCharToMultiByte",
            ));
        }

        let mut out = vec![0u8; needed as usize];
        // SAFETY: `out` has room for exactly `needed` bytes
        let written = unsafe {
            WideCharToMultiByte(
                cp,
                0,
                wide.as_ptr(),
                wide_len,
                out.as_mut_ptr(),
                needed,
                ptr::null(),
                ptr::null_mut(),
            )
        };
        if written <= 0 {
            // SAFETY: reads the calling thread's last error
            return Err(Error::from_status_with_context(
                unsafe { GetLastError() },
                "WideCharToMultiByte",
            ));
        }
        out.truncate(written as usize);
        Ok(out)
    }

    pub(super) fn decode(bytes: &[u8], page: CodePage) -> String {
        let cp = resolve(page);
        if cp == CP_UTF8 {
            return String::from_utf8_lossy(bytes).into_owned();
        }
        let Ok(len) = i32::try_from(bytes.len()) else {
            return String::from_utf8_lossy(bytes).into_owned();
        };

        // SAFETY: `bytes` is valid for `len` bytes; null output asks for the size
        let needed =
            unsafe { MultiByteToWideChar(cp, 0, bytes.as_ptr(), len, ptr::null_mut(), 0) };
        if needed <= 0 {
            return String::from_utf8_lossy(bytes).into_owned();
        }

        let mut wide = vec![0u16; needed as usize];
        // SAFETY: `wide` has room for exactly `needed` units
        let written =
            unsafe { MultiByteToWideChar(cp, 0, bytes.as_ptr(), len, wide.as_mut_ptr(), needed) };
        if written <= 0 {
            return String::from_utf8_lossy(bytes).into_owned();
        }
        wide.truncate(written as usize);
        String::from_utf16_lossy(&wide)
    }
}

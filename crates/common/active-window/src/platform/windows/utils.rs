//! Raw Win32 queries backing [`NativePlatform`](super::NativePlatform).

use std::ffi::{OsStr, OsString, c_void};
use std::os::windows::ffi::{OsStrExt, OsStringExt};
use std::path::PathBuf;

use active_window_core::{ActiveWindowError, ActiveWindowResult};

use crate::platform::{ProcessHandle, WindowHandle};

use windows_sys::Win32::{
    Foundation::{CloseHandle, ERROR_SUCCESS, HANDLE, HWND, LPARAM},
    Graphics::Gdi::{
        BI_RGB, BITMAPINFO, BITMAPINFOHEADER, CreateCompatibleDC, DIB_RGB_COLORS, DeleteDC,
        DeleteObject, GetDIBits, HBITMAP, HDC, HGDIOBJ, SelectObject,
    },
    Storage::FileSystem::{GetFileVersionInfoSizeW, GetFileVersionInfoW, VerQueryValueW},
    Storage::Packaging::Appx::{GetPackageFamilyName, GetPackageId, GetPackagePath, PACKAGE_ID},
    System::Threading::{
        OpenProcess, PROCESS_NAME_WIN32, PROCESS_QUERY_LIMITED_INFORMATION,
        QueryFullProcessImageNameW,
    },
    UI::Shell::{ExtractIconExW, SHFILEINFOW, SHGFI_ICON, SHGFI_LARGEICON, SHGetFileInfoW},
    UI::WindowsAndMessaging::{
        DestroyIcon, EnumChildWindows, GetForegroundWindow, GetIconInfo, GetWindowTextLengthW,
        GetWindowTextW, GetWindowThreadProcessId, HICON, ICONINFO, IsWindow,
    },
};

fn wide(s: &str) -> Vec<u16> {
    OsStr::new(s).encode_wide().chain(std::iter::once(0)).collect()
}

pub(crate) fn foreground_window() -> Option<WindowHandle> {
    let hwnd = unsafe { GetForegroundWindow() };
    if hwnd.is_null() || unsafe { IsWindow(hwnd) } == 0 {
        None
    } else {
        Some(hwnd as WindowHandle)
    }
}

pub(crate) fn window_title(window: WindowHandle) -> String {
    let hwnd = window as HWND;
    let len = unsafe { GetWindowTextLengthW(hwnd) };
    if len <= 0 {
        return String::new();
    }

    let mut buffer = vec![0u16; len as usize + 1];
    let copied = unsafe { GetWindowTextW(hwnd, buffer.as_mut_ptr(), buffer.len() as i32) };
    if copied <= 0 {
        return String::new();
    }

    OsString::from_wide(&buffer[..copied as usize])
        .to_string_lossy()
        .into_owned()
}

pub(crate) fn window_process_id(window: WindowHandle) -> u32 {
    let mut process_id = 0u32;
    unsafe {
        GetWindowThreadProcessId(window as HWND, &mut process_id);
    }
    process_id
}

/// A process opened with `PROCESS_QUERY_LIMITED_INFORMATION`, closed on
/// drop.
pub(crate) struct NativeProcess {
    handle: HANDLE,
}

impl Drop for NativeProcess {
    fn drop(&mut self) {
        unsafe { CloseHandle(self.handle) };
    }
}

// HANDLE is a raw pointer; the process handle is only ever used for
// query-only calls, which are safe from any thread.
unsafe impl Send for NativeProcess {}

pub(crate) fn open_process(pid: u32) -> Option<NativeProcess> {
    let handle = unsafe { OpenProcess(PROCESS_QUERY_LIMITED_INFORMATION, 0, pid) };
    if handle.is_null() {
        None
    } else {
        Some(NativeProcess { handle })
    }
}

impl ProcessHandle for NativeProcess {
    fn executable_path(&self) -> String {
        let mut buffer = vec![0u16; 32768];
        let mut len = buffer.len() as u32;
        let ok = unsafe {
            QueryFullProcessImageNameW(
                self.handle,
                PROCESS_NAME_WIN32,
                buffer.as_mut_ptr(),
                &mut len,
            )
        };
        if ok == 0 || len == 0 {
            return String::new();
        }

        OsString::from_wide(&buffer[..len as usize])
            .to_string_lossy()
            .into_owned()
    }

    fn package_family_name(&self) -> Option<String> {
        let mut len = 0u32;
        unsafe { GetPackageFamilyName(self.handle, &mut len, std::ptr::null_mut()) };
        if len == 0 {
            // APPMODEL_ERROR_NO_PACKAGE: an ordinary process
            return None;
        }

        let mut buffer = vec![0u16; len as usize];
        let rc = unsafe { GetPackageFamilyName(self.handle, &mut len, buffer.as_mut_ptr()) };
        if rc != ERROR_SUCCESS as i32 {
            return None;
        }

        Some(
            OsString::from_wide(&buffer[..len.saturating_sub(1) as usize])
                .to_string_lossy()
                .into_owned(),
        )
    }

    fn package_install_path(&self) -> Option<PathBuf> {
        let mut id_len = 0u32;
        unsafe { GetPackageId(self.handle, &mut id_len, std::ptr::null_mut()) };
        if id_len == 0 {
            return None;
        }

        let mut id_buffer = vec![0u8; id_len as usize];
        let rc = unsafe { GetPackageId(self.handle, &mut id_len, id_buffer.as_mut_ptr()) };
        if rc != ERROR_SUCCESS as i32 {
            return None;
        }
        let package_id = id_buffer.as_ptr() as *const PACKAGE_ID;

        let mut path_len = 0u32;
        unsafe { GetPackagePath(package_id, 0, &mut path_len, std::ptr::null_mut()) };
        if path_len == 0 {
            return None;
        }

        let mut path_buffer = vec![0u16; path_len as usize];
        let rc = unsafe { GetPackagePath(package_id, 0, &mut path_len, path_buffer.as_mut_ptr()) };
        if rc != ERROR_SUCCESS as i32 {
            return None;
        }

        Some(PathBuf::from(OsString::from_wide(
            &path_buffer[..path_len.saturating_sub(1) as usize],
        )))
    }
}

pub(crate) fn child_windows(window: WindowHandle) -> Vec<WindowHandle> {
    unsafe extern "system" fn push_child(hwnd: HWND, lparam: LPARAM) -> i32 {
        let children = unsafe { &mut *(lparam as *mut Vec<WindowHandle>) };
        children.push(hwnd as WindowHandle);
        1
    }

    let mut children: Vec<WindowHandle> = Vec::new();
    unsafe {
        EnumChildWindows(
            window as HWND,
            Some(push_child),
            &mut children as *mut _ as LPARAM,
        )
    };
    children
}

/// Localized `FileDescription` from the executable's version resource,
/// selecting the first entry of the translation table and falling back to
/// en-US / Windows-1252 when the table is absent.
pub(crate) fn file_description(path: &str) -> Option<String> {
    let path_w = wide(path);

    let size = unsafe { GetFileVersionInfoSizeW(path_w.as_ptr(), std::ptr::null_mut()) };
    if size == 0 {
        return None;
    }

    let mut data = vec![0u8; size as usize];
    let ok =
        unsafe { GetFileVersionInfoW(path_w.as_ptr(), 0, size, data.as_mut_ptr() as *mut c_void) };
    if ok == 0 {
        return None;
    }

    let (mut lang, mut code_page) = (0x0409u16, 0x04E4u16);
    let mut value: *mut c_void = std::ptr::null_mut();
    let mut value_len = 0u32;

    let translation_w = wide("\\VarFileInfo\\Translation");
    let found = unsafe {
        VerQueryValueW(
            data.as_ptr() as *const c_void,
            translation_w.as_ptr(),
            &mut value,
            &mut value_len,
        )
    };
    if found != 0 && value_len >= 4 && !value.is_null() {
        let pair = unsafe { std::slice::from_raw_parts(value as *const u16, 2) };
        lang = pair[0];
        code_page = pair[1];
    }

    let query_w = wide(&format!(
        "\\StringFileInfo\\{lang:04X}{code_page:04X}\\FileDescription"
    ));
    let found = unsafe {
        VerQueryValueW(
            data.as_ptr() as *const c_void,
            query_w.as_ptr(),
            &mut value,
            &mut value_len,
        )
    };
    if found == 0 || value_len == 0 || value.is_null() {
        return None;
    }

    let chars = unsafe { std::slice::from_raw_parts(value as *const u16, value_len as usize) };
    let end = chars.iter().position(|&c| c == 0).unwrap_or(chars.len());
    let description = String::from_utf16_lossy(&chars[..end]);
    (!description.is_empty()).then_some(description)
}

struct DcGuard(HDC);

impl Drop for DcGuard {
    fn drop(&mut self) {
        if !self.0.is_null() {
            unsafe { DeleteDC(self.0) };
        }
    }
}

struct IconBitmapGuard {
    hdc: HDC,
    old_bitmap: HGDIOBJ,
    hbm_color: HBITMAP,
    hbm_mask: HBITMAP,
}

impl Drop for IconBitmapGuard {
    fn drop(&mut self) {
        unsafe {
            if !self.hdc.is_null() {
                SelectObject(self.hdc, self.old_bitmap);
            }
            if !self.hbm_color.is_null() {
                DeleteObject(self.hbm_color);
            }
            if !self.hbm_mask.is_null() {
                DeleteObject(self.hbm_mask);
            }
        }
    }
}

/// Largest icon the shell associates with the executable, rasterized to
/// 32bpp RGBA.
pub(crate) fn executable_icon(path: &str) -> ActiveWindowResult<image::RgbaImage> {
    let hicon = acquire_shell_icon(path)?;
    let result = icon_to_image(hicon);
    unsafe { DestroyIcon(hicon) };
    result
}

fn acquire_shell_icon(path: &str) -> ActiveWindowResult<HICON> {
    let path_w = wide(path);

    let mut info: SHFILEINFOW = unsafe { std::mem::zeroed() };
    let list = unsafe {
        SHGetFileInfoW(
            path_w.as_ptr(),
            0,
            &mut info,
            std::mem::size_of::<SHFILEINFOW>() as u32,
            SHGFI_ICON | SHGFI_LARGEICON,
        )
    };
    if list != 0 && !info.hIcon.is_null() {
        return Ok(info.hIcon);
    }

    let mut hicon_large: HICON = std::ptr::null_mut();
    let count = unsafe {
        ExtractIconExW(
            path_w.as_ptr(),
            0,
            &mut hicon_large,
            std::ptr::null_mut(),
            1,
        )
    };
    if count == 0 || hicon_large.is_null() {
        return Err(ActiveWindowError::platform(
            "no icon found for executable",
        ));
    }

    Ok(hicon_large)
}

fn icon_to_image(hicon: HICON) -> ActiveWindowResult<image::RgbaImage> {
    let mut icon_info: ICONINFO = unsafe { std::mem::zeroed() };
    if unsafe { GetIconInfo(hicon, &mut icon_info) } == 0 {
        return Err(ActiveWindowError::platform("failed to get icon info"));
    }

    let bitmap = if !icon_info.hbmColor.is_null() {
        icon_info.hbmColor
    } else {
        icon_info.hbmMask
    };

    let hdc = unsafe { CreateCompatibleDC(std::ptr::null_mut()) };
    if hdc.is_null() {
        unsafe {
            if !icon_info.hbmColor.is_null() {
                DeleteObject(icon_info.hbmColor);
            }
            if !icon_info.hbmMask.is_null() {
                DeleteObject(icon_info.hbmMask);
            }
        }
        return Err(ActiveWindowError::platform("failed to create DC"));
    }

    let _dc_guard = DcGuard(hdc);
    let old_bitmap = unsafe { SelectObject(hdc, bitmap) };
    let _bitmap_guard = IconBitmapGuard {
        hdc,
        old_bitmap,
        hbm_color: icon_info.hbmColor,
        hbm_mask: icon_info.hbmMask,
    };

    let mut bmi: BITMAPINFO = unsafe { std::mem::zeroed() };
    bmi.bmiHeader.biSize = std::mem::size_of::<BITMAPINFOHEADER>() as u32;

    if unsafe {
        GetDIBits(
            hdc,
            bitmap,
            0,
            0,
            std::ptr::null_mut(),
            &mut bmi,
            DIB_RGB_COLORS,
        )
    } == 0
    {
        return Err(ActiveWindowError::platform("failed to get bitmap info"));
    }

    let width = bmi.bmiHeader.biWidth as u32;
    let height = bmi.bmiHeader.biHeight.unsigned_abs();
    if width == 0 || height == 0 {
        return Err(ActiveWindowError::platform("invalid icon dimensions"));
    }

    bmi.bmiHeader.biBitCount = 32;
    bmi.bmiHeader.biCompression = BI_RGB;
    bmi.bmiHeader.biHeight = -(height as i32);

    let mut pixels = vec![0u8; (width * height) as usize * 4];
    if unsafe {
        GetDIBits(
            hdc,
            bitmap,
            0,
            height,
            pixels.as_mut_ptr() as *mut c_void,
            &mut bmi,
            DIB_RGB_COLORS,
        )
    } == 0
    {
        return Err(ActiveWindowError::platform("failed to get bitmap bits"));
    }

    // BGRA to RGBA
    for chunk in pixels.chunks_exact_mut(4) {
        chunk.swap(0, 2);
    }

    image::RgbaImage::from_raw(width, height, pixels)
        .ok_or_else(|| ActiveWindowError::platform("failed to build image from pixel data"))
}

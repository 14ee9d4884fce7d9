//! WM_SETTINGCHANGE broadcast.
//!
//! Sends the documented environment-change notification: a
//! `WM_SETTINGCHANGE` message with the lParam string `"Environment"` to
//! `HWND_BROADCAST`, using `SendMessageTimeoutW` with `SMTO_ABORTIFHUNG`
//! so an unresponsive window is skipped instead of hanging the caller.

use super::ChangeNotifier;
use windows_sys::Win32::Foundation::LPARAM;
use windows_sys::Win32::UI::WindowsAndMessaging::{
    SendMessageTimeoutW, HWND_BROADCAST, SMTO_ABORTIFHUNG, WM_SETTINGCHANGE,
};

/// [`ChangeNotifier`] broadcasting `WM_SETTINGCHANGE` to all top-level
/// windows.
pub struct SettingChangeBroadcast {
    timeout_ms: u32,
}

impl SettingChangeBroadcast {
    pub fn new(timeout_ms: u32) -> Self {
        Self { timeout_ms }
    }
}

impl ChangeNotifier for SettingChangeBroadcast {
    fn notify(&self) {
        // Null-terminated UTF-16 "Environment", the section name the
        // message convention requires for environment-variable changes.
        let section: Vec<u16> = "Environment".encode_utf16().chain(Some(0)).collect();
        let mut result: usize = 0;

        let sent = unsafe {
            SendMessageTimeoutW(
                HWND_BROADCAST,
                WM_SETTINGCHANGE,
                0,
                section.as_ptr() as LPARAM,
                SMTO_ABORTIFHUNG,
                self.timeout_ms,
                &mut result,
            )
        };

        if sent == 0 {
            // Advisory mechanism; nothing to propagate to the caller.
            tracing::warn!("environment change broadcast delivered to no recipients");
        } else {
            tracing::debug!("environment change broadcast sent");
        }
    }
}

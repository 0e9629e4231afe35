// src/process/windows.rs

//! Graceful stop on windows: `taskkill /T` without `/F` asks the whole tree
//! to close.

use std::process::Command;

pub fn send_graceful(pid: u32) {
    let _ = Command::new("taskkill")
        .args(["/PID", &pid.to_string(), "/T"])
        .status();
}

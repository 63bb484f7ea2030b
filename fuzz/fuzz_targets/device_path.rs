#![no_main]

use bootnav_core::device_path::{DevicePathBuf, length};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(len) = length(data) {
        assert!(len <= data.len());
    }
    if let Ok(path) = DevicePathBuf::from_bytes(data) {
        let _ = path.file_path();
        let _ = path.nodes().count();
    }
});

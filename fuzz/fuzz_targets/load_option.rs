#![no_main]

use bootnav_core::boot::option::LoadOption;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(option) = LoadOption::decode(data) {
        let _ = option.encode();
    }
});

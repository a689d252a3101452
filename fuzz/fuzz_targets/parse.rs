#![no_main]
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let _ = vxsymtab::analyze(data, vxsymtab::Version::V5);
    let _ = vxsymtab::analyze(data, vxsymtab::Version::V6);
});

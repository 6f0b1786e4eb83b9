#![no_main]
use face_color::ColorDatabase;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if data.len() > 4096 {
        return;
    }
    let text = String::from_utf8_lossy(data);
    let db = ColorDatabase::parse(&text);
    assert!(db.len() <= text.lines().count());
});

#![no_main]
use face_color::{color_distance, Color, TtyColorTable};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if data.len() > 64 {
        return;
    }
    let Ok(spec) = std::str::from_utf8(data) else {
        return;
    };

    if let Ok(color) = Color::parse(spec) {
        // Formatting and reparsing must land on the same 8-bit color.
        let reparsed = Color::parse(&color.to_string()).expect("formatted color reparses");
        assert_eq!(reparsed.to_rgb8(), color.to_rgb8());
        assert_eq!(color_distance(color, color), 0);
    }

    let _ = TtyColorTable::ansi16().lookup_by_name(spec);
});

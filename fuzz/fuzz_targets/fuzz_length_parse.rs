#![no_main]

use flexgrid_core::Length;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };
    let Ok(length) = text.parse::<Length>() else {
        return;
    };

    // Anything that parses must print back to a literal that parses to the
    // same value.
    let printed = length.to_string();
    let reparsed: Length = printed.parse().expect("printed length reparses");
    assert_eq!(reparsed, length, "{text:?} -> {printed:?}");
});

#![no_main]

use libfuzzer_sys::fuzz_target;
use passdb_codec::core::primitives::{Codec, HexPassword};
use passdb_codec::Value;

fuzz_target!(|data: &[u8]| {
    // Arbitrary text as password input must either be rejected or survive
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };
    if let Ok(value) = HexPassword.normalize(Value::Hex(text.to_string())) {
        if let Ok(wire) = HexPassword.encode_to_vec(&value) {
            if let Ok((_, decoded)) = HexPassword.decode(&wire) {
                assert_eq!(decoded, value);
            }
        }
    }
});

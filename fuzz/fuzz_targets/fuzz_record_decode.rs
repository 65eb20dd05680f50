#![no_main]

use libfuzzer_sys::fuzz_target;
use passdb_codec::{Record, SchemaVersion};

fuzz_target!(|data: &[u8]| {
    // Any buffer under any layout: errors are fine, panics are not.
    // Whatever decodes must re-encode to something that decodes the same.
    for version in SchemaVersion::ALL {
        if let Ok(record) = Record::decode(version.schema(), data) {
            if let Ok(bytes) = record.encode() {
                let again = Record::decode(version.schema(), &bytes);
                assert_eq!(again.ok().as_ref(), Some(&record));
            }
        }
    }
});

#![no_main]

use libfuzzer_sys::fuzz_target;
use minitmpl_engine::Template;

fuzz_target!(|data: &[u8]| {
    if let Ok(source) = std::str::from_utf8(data) {
        if let Ok(template) = Template::parse_str("fuzz-template", source) {
            let canonical = template.to_template_string();
            assert!(Template::parse_str("fuzz-canonical", &canonical).is_ok());
        }
    }
});

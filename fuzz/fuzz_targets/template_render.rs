#![no_main]

use libfuzzer_sys::fuzz_target;
use minitmpl_engine::Template;
use serde_json::json;

fuzz_target!(|data: &[u8]| {
    let source = match std::str::from_utf8(data) {
        Ok(src) => src,
        Err(_) => return,
    };

    let model = json!({
        "Name": "<fuzz>",
        "Flag": true,
        "Items": [{"Name": "a", "Flag": false}, {"Name": "b", "Flag": true}],
        "Tags": ["x", "y"],
        "Profile": {"City": "Paris"}
    });

    if let Ok(template) = Template::parse_str("fuzz-template-render", source) {
        let _ = template.render(&model);
    }
});

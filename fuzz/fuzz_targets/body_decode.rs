//! Fuzz target for Body::decode
//!
//! Any string from the service must decode without panicking:
//! - Tags that prefix other tags (`[WATCH]` vs `[WATCH_TOGETHER]` style)
//! - Markup that confuses the sanitizer (unclosed tags, entities)
//! - Multi-byte characters at tag boundaries
//!
//! Re-encoding a decoded body must decode to the same body.

#![no_main]

use libfuzzer_sys::fuzz_target;
use pollroom_core::{sanitize_markup, Body};

fuzz_target!(|data: &str| {
    let body = Body::decode(data);
    let _ = body.display_text();
    let _ = sanitize_markup(data);

    let wire = body.encode();
    assert_eq!(Body::decode(&wire), body, "re-encoding changed {data:?}");
});

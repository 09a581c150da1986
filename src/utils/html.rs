// src/utils/html.rs

use std::collections::HashSet;

/// Strips markup from admin-authored text before it is stored.
///
/// Question text and course descriptions are shown verbatim by clients, so
/// no tag is allowed. `<script>` and `<style>` lose their bodies too.
pub fn sanitize_text(input: &str) -> String {
    ammonia::Builder::empty()
        .clean_content_tags(HashSet::from(["script", "style"]))
        .clean(input)
        .to_string()
}

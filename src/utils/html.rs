// src/utils/html.rs

/// Cleans lesson HTML with ammonia's whitelist: formatting tags survive,
/// `<script>`, `<iframe>` and event-handler attributes are removed.
pub fn clean_html(input: &str) -> String {
    ammonia::clean(input)
}

//! Vision model detection.

/// Model families that accept images.
pub const VISION_MODEL_FAMILIES: &[&str] = &[
    "llava",
    "bakllava",
    "llama3.2-vision",
    "moondream",
    "minicpm-v",
    "qwen2.5vl",
];

/// Whether an installed model name (`family:tag`) belongs to a vision family.
pub fn is_vision_model(name: &str) -> bool {
    let family = base_name(name);
    VISION_MODEL_FAMILIES.iter().any(|f| family == *f)
}

/// Name without the `:tag` suffix.
pub(crate) fn base_name(name: &str) -> &str {
    name.split(':').next().unwrap_or(name)
}

/// Pick the model to plan with from the installed list.
///
/// A configured model must be installed, matched with or without its tag.
/// Otherwise the first installed vision model wins.
pub(crate) fn select_model(installed: &[String], configured: Option<&str>) -> Option<String> {
    match configured {
        Some(wanted) => installed
            .iter()
            .find(|name| name.as_str() == wanted || base_name(name) == wanted)
            .cloned(),
        None => installed.iter().find(|name| is_vision_model(name)).cloned(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_is_vision_model() {
        assert!(is_vision_model("llava"));
        assert!(is_vision_model("llava:13b"));
        assert!(is_vision_model("llama3.2-vision:11b"));
        assert!(!is_vision_model("llama3:8b"));
        assert!(!is_vision_model("llava-phi3-not-listed"));
    }

    #[test]
    fn test_select_first_vision_model() {
        let installed = names(&["llama3:8b", "moondream:latest", "llava:latest"]);
        assert_eq!(select_model(&installed, None).as_deref(), Some("moondream:latest"));
    }

    #[test]
    fn test_select_none_without_vision_model() {
        let installed = names(&["llama3:8b", "mistral:7b"]);
        assert!(select_model(&installed, None).is_none());
    }

    #[test]
    fn test_select_configured_model() {
        let installed = names(&["llava:latest", "bakllava:latest"]);
        assert_eq!(
            select_model(&installed, Some("bakllava")).as_deref(),
            Some("bakllava:latest")
        );
        assert_eq!(
            select_model(&installed, Some("llava:latest")).as_deref(),
            Some("llava:latest")
        );
        assert!(select_model(&installed, Some("llava:34b")).is_none());
    }
}

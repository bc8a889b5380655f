/// Fixed transformation prompt sent with every upload.
pub const GIGAFY: &str = include_str!("../data/prompts/gigafy.txt");

pub const ASPECT_RATIO: &str = "1:1";
pub const SAFETY_FILTER_LEVEL: &str = "block_only_high";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_is_non_empty() {
        assert!(!GIGAFY.trim().is_empty());
    }

    #[test]
    fn test_prompt_is_single_line() {
        assert!(!GIGAFY.contains('\n'));
        assert!(GIGAFY.contains("GigaChad"));
    }
}

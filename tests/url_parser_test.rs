//! Tests for file URL/ID extraction functionality.

use drive_handover::url_parser::{extract_file_id, file_view_link};

mod extract_file_url {
    use super::*;

    #[test]
    fn basic_file_url() {
        let url = "https://drive.google.com/file/d/1abc123XYZ-_def456/view";
        assert_eq!(extract_file_id(url).unwrap(), "1abc123XYZ-_def456");
    }

    #[test]
    fn file_url_without_view_suffix() {
        let url = "https://drive.google.com/file/d/1abc123XYZ";
        assert_eq!(extract_file_id(url).unwrap(), "1abc123XYZ");
    }

    #[test]
    fn file_url_with_sharing_params() {
        let url = "https://drive.google.com/file/d/1abc123XYZ/view?usp=sharing";
        assert_eq!(extract_file_id(url).unwrap(), "1abc123XYZ");
    }

    #[test]
    fn file_url_http() {
        let url = "http://drive.google.com/file/d/1abc123XYZ/view";
        assert_eq!(extract_file_id(url).unwrap(), "1abc123XYZ");
    }
}

mod extract_open_url {
    use super::*;

    #[test]
    fn basic_open_url() {
        let url = "https://drive.google.com/open?id=1abc123XYZ";
        assert_eq!(extract_file_id(url).unwrap(), "1abc123XYZ");
    }
}

mod extract_raw_id {
    use super::*;

    #[test]
    fn plain_id() {
        assert_eq!(extract_file_id("1abc123XYZ").unwrap(), "1abc123XYZ");
    }

    #[test]
    fn id_with_special_chars() {
        assert_eq!(extract_file_id("abc-123_XYZ").unwrap(), "abc-123_XYZ");
    }

    #[test]
    fn id_with_surrounding_whitespace() {
        assert_eq!(extract_file_id("  1abc123XYZ  ").unwrap(), "1abc123XYZ");
    }
}

mod invalid_input {
    use super::*;

    #[test]
    fn foreign_url() {
        assert!(extract_file_id("https://example.com/file/d/1abc123").is_err());
    }

    #[test]
    fn folder_url_is_not_a_file() {
        assert!(extract_file_id("https://drive.google.com/drive/folders/1abc123").is_err());
    }

    #[test]
    fn empty_and_blank() {
        assert!(extract_file_id("").is_err());
        assert!(extract_file_id("   ").is_err());
    }

    #[test]
    fn id_with_invalid_chars() {
        assert!(extract_file_id("abc 123").is_err());
        assert!(extract_file_id("abc/123").is_err());
    }
}

mod view_link {
    use super::*;

    #[test]
    fn round_trips_through_extract() {
        let link = file_view_link("1abc123XYZ");
        assert_eq!(extract_file_id(&link).unwrap(), "1abc123XYZ");
    }
}

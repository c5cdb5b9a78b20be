//! Tests for remote path resolution.

use sp_drive::path::{encode, extension, split};

mod split_paths {
    use super::*;

    #[test]
    fn test_nested_path() {
        assert_eq!(split("reports/2026/summary.csv"), ("reports/2026", "summary.csv"));
    }

    #[test]
    fn test_two_segments() {
        assert_eq!(split("reports/out.csv"), ("reports", "out.csv"));
    }

    #[test]
    fn test_root_leaf_has_empty_parent() {
        assert_eq!(split("out.csv"), ("", "out.csv"));
    }

    #[test]
    fn test_leading_separator_ignored() {
        assert_eq!(split("/reports/out.csv"), ("reports", "out.csv"));
    }

    #[test]
    fn test_trailing_separator_ignored() {
        assert_eq!(split("reports/out.csv/"), ("reports", "out.csv"));
    }

    #[test]
    fn test_folder_style_path() {
        assert_eq!(split("a/b/c"), ("a/b", "c"));
    }

    #[test]
    fn test_parent_joins_all_but_last_segment() {
        let path = "one/two/three/four/five.rds";
        let (parent, leaf) = split(path);
        assert_eq!(parent, "one/two/three/four");
        assert_eq!(leaf, "five.rds");
        assert_eq!(format!("{}/{}", parent, leaf), path);
    }
}

mod extensions {
    use super::*;

    #[test]
    fn test_simple_extension() {
        assert_eq!(extension("reports/out.csv"), Some("csv"));
    }

    #[test]
    fn test_extension_keeps_case() {
        assert_eq!(extension("env.RData"), Some("RData"));
    }

    #[test]
    fn test_only_leaf_extension_counts() {
        assert_eq!(extension("archive.d/readme"), None);
    }

    #[test]
    fn test_no_extension() {
        assert_eq!(extension("reports/out"), None);
        assert_eq!(extension(".hidden"), None);
    }
}

mod encoding {
    use super::*;

    #[test]
    fn test_plain_paths_unchanged() {
        assert_eq!(encode("reports/out.csv"), "reports/out.csv");
    }

    #[test]
    fn test_spaces_encoded() {
        assert_eq!(encode("Shared Documents/q1 report.csv"), "Shared%20Documents/q1%20report.csv");
    }

    #[test]
    fn test_separators_preserved() {
        assert_eq!(encode("/a/b/c.csv/"), "a/b/c.csv");
    }
}

use chrono::NaiveDate;
use homeserve::core::commands::{Command, DateDirection, ListOrder};
use homeserve::core::ServeError;

#[test]
fn test_parse_dirlist_alphabetical() {
    let command = Command::parse("dirlist -a").unwrap();
    assert_eq!(
        command,
        Command::ListDir {
            order: ListOrder::Alphabetical
        }
    );
}

#[test]
fn test_parse_dirlist_recency() {
    let command = Command::parse("dirlist -t").unwrap();
    assert_eq!(
        command,
        Command::ListDir {
            order: ListOrder::RecencyDescending
        }
    );
}

#[test]
fn test_parse_quit() {
    assert_eq!(Command::parse("quitc").unwrap(), Command::Quit);
}

#[test]
fn test_parse_file_info() {
    let command = Command::parse("w24fn report.pdf").unwrap();
    assert_eq!(
        command,
        Command::FileInfo {
            name: "report.pdf".to_string()
        }
    );
}

#[test]
fn test_file_info_without_name_is_specific_error() {
    let err = Command::parse("w24fn").unwrap_err();
    assert!(matches!(err, ServeError::MissingFilename));
    let err = Command::parse("w24fn   ").unwrap_err();
    assert!(matches!(err, ServeError::MissingFilename));
}

#[test]
fn test_parse_extensions() {
    let command = Command::parse("w24ft pdf txt c").unwrap();
    assert_eq!(
        command,
        Command::PackByExtension {
            extensions: vec!["pdf".to_string(), "txt".to_string(), "c".to_string()]
        }
    );
}

#[test]
fn test_duplicate_extension_rejected() {
    let err = Command::parse("w24ft pdf pdf").unwrap_err();
    assert!(matches!(err, ServeError::DuplicateExtension(ext) if ext == "pdf"));
}

#[test]
fn test_too_many_extensions_rejected() {
    let err = Command::parse("w24ft a b c d").unwrap_err();
    assert!(matches!(err, ServeError::TooManyExtensions));
}

#[test]
fn test_no_extensions_rejected() {
    let err = Command::parse("w24ft").unwrap_err();
    assert!(matches!(err, ServeError::NoExtensions));
}

#[test]
fn test_parse_size_range() {
    let command = Command::parse("w24fz 10 20").unwrap();
    assert_eq!(command, Command::PackBySize { min: 10, max: 20 });
}

#[test]
fn test_inverted_size_range_rejected() {
    let err = Command::parse("w24fz 100 50").unwrap_err();
    assert!(matches!(err, ServeError::InvalidSizeRange));
}

#[test]
fn test_equal_size_bounds_rejected() {
    let err = Command::parse("w24fz 7 7").unwrap_err();
    assert!(matches!(err, ServeError::InvalidSizeRange));
}

#[test]
fn test_non_integer_sizes_rejected() {
    for line in ["w24fz ten 20", "w24fz 10", "w24fz 10 20 30", "w24fz"] {
        let err = Command::parse(line).unwrap_err();
        assert!(matches!(err, ServeError::InvalidSizeRange), "line: {line}");
    }
}

#[test]
fn test_parse_date_before_and_after() {
    let cutoff = NaiveDate::from_ymd_opt(2024, 3, 15).unwrap();
    assert_eq!(
        Command::parse("w24fdb 2024-03-15").unwrap(),
        Command::PackByDate {
            cutoff,
            direction: DateDirection::Before
        }
    );
    assert_eq!(
        Command::parse("w24fda 2024-03-15").unwrap(),
        Command::PackByDate {
            cutoff,
            direction: DateDirection::After
        }
    );
}

#[test]
fn test_date_argument_count_rejected() {
    for line in ["w24fdb", "w24fdb 2024-03-15 2024-03-16", "w24fda"] {
        let err = Command::parse(line).unwrap_err();
        assert!(matches!(err, ServeError::TooManyArguments), "line: {line}");
    }
}

#[test]
fn test_unparsable_date_rejected() {
    let err = Command::parse("w24fdb 15-03-2024").unwrap_err();
    assert!(matches!(err, ServeError::InvalidDateFormat(_)));
    let err = Command::parse("w24fda 2024-13-40").unwrap_err();
    assert!(matches!(err, ServeError::InvalidDateFormat(_)));
}

#[test]
fn test_unknown_lines_become_invalid_not_errors() {
    for line in ["", "hello", "dirlist", "dirlist -x", "w24f pdf", "quitc now"] {
        let command = Command::parse(line).unwrap();
        assert!(
            matches!(command, Command::Invalid { .. }),
            "line: {line:?}"
        );
    }
}

#[test]
fn test_recognized_prefix_with_bad_suffix_never_falls_through() {
    // A malformed w24ft line must produce the w24ft-specific error, not the
    // generic unsupported-operation path.
    let err = Command::parse("w24ft a a").unwrap_err();
    assert!(matches!(err, ServeError::DuplicateExtension(_)));
    assert_eq!(err.to_string(), "Duplicate extension 'a'");
}

#[test]
fn test_trailing_whitespace_tolerated() {
    assert_eq!(Command::parse("quitc \r").unwrap(), Command::Quit);
    assert_eq!(
        Command::parse("dirlist -a  ").unwrap(),
        Command::ListDir {
            order: ListOrder::Alphabetical
        }
    );
}

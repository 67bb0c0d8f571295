// ═══════════════════════════════════════════════════════════════════
// Error Tests: CoreError variants, Display, classification, From impls
// ═══════════════════════════════════════════════════════════════════

use holdings_lens_core::errors::{
    CoreError, ASSISTANT_UNAVAILABLE_MESSAGE, PROCESSING_FAILED_MESSAGE,
};

// ── Display formatting ──────────────────────────────────────────────

mod display {
    use super::*;

    #[test]
    fn missing_single_column() {
        let err = CoreError::MissingColumns(vec!["avg cost".into()]);
        assert_eq!(err.to_string(), "Missing required columns: avg cost");
    }

    #[test]
    fn missing_several_columns() {
        let err = CoreError::MissingColumns(vec!["instrument".into(), "ltp".into()]);
        assert_eq!(err.to_string(), "Missing required columns: instrument, ltp");
    }

    #[test]
    fn data_type() {
        let err = CoreError::DataType {
            column: "qty".into(),
            row: 3,
            value: "ten".into(),
        };
        assert_eq!(
            err.to_string(),
            "Column 'qty' has non-numeric value 'ten' at row 3"
        );
    }

    #[test]
    fn empty_instrument() {
        let err = CoreError::EmptyInstrument { row: 7 };
        assert_eq!(err.to_string(), "Instrument name is empty at row 7");
    }

    #[test]
    fn invalid_file_type() {
        let err = CoreError::InvalidFileType("holdings.xlsx".into());
        assert_eq!(
            err.to_string(),
            "Invalid file type. Please upload a CSV file."
        );
    }

    #[test]
    fn file_too_large() {
        let err = CoreError::FileTooLarge { size: 20, limit: 10 };
        assert_eq!(err.to_string(), "File of 20 bytes exceeds the 10 byte limit");
    }

    #[test]
    fn api_error() {
        let err = CoreError::Api {
            provider: "Groq".into(),
            message: "HTTP 429: rate limited".into(),
        };
        assert_eq!(err.to_string(), "API error (Groq): HTTP 429: rate limited");
    }

    #[test]
    fn validation_error_is_bare_message() {
        let err = CoreError::ValidationError("Message is required".into());
        assert_eq!(err.to_string(), "Message is required");
    }
}

// ── Classification ──────────────────────────────────────────────────

mod classification {
    use super::*;

    fn data_type_error() -> CoreError {
        CoreError::DataType {
            column: "ltp".into(),
            row: 1,
            value: "--".into(),
        }
    }

    #[test]
    fn input_errors_are_client_errors() {
        assert!(CoreError::MissingColumns(vec!["qty".into()]).is_client_error());
        assert!(data_type_error().is_client_error());
        assert!(CoreError::EmptyInstrument { row: 1 }.is_client_error());
        assert!(CoreError::NoFile.is_client_error());
        assert!(CoreError::InvalidFileType("a.txt".into()).is_client_error());
    }

    #[test]
    fn structural_failures_are_not_client_errors() {
        assert!(!CoreError::Malformed("bad".into()).is_client_error());
        assert!(!CoreError::Encoding("bad".into()).is_client_error());
        assert!(!CoreError::EmptyFile.is_client_error());
        assert!(!CoreError::Network("down".into()).is_client_error());
    }

    #[test]
    fn status_codes() {
        assert_eq!(CoreError::MissingColumns(vec!["qty".into()]).status_code(), 400);
        assert_eq!(data_type_error().status_code(), 400);
        assert_eq!(CoreError::NoFilename.status_code(), 400);
        assert_eq!(CoreError::FileTooLarge { size: 2, limit: 1 }.status_code(), 413);
        assert_eq!(CoreError::Malformed("x".into()).status_code(), 500);
        assert_eq!(CoreError::EmptyFile.status_code(), 500);
        assert_eq!(CoreError::MissingApiKey.status_code(), 502);
        assert_eq!(CoreError::Network("x".into()).status_code(), 502);
    }
}

// ── Caller-facing messages ──────────────────────────────────────────

mod user_message {
    use super::*;

    #[test]
    fn schema_errors_pass_through() {
        let err = CoreError::MissingColumns(vec!["avg cost".into()]);
        assert_eq!(err.user_message(), "Missing required columns: avg cost");
    }

    #[test]
    fn data_type_detail_stays_internal() {
        let err = CoreError::DataType {
            column: "qty".into(),
            row: 2,
            value: "secret".into(),
        };
        assert_eq!(err.user_message(), PROCESSING_FAILED_MESSAGE);
        assert!(!err.user_message().contains("secret"));
    }

    #[test]
    fn malformed_detail_stays_internal() {
        let err = CoreError::Malformed("found record with 3 fields, expected 4".into());
        assert_eq!(err.user_message(), PROCESSING_FAILED_MESSAGE);
    }

    #[test]
    fn upload_validation_passes_through() {
        assert_eq!(CoreError::NoFile.user_message(), "No file uploaded");
        assert_eq!(CoreError::NoFilename.user_message(), "No selected file");
    }

    #[test]
    fn completion_failures_are_generic() {
        let err = CoreError::Api {
            provider: "Groq".into(),
            message: "invalid key gsk_live_123".into(),
        };
        assert_eq!(err.user_message(), ASSISTANT_UNAVAILABLE_MESSAGE);
        assert_eq!(CoreError::MissingApiKey.user_message(), ASSISTANT_UNAVAILABLE_MESSAGE);
    }
}

// ── From conversions ────────────────────────────────────────────────

mod conversions {
    use super::*;

    #[test]
    fn from_utf8_error() {
        let bytes = [0x66, 0x6f, 0xff];
        let utf8_err = std::str::from_utf8(&bytes).unwrap_err();
        let err: CoreError = utf8_err.into();
        assert!(matches!(err, CoreError::Encoding(_)));
    }

    #[test]
    fn from_serde_json_error() {
        let json_err = serde_json::from_str::<serde_json::Value>("{not json").unwrap_err();
        let err: CoreError = json_err.into();
        assert!(matches!(err, CoreError::Serialization(_)));
    }

    #[test]
    fn from_csv_error_is_malformed() {
        let data = "a,b\n1,2,3\n";
        let mut reader = csv::ReaderBuilder::new().from_reader(data.as_bytes());
        let csv_err = reader.records().find_map(Result::err).unwrap();
        let err: CoreError = csv_err.into();
        assert!(matches!(err, CoreError::Malformed(_)));
    }
}

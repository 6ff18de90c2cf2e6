use std::io::Write;

use dcash_config::{ConfirmationPolicy, DcashConfig};

#[test]
fn test_load_from_partial_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(
        file,
        r#"
[solana]
program_id = "11111111111111111111111111111111"
mxe_account = "SysvarC1ock11111111111111111111111111111111"

[polling]
optimistic_after = 6
"#
    )
    .unwrap();

    let config = DcashConfig::load_from(file.path()).unwrap();
    assert_eq!(
        config.mxe_account().unwrap().unwrap().to_string(),
        "SysvarC1ock11111111111111111111111111111111"
    );
    assert_eq!(config.polling.optimistic_after, 6);
    assert_eq!(config.polling.policy, ConfirmationPolicy::Verified);
    assert_eq!(config.transfer.decimals, 6);
}

#[test]
fn test_load_from_missing_file() {
    let dir = tempfile::tempdir().unwrap();
    let err = DcashConfig::load_from(&dir.path().join("absent.toml")).unwrap_err();
    assert!(err.to_string().contains("Failed to read config file"));
}

#[test]
fn test_load_from_malformed_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "[polling]\ninterval_ms = \"soon\"").unwrap();
    let err = DcashConfig::load_from(file.path()).unwrap_err();
    assert!(err.to_string().contains("Failed to parse config file"));
}

use std::io::Write;

use serde_json::json;
use tempfile::{NamedTempFile, TempDir};
use valar::{Error, Valar};

fn config_file(contents: &str) -> NamedTempFile {
   let mut file = NamedTempFile::new().expect("Failed to create temp file");
   file.write_all(contents.as_bytes()).unwrap();
   file
}

#[tokio::test]
async fn test_new_handle_is_closed() {
   let file = config_file(r#"{"database": "valar"}"#);
   let valar = Valar::new(Some(file.path())).unwrap();

   assert_eq!(valar.config_path(), file.path());
   assert!(!valar.is_open().await);
   assert!(matches!(valar.resolver().await, Err(Error::NotConnected)));
   assert!(matches!(valar.database().await, Err(Error::NotConnected)));

   // Closing a closed handle is fine
   valar.close().await.unwrap();
}

#[tokio::test]
async fn test_open_with_invalid_config() {
   let file = config_file(r#"{"host": "localhost"}"#);
   let valar = Valar::new(Some(file.path())).unwrap();

   let err = valar.open().await.unwrap_err();
   assert_eq!(err.error_code(), "INVALID_CONFIG");
   assert!(err.to_string().contains("database"));
   assert!(!valar.is_open().await);
}

#[tokio::test]
async fn test_open_with_missing_config() {
   let dir = TempDir::new().expect("Failed to create temp directory");
   let valar = Valar::new(Some(dir.path().join("gone.json").as_path())).unwrap();

   let err = valar.open().await.unwrap_err();
   assert_eq!(err.error_code(), "IO_ERROR");

   let err = valar.reconnect().await.unwrap_err();
   assert_eq!(err.error_code(), "IO_ERROR");
}

#[tokio::test]
async fn test_errors_serialize_as_code_and_message() {
   let err = Error::NotConnected;
   assert_eq!(
      serde_json::to_value(&err).unwrap(),
      json!({"code": "NOT_CONNECTED", "message": "not connected to Valar; call open() first"})
   );
}

//! File processing logic for upgrade-pythoncapi

use anyhow::{anyhow, Context, Result};
use std::path::Path;

use pycapi_rules::{PatchOutcome, Patcher};

/// How the bytes of a file were turned into text
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Encoding {
    Utf8,
    /// One byte per character, used when the file is not valid UTF-8 so
    /// that any byte sequence survives a read/write cycle untouched
    Latin1,
}

/// Decode file content, falling back to Latin-1 for invalid UTF-8
pub fn decode(bytes: Vec<u8>) -> (String, Encoding) {
    match String::from_utf8(bytes) {
        Ok(text) => (text, Encoding::Utf8),
        Err(err) => {
            let text = err.as_bytes().iter().map(|&b| char::from(b)).collect();
            (text, Encoding::Latin1)
        }
    }
}

/// Encode text back the way it was decoded
pub fn encode(text: &str, encoding: Encoding) -> Result<Vec<u8>> {
    match encoding {
        Encoding::Utf8 => Ok(text.as_bytes().to_vec()),
        Encoding::Latin1 => text
            .chars()
            .map(|c| {
                u8::try_from(c)
                    .map_err(|_| anyhow!("Character {:?} cannot be written back as Latin-1", c))
            })
            .collect(),
    }
}

/// Result of processing a single file
pub struct ProcessResult {
    /// Original source text
    pub old_source: String,
    pub encoding: Encoding,
    pub outcome: PatchOutcome,
}

impl ProcessResult {
    pub fn is_changed(&self) -> bool {
        self.outcome.text != self.old_source
    }

    /// Patched text in the encoding of the original file
    pub fn new_bytes(&self) -> Result<Vec<u8>> {
        encode(&self.outcome.text, self.encoding)
    }
}

/// Read a single C file and run the selected rules on it
pub fn process_file(path: &Path, patcher: &Patcher<'_>) -> Result<ProcessResult> {
    let bytes =
        std::fs::read(path).with_context(|| format!("Failed to read file: {}", path.display()))?;

    let (old_source, encoding) = decode(bytes);
    if encoding == Encoding::Latin1 {
        tracing::debug!(path = %path.display(), "not valid UTF-8, reading as Latin-1");
    }

    let outcome = patcher
        .patch(&old_source)
        .with_context(|| format!("Failed to patch file: {}", path.display()))?;
    Ok(ProcessResult {
        old_source,
        encoding,
        outcome,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pycapi_rules::{PatchOptions, RuleRegistry};
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_decode_utf8() {
        let (text, encoding) = decode("é = obj->ob_type;".as_bytes().to_vec());
        assert_eq!(text, "é = obj->ob_type;");
        assert_eq!(encoding, Encoding::Utf8);
    }

    #[test]
    fn test_latin1_round_trip() {
        let bytes = b"/* caf\xe9 \xff */ int x;".to_vec();
        let (text, encoding) = decode(bytes.clone());
        assert_eq!(encoding, Encoding::Latin1);
        assert_eq!(text.chars().count(), bytes.len());
        assert_eq!(encode(&text, encoding).unwrap(), bytes);
    }

    #[test]
    fn test_latin1_rejects_wide_chars() {
        assert!(encode("\u{263a}", Encoding::Latin1).is_err());
        assert!(encode("\u{263a}", Encoding::Utf8).is_ok());
    }

    #[test]
    fn test_process_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("mod.c");
        fs::write(&path, b"/* \xe9 */\nreturn obj->ob_type;\n").unwrap();

        let registry = RuleRegistry::new().unwrap();
        let patcher = Patcher::new(registry.select("all").unwrap(), PatchOptions::default());
        let result = process_file(&path, &patcher).unwrap();

        assert!(result.is_changed());
        assert_eq!(result.outcome.applied, vec!["Py_TYPE"]);
        assert_eq!(
            result.new_bytes().unwrap(),
            b"/* \xe9 */\nreturn Py_TYPE(obj);\n".to_vec()
        );
    }

    #[test]
    fn test_process_missing_file() {
        let temp = TempDir::new().unwrap();
        let registry = RuleRegistry::new().unwrap();
        let patcher = Patcher::new(registry.select("all").unwrap(), PatchOptions::default());

        let err = process_file(&temp.path().join("gone.c"), &patcher)
            .err()
            .unwrap();
        assert!(err.to_string().starts_with("Failed to read file"));
    }
}

//! Font Payload Decoder: embedded `data:font/...;base64,` URIs to files.
use base64::Engine;
use inkwell_common::{InkwellError, Result};
use inkwell_config::UnrecognizedSourcePolicy;
use regex::Regex;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

/// `url("data:font/<ext>;charset=utf-8;base64,<payload>")`, anywhere in the declaration.
fn font_data_uri() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r#"url\("data:font/([A-Za-z0-9_]+);charset=utf-8;base64,(.*?)"\)"#)
            .expect("font data URI pattern is valid")
    })
}

/// A decoded font, held only until it is written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedFontAsset {
    /// Position of the source among the page's matching declarations.
    pub index: usize,
    pub extension: String,
    pub bytes: Vec<u8>,
}

impl DecodedFontAsset {
    pub fn file_name(&self) -> String {
        format!("font_{}.{}", self.index, self.extension)
    }
}

/// What was written for one declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedFontAsset {
    pub index: usize,
    pub extension: String,
    pub path: PathBuf,
    pub len: usize,
}

/// Match one `src` declaration against the embedded-font grammar and decode its payload.
pub fn parse_font_source(index: usize, declaration: &str) -> Result<DecodedFontAsset> {
    let caps = font_data_uri().captures(declaration).ok_or_else(|| {
        InkwellError::UnrecognizedFontSource {
            index,
            declaration: declaration.to_string(),
        }
    })?;

    let extension = caps[1].to_string();
    let bytes = base64::engine::general_purpose::STANDARD
        .decode(&caps[2])
        .map_err(|source| InkwellError::InvalidFontPayload { index, source })?;

    Ok(DecodedFontAsset {
        index,
        extension,
        bytes,
    })
}

/// Decode every declaration and write each one to `output_dir/font_<i>.<ext>`.
///
/// Files are written as they are decoded, so a failure leaves earlier files in place.
/// Under [`UnrecognizedSourcePolicy::Stop`] the first declaration that does not decode
/// ends the batch; under [`UnrecognizedSourcePolicy::Skip`] it is logged and passed over.
/// Existing files with the same name are replaced.
///
/// `cancel` is checked before each source, never during a write, so an interrupted
/// batch leaves only complete files behind.
pub async fn decode_and_persist(
    sources: &[String],
    output_dir: &Path,
    policy: UnrecognizedSourcePolicy,
    cancel: &CancellationToken,
) -> Result<Vec<PersistedFontAsset>> {
    let mut written = Vec::with_capacity(sources.len());

    for (index, declaration) in sources.iter().enumerate() {
        if cancel.is_cancelled() {
            info!(target: "decoder", index, written = written.len(), "font batch interrupted");
            return Err(InkwellError::Cancelled);
        }

        let asset = match parse_font_source(index, declaration) {
            Ok(asset) => asset,
            Err(
                err @ (InkwellError::UnrecognizedFontSource { .. }
                | InkwellError::InvalidFontPayload { .. }),
            ) if policy == UnrecognizedSourcePolicy::Skip => {
                warn!(target: "decoder", index, error = %err, "skipping font source");
                continue;
            }
            Err(err) => return Err(err),
        };

        written.push(persist(asset, output_dir).await?);
    }

    Ok(written)
}

async fn persist(asset: DecodedFontAsset, output_dir: &Path) -> Result<PersistedFontAsset> {
    tokio::fs::create_dir_all(output_dir)
        .await
        .map_err(|source| InkwellError::Io {
            path: output_dir.to_path_buf(),
            source,
        })?;

    let path = output_dir.join(asset.file_name());
    tokio::fs::write(&path, &asset.bytes)
        .await
        .map_err(|source| InkwellError::Io {
            path: path.clone(),
            source,
        })?;

    info!(target: "decoder", path = %path.display(), bytes = asset.bytes.len(), "font saved");
    Ok(PersistedFontAsset {
        index: asset.index,
        extension: asset.extension,
        path,
        len: asset.bytes.len(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn embedded(ext: &str, payload: &str) -> String {
        format!(r#"url("data:font/{ext};charset=utf-8;base64,{payload}") format("{ext}")"#)
    }

    #[test]
    fn decodes_payload_and_extension() {
        let asset = parse_font_source(0, &embedded("woff2", "d09GMgABAAA=")).unwrap();
        assert_eq!(asset.extension, "woff2");
        assert_eq!(asset.bytes, b"wOF2\x00\x01\x00\x00");
        assert_eq!(asset.file_name(), "font_0.woff2");
    }

    #[test]
    fn empty_payload_is_an_empty_file() {
        let asset = parse_font_source(3, &embedded("ttf", "")).unwrap();
        assert!(asset.bytes.is_empty());
        assert_eq!(asset.file_name(), "font_3.ttf");
    }

    #[test]
    fn finds_data_uri_among_other_sources() {
        let declaration = format!(
            r#"local("Foo"), {}, url("/fonts/foo.woff") format("woff")"#,
            embedded("woff", "AAEC")
        );
        let asset = parse_font_source(1, &declaration).unwrap();
        assert_eq!(asset.extension, "woff");
        assert_eq!(asset.bytes, vec![0, 1, 2]);
    }

    #[test]
    fn remote_url_is_unrecognized() {
        let declaration = r#"url("https://cdn.example.com/f.woff2") format("woff2")"#;
        match parse_font_source(4, declaration) {
            Err(InkwellError::UnrecognizedFontSource { index, declaration: d }) => {
                assert_eq!(index, 4);
                assert_eq!(d, declaration);
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn other_charset_is_unrecognized() {
        let declaration = r#"url("data:font/woff2;base64,AAEC")"#;
        assert!(matches!(
            parse_font_source(0, declaration),
            Err(InkwellError::UnrecognizedFontSource { .. })
        ));
    }

    #[test]
    fn extension_must_be_word_characters() {
        let declaration = r#"url("data:font/x-woff;charset=utf-8;base64,AAEC")"#;
        assert!(matches!(
            parse_font_source(0, declaration),
            Err(InkwellError::UnrecognizedFontSource { .. })
        ));
    }

    #[test]
    fn corrupt_payload_is_reported() {
        let declaration = embedded("woff2", "not*base64");
        assert!(matches!(
            parse_font_source(2, &declaration),
            Err(InkwellError::InvalidFontPayload { index: 2, .. })
        ));
    }

    #[tokio::test]
    async fn writes_each_source_under_its_index() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("fonts").join("nested");
        let sources = vec![embedded("woff2", "AAEC"), embedded("ttf", "AwQF")];

        let written = decode_and_persist(
            &sources,
            &out,
            UnrecognizedSourcePolicy::Stop,
            &CancellationToken::new(),
        )
        .await
        .unwrap();

        assert_eq!(written.len(), 2);
        assert_eq!(written[0].path, out.join("font_0.woff2"));
        assert_eq!(written[1].path, out.join("font_1.ttf"));
        assert_eq!(std::fs::read(out.join("font_0.woff2")).unwrap(), vec![0, 1, 2]);
        assert_eq!(std::fs::read(out.join("font_1.ttf")).unwrap(), vec![3, 4, 5]);
    }

    #[tokio::test]
    async fn stop_policy_keeps_files_written_before_the_failure() {
        let dir = tempfile::tempdir().unwrap();
        let sources = vec![
            embedded("woff2", "AAEC"),
            r#"url("/remote.woff2")"#.to_string(),
            embedded("woff", "AwQF"),
        ];

        let err = decode_and_persist(
            &sources,
            dir.path(),
            UnrecognizedSourcePolicy::Stop,
            &CancellationToken::new(),
        )
        .await
        .unwrap_err();

        assert!(matches!(
            err,
            InkwellError::UnrecognizedFontSource { index: 1, .. }
        ));
        assert!(dir.path().join("font_0.woff2").exists());
        assert!(!dir.path().join("font_2.woff").exists());
    }

    #[tokio::test]
    async fn skip_policy_continues_with_original_indices() {
        let dir = tempfile::tempdir().unwrap();
        let sources = vec![
            r#"url("/remote.woff2")"#.to_string(),
            embedded("woff", "AwQF"),
        ];

        let written = decode_and_persist(
            &sources,
            dir.path(),
            UnrecognizedSourcePolicy::Skip,
            &CancellationToken::new(),
        )
        .await
        .unwrap();

        assert_eq!(written.len(), 1);
        assert_eq!(written[0].index, 1);
        assert!(dir.path().join("font_1.woff").exists());
        assert!(!dir.path().join("font_0.woff2").exists());
    }

    #[tokio::test]
    async fn unmatched_first_source_creates_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("fonts");
        let sources = vec!["local(Foo)".to_string()];

        let result = decode_and_persist(
            &sources,
            &out,
            UnrecognizedSourcePolicy::Stop,
            &CancellationToken::new(),
        )
        .await;

        assert!(result.is_err());
        assert!(!out.exists());
    }

    #[tokio::test]
    async fn cancelled_batch_writes_nothing_further() {
        let dir = tempfile::tempdir().unwrap();
        let sources = vec![embedded("woff2", "AAEC"), embedded("ttf", "AwQF")];
        let cancel = CancellationToken::new();
        cancel.cancel();

        let err = decode_and_persist(&sources, dir.path(), UnrecognizedSourcePolicy::Stop, &cancel)
            .await
            .unwrap_err();

        assert!(matches!(err, InkwellError::Cancelled));
        assert!(!dir.path().join("font_0.woff2").exists());
    }
}

//! Command handlers shared by the binary and its tests.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{bail, Context, Result};
use serde::Serialize;

use telebirr_receipt::{
    parse_from_html, FetchConfig, FieldKey, Fields, Mismatch, ReceiptFetcher, ReceiptSource,
    Verifier, LABEL_TABLE,
};

/// Where the receipt page comes from.
#[derive(Debug, Clone)]
pub enum Input {
    Remote(ReceiptSource),
    File(PathBuf),
}

impl Input {
    /// Build from CLI options. A local file takes precedence over remote
    /// sources; a receipt number takes precedence over a URL.
    pub fn from_options(
        receipt_no: Option<&str>,
        url: Option<&str>,
        html: Option<&Path>,
    ) -> Result<Self> {
        if let Some(path) = html {
            return Ok(Input::File(path.to_path_buf()));
        }
        let source = ReceiptSource::from_parts(receipt_no, url)
            .context("pass --receipt-no, --url or --html")?;
        Ok(Input::Remote(source))
    }
}

/// Fetcher options collected from flags and environment.
#[derive(Debug, Clone)]
pub struct FetchOptions {
    pub base_url: String,
    pub insecure: bool,
    pub timeout_secs: Option<u64>,
}

impl FetchOptions {
    pub fn fetcher(&self) -> Result<ReceiptFetcher> {
        let config = FetchConfig {
            base_url: self.base_url.clone(),
            accept_invalid_certs: self.insecure,
            timeout: self.timeout_secs.map(Duration::from_secs),
            ..FetchConfig::default()
        };
        ReceiptFetcher::new(config).context("failed to build HTTP client")
    }
}

/// Load the receipt page and extract its fields.
pub async fn load_fields(input: &Input, options: &FetchOptions) -> Result<Fields> {
    let html = match input {
        Input::File(path) => tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("cannot read {}", path.display()))?,
        Input::Remote(source) => options
            .fetcher()?
            .fetch(source)
            .await
            .context("failed to fetch receipt")?,
    };
    let fields = parse_from_html(&html);
    if fields.is_empty() {
        tracing::warn!("no receipt fields found in page");
    }
    Ok(fields)
}

/// Split a `key=value` argument.
pub fn parse_pair(arg: &str) -> Result<(String, String)> {
    let Some((key, value)) = arg.split_once('=') else {
        bail!("expected key=value, got {arg:?}");
    };
    let key = key.trim();
    if key.is_empty() {
        bail!("empty field name in {arg:?}");
    }
    Ok((key.to_string(), value.trim().to_string()))
}

/// Build the expected mapping from an optional JSON file plus `key=value`
/// overrides. Override values are typed like extracted values.
pub fn load_expected(path: Option<&Path>, pairs: &[String]) -> Result<Fields> {
    let mut expected = match path {
        Some(path) => {
            let raw = std::fs::read_to_string(path)
                .with_context(|| format!("cannot read {}", path.display()))?;
            serde_json::from_str::<Fields>(&raw)
                .with_context(|| format!("{} is not a flat JSON object", path.display()))?
        }
        None => Fields::new(),
    };
    for pair in pairs {
        let (key, value) = parse_pair(pair)?;
        expected.insert_raw(key, &value);
    }
    Ok(expected)
}

/// Names among `keys` that are not canonical receipt fields.
///
/// Such names are still valid for caller-built mappings, but on an extracted
/// receipt they can only ever be absent.
pub fn unknown_keys<'a>(keys: impl IntoIterator<Item = &'a str>) -> Vec<&'a str> {
    keys.into_iter()
        .filter(|k| k.parse::<FieldKey>().is_err())
        .collect()
}

/// Which verification was run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum VerifyMode {
    All,
    Only,
}

/// Outcome of the `verify` command.
#[derive(Debug, Clone, Serialize)]
pub struct VerifyReport {
    pub mode: VerifyMode,
    pub matched: bool,
    pub checked: usize,
    pub mismatches: Vec<Mismatch>,
}

/// Run `verify_only` when `only` is non-empty, `verify_all` otherwise.
///
/// `exclude` only applies to `verify_all`; the CLI rejects passing both.
pub fn run_verify(
    extracted: &Fields,
    expected: &Fields,
    exclude: &[String],
    only: &[String],
) -> VerifyReport {
    let verifier = Verifier::new(extracted, expected);
    let exclude: Vec<&str> = exclude.iter().map(String::as_str).collect();
    let only: Vec<&str> = only.iter().map(String::as_str).collect();

    if only.is_empty() {
        let checked: Vec<&str> = extracted
            .keys()
            .filter(|k| !exclude.contains(k))
            .collect();
        VerifyReport {
            mode: VerifyMode::All,
            matched: verifier.verify_all(&exclude),
            checked: checked.len(),
            mismatches: if checked.is_empty() {
                Vec::new()
            } else {
                verifier.mismatches(&checked)
            },
        }
    } else {
        VerifyReport {
            mode: VerifyMode::Only,
            matched: verifier.verify_only(&only),
            checked: only.len(),
            mismatches: verifier.mismatches(&only),
        }
    }
}

/// One printable row of the label table.
#[derive(Debug, Clone, Serialize)]
pub struct LabelRow {
    pub index: usize,
    pub key: &'static str,
    pub label: &'static str,
    pub cell_offset: usize,
}

pub fn label_rows() -> Vec<LabelRow> {
    LABEL_TABLE
        .iter()
        .enumerate()
        .map(|(index, e)| LabelRow {
            index,
            key: e.key.as_str(),
            label: e.label,
            cell_offset: e.cell_offset,
        })
        .collect()
}

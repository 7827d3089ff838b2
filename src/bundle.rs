// 📦 Download-all bundles
// Zip of every provider funding of a stream plus its feed pages, with a
// SHA-256 manifest.

use crate::config::FeedConfig;
use crate::error::Result;
use crate::feed::{generate_feed, get_page, page_count, FeedFilters};
use crate::fixture::Fixtures;
use crate::funding::{generator_for, FundingStream};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::io::{Cursor, Write};
use tracing::info;
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipWriter};

pub const MANIFEST_PATH: &str = "manifest.json";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ManifestEntry {
    pub path: String,
    pub bytes: usize,
    pub sha256: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BundleManifest {
    pub funding_stream: String,
    pub funding_period: String,
    pub provider_fundings: usize,
    pub feed_pages: usize,
    pub files: Vec<ManifestEntry>,
}

/// Attachment name offered by the download endpoints
pub fn bundle_file_name(stream: FundingStream) -> String {
    format!("{}-{}-files.zip", stream.code(), stream.period().code)
}

struct BundleWriter {
    zip: ZipWriter<Cursor<Vec<u8>>>,
    files: Vec<ManifestEntry>,
}

impl BundleWriter {
    fn new() -> Self {
        BundleWriter {
            zip: ZipWriter::new(Cursor::new(Vec::new())),
            files: Vec::new(),
        }
    }

    fn add(&mut self, path: String, contents: &[u8]) -> Result<()> {
        let options = FileOptions::default().compression_method(CompressionMethod::Deflated);
        self.zip.start_file(path.as_str(), options)?;
        self.zip.write_all(contents)?;
        self.files.push(ManifestEntry {
            path,
            bytes: contents.len(),
            sha256: format!("{:x}", Sha256::digest(contents)),
        });
        Ok(())
    }

    fn finish(mut self, manifest: impl FnOnce(Vec<ManifestEntry>) -> BundleManifest) -> Result<Vec<u8>> {
        let manifest = manifest(std::mem::take(&mut self.files));
        let options = FileOptions::default().compression_method(CompressionMethod::Deflated);
        self.zip.start_file(MANIFEST_PATH, options)?;
        self.zip.write_all(&serde_json::to_vec_pretty(&manifest)?)?;
        Ok(self.zip.finish()?.into_inner())
    }
}

/// Build the zip bundle for one stream
pub fn build_bundle(fixtures: &Fixtures, stream: FundingStream, config: &FeedConfig) -> Result<Vec<u8>> {
    let mut writer = BundleWriter::new();

    let provider_fundings = generator_for(stream).provider_fundings(fixtures)?;
    for funding in &provider_fundings {
        writer.add(
            format!("providers/{}.json", funding.id),
            &serde_json::to_vec_pretty(funding)?,
        )?;
    }

    let filters = FeedFilters {
        funding_stream_codes: vec![stream.code().to_string()],
        page_size: Some(config.default_page_size),
        ..FeedFilters::default()
    };
    let total = generate_feed(fixtures, &filters)?.len();
    let pages = page_count(total, config.default_page_size);
    for page in 1..=pages {
        let response = get_page(fixtures, &filters, Some(page), config)?;
        writer.add(
            format!("feed/page-{}.json", page),
            &serde_json::to_vec_pretty(&response)?,
        )?;
    }

    let bytes = writer.finish(|files| BundleManifest {
        funding_stream: stream.code().to_string(),
        funding_period: stream.period().code,
        provider_fundings: provider_fundings.len(),
        feed_pages: pages,
        files,
    })?;

    info!(
        stream = stream.code(),
        providers = provider_fundings.len(),
        pages,
        bytes = bytes.len(),
        "built bundle"
    );
    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Read;
    use zip::ZipArchive;

    fn read_entry(archive: &mut ZipArchive<Cursor<Vec<u8>>>, name: &str) -> Vec<u8> {
        let mut file = archive.by_name(name).unwrap();
        let mut contents = Vec::new();
        file.read_to_end(&mut contents).unwrap();
        contents
    }

    #[test]
    fn test_pesports_bundle_contents() {
        let fixtures = Fixtures::embedded().unwrap();
        let config = FeedConfig::new("http://mock.test", 5);
        let bytes = build_bundle(&fixtures, FundingStream::PeSports, &config).unwrap();

        let mut archive = ZipArchive::new(Cursor::new(bytes)).unwrap();
        let manifest: BundleManifest =
            serde_json::from_slice(&read_entry(&mut archive, MANIFEST_PATH)).unwrap();

        assert_eq!(manifest.funding_stream, "PESports");
        assert_eq!(manifest.provider_fundings, 30);
        // 16 entries at 5 per page
        assert_eq!(manifest.feed_pages, 4);
        assert_eq!(archive.len(), 30 + 4 + 1);

        for entry in &manifest.files {
            let contents = read_entry(&mut archive, &entry.path);
            assert_eq!(contents.len(), entry.bytes);
            assert_eq!(format!("{:x}", Sha256::digest(&contents)), entry.sha256);
        }

        let page: serde_json::Value =
            serde_json::from_slice(&read_entry(&mut archive, "feed/page-1.json")).unwrap();
        assert_eq!(page["atomEntry"].as_array().unwrap().len(), 5);
    }

    #[test]
    fn test_bundle_file_name() {
        assert_eq!(bundle_file_name(FundingStream::Dsg), "DSG-FY1920-files.zip");
    }
}

use anyhow::Result;
use std::path::Path;
use tracing::debug;

/// The section of `product.ini` that lists the editions on the media.
pub const BUILD_INFO_SECTION: &str = "BuildInfo";

/// The key whose value lists the staged editions.
pub const STAGED_KEY: &str = "staged";

/// The character encoding a manifest was stored in.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum ManifestEncoding {
    /// Little endian UTF-16 with a byte order mark.
    Utf16,
    #[default]
    Latin1,
}

/// An ini-like build manifest (`sources/product.ini`) from installation media.
///
/// Every line within a section is kept verbatim except that `key = value`
/// pairs are normalized to `key=value`. Lines that appear before the first
/// section header are dropped.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Manifest {
    pub encoding: ManifestEncoding,

    sections: Vec<(String, Vec<String>)>,
}

impl Manifest {
    /// Read a manifest from the given path. A missing file is treated as an
    /// empty manifest.
    pub fn open(path: impl AsRef<Path>) -> Result<Manifest> {
        let path = path.as_ref();

        match std::fs::read(path) {
            Ok(buf) => {
                let manifest = Manifest::parse(&buf);
                debug!(
                    path = ?path,
                    size = buf.len(),
                    encoding = ?manifest.encoding,
                    "Read build manifest"
                );
                Ok(manifest)
            }
            Err(error) if error.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = ?path, "No build manifest found");
                Ok(Manifest::default())
            }
            Err(error) => Err(error.into()),
        }
    }

    /// Parse a manifest from raw bytes.
    pub fn parse(buf: &[u8]) -> Manifest {
        let (encoding, text) = decode(buf);

        let mut manifest = Manifest {
            encoding,
            sections: Vec::new(),
        };
        let mut current: Option<usize> = None;

        for line in text.split('\n') {
            let line = line.trim();
            if line.is_empty() || line.starts_with(';') {
                continue;
            }

            if line.starts_with('[') && line.ends_with(']') && line.len() >= 2 {
                current = Some(manifest.begin_section(&line[1..line.len() - 1]));
                continue;
            }

            let Some(index) = current else {
                continue;
            };

            let entry = match line.split_once('=') {
                Some((key, value)) => format!("{}={}", key.trim(), value.trim()),
                None => line.to_string(),
            };
            manifest.sections[index].1.push(entry);
        }

        manifest
    }

    /// Start a section, discarding any previous section with the same name.
    fn begin_section(&mut self, name: &str) -> usize {
        if let Some(index) = self
            .sections
            .iter()
            .position(|(existing, _)| existing.eq_ignore_ascii_case(name))
        {
            self.sections[index].1.clear();
            index
        } else {
            self.sections.push((name.to_string(), Vec::new()));
            self.sections.len() - 1
        }
    }

    /// Get the lines of a section by (case insensitive) name.
    pub fn section(&self, name: &str) -> Option<&[String]> {
        self.sections
            .iter()
            .find(|(existing, _)| existing.eq_ignore_ascii_case(name))
            .map(|(_, lines)| lines.as_slice())
    }

    /// The lower-cased names of the editions staged on the media.
    ///
    /// The `BuildInfo` section is consulted first, followed by any other
    /// section that carries a `staged` entry. Only the first `staged` entry
    /// is used. An empty list means the manifest doesn't say.
    pub fn staged_editions(&self) -> Vec<String> {
        let preferred = self.section(BUILD_INFO_SECTION).into_iter();
        let others = self
            .sections
            .iter()
            .filter(|(name, _)| !name.eq_ignore_ascii_case(BUILD_INFO_SECTION))
            .map(|(_, lines)| lines.as_slice());

        preferred
            .chain(others)
            .find_map(staged_value)
            .map(|value| {
                value
                    .split(',')
                    .map(|edition| edition.trim().to_lowercase())
                    .filter(|edition| !edition.is_empty())
                    .collect()
            })
            .unwrap_or_default()
    }
}

fn staged_value(lines: &[String]) -> Option<&str> {
    lines.iter().find_map(|line| {
        let (key, value) = line.split_once('=')?;
        if key == STAGED_KEY { Some(value) } else { None }
    })
}

fn decode(buf: &[u8]) -> (ManifestEncoding, String) {
    if let Some(rest) = buf.strip_prefix(&[0xff, 0xfe]) {
        let units: Vec<u16> = rest
            .chunks_exact(2)
            .map(|pair| u16::from_le_bytes([pair[0], pair[1]]))
            .collect();
        (ManifestEncoding::Utf16, String::from_utf16_lossy(&units))
    } else {
        (
            ManifestEncoding::Latin1,
            buf.iter().map(|&byte| byte as char).collect(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_log::test;

    const PRODUCT_INI: &str = "\
; Build information\r
[BuildInfo]\r
build = 9600\r
staged=Pro,Enterprise\r
\r
[Languages]\r
en-us\r
";

    fn utf16(text: &str) -> Vec<u8> {
        let mut buf = vec![0xff, 0xfe];
        for unit in text.encode_utf16() {
            buf.extend_from_slice(&unit.to_le_bytes());
        }
        buf
    }

    #[test]
    fn test_parse_latin1() {
        let manifest = Manifest::parse(PRODUCT_INI.as_bytes());

        assert_eq!(manifest.encoding, ManifestEncoding::Latin1);
        assert_eq!(
            manifest.section("BuildInfo").unwrap(),
            &["build=9600".to_string(), "staged=Pro,Enterprise".to_string()]
        );
        assert_eq!(manifest.section("languages").unwrap(), &["en-us".to_string()]);
        assert_eq!(manifest.staged_editions(), vec!["pro", "enterprise"]);
    }

    #[test]
    fn test_parse_utf16() {
        let manifest = Manifest::parse(&utf16(PRODUCT_INI));

        assert_eq!(manifest.encoding, ManifestEncoding::Utf16);
        assert_eq!(manifest.staged_editions(), vec!["pro", "enterprise"]);
    }

    #[test]
    fn test_latin1_bytes_are_kept() {
        let manifest = Manifest::parse(b"[BuildInfo]\nname=caf\xe9\n");

        assert_eq!(manifest.section("BuildInfo").unwrap(), &["name=café".to_string()]);
    }

    #[test]
    fn test_lines_before_section_are_dropped() {
        let manifest = Manifest::parse(b"staged=home\n[BuildInfo]\nbuild=1\n");

        assert!(manifest.staged_editions().is_empty());
        assert_eq!(manifest.section("BuildInfo").unwrap(), &["build=1".to_string()]);
    }

    #[test]
    fn test_repeated_section_replaces_previous() {
        let manifest = Manifest::parse(b"[BuildInfo]\nstaged=home\n[BuildInfo]\nbuild=1\n");

        assert_eq!(manifest.section("BuildInfo").unwrap(), &["build=1".to_string()]);
        assert!(manifest.staged_editions().is_empty());
    }

    #[test]
    fn test_staged_in_other_section() {
        let manifest = Manifest::parse(b"[BuildInfo]\nbuild=1\n[Media]\nstaged=Home\n");

        assert_eq!(manifest.staged_editions(), vec!["home"]);
    }

    #[test]
    fn test_build_info_takes_precedence() {
        let manifest = Manifest::parse(b"[Media]\nstaged=home\n[BuildInfo]\nstaged=pro\n");

        assert_eq!(manifest.staged_editions(), vec!["pro"]);
    }

    #[test]
    fn test_malformed_lines_are_skipped() {
        let manifest = Manifest::parse(b"[BuildInfo]\ngarbage\n=\nstaged = pro, ,home\n[\n");

        assert_eq!(manifest.staged_editions(), vec!["pro", "home"]);
    }

    #[test]
    fn test_staged_key_is_exact() {
        let manifest = Manifest::parse(b"[BuildInfo]\nstaged_extra=pro\nunstaged=home\n");

        assert!(manifest.staged_editions().is_empty());
    }

    #[test]
    fn test_open_missing() -> Result<()> {
        let tmp = tempfile::tempdir()?;
        let manifest = Manifest::open(tmp.path().join("sources").join("product.ini"))?;

        assert_eq!(manifest, Manifest::default());
        assert!(manifest.staged_editions().is_empty());
        Ok(())
    }

    #[test]
    fn test_open_file() -> Result<()> {
        let tmp = tempfile::tempdir()?;
        let path = tmp.path().join("product.ini");
        std::fs::write(&path, utf16("[BuildInfo]\nstaged=home,pro\n"))?;

        assert_eq!(Manifest::open(&path)?.staged_editions(), vec!["home", "pro"]);
        Ok(())
    }
}

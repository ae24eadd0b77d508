//! Aptfile parsing.

use super::config::PACKAGE_SUFFIX;

/// One entry of the Aptfile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PackageSpec {
    /// Direct download of a package file (e.g., "http://example.com/holiday.deb")
    Url(String),
    /// Package name resolved by apt (e.g., "libpq-dev")
    Name(String),
}

impl PackageSpec {
    /// Classify a single line. Returns `None` for blank lines.
    pub fn parse(line: &str) -> Option<Self> {
        let line = line.trim();
        if line.is_empty() {
            None
        } else if line.ends_with(PACKAGE_SUFFIX) {
            Some(PackageSpec::Url(line.to_string()))
        } else {
            Some(PackageSpec::Name(line.to_string()))
        }
    }
}

/// File name a downloaded package is stored under: the last path segment of
/// its URL.
pub fn package_file_name(url: &str) -> &str {
    url.rsplit_once('/').map_or(url, |(_, name)| name)
}

/// Parse the Aptfile contents into entries, in file order.
pub fn parse_manifest(text: &str) -> Vec<PackageSpec> {
    text.lines().filter_map(PackageSpec::parse).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_url_and_name() {
        assert_eq!(
            PackageSpec::parse("http://example.com/holiday.deb"),
            Some(PackageSpec::Url("http://example.com/holiday.deb".to_string()))
        );
        assert_eq!(
            PackageSpec::parse("disneyland"),
            Some(PackageSpec::Name("disneyland".to_string()))
        );
    }

    #[test]
    fn test_parse_blank_lines() {
        assert_eq!(PackageSpec::parse(""), None);
        assert_eq!(PackageSpec::parse("   "), None);
        assert_eq!(PackageSpec::parse("\r"), None);
    }

    #[test]
    fn test_parse_trims_line_endings() {
        assert_eq!(
            PackageSpec::parse("libpq-dev\r"),
            Some(PackageSpec::Name("libpq-dev".to_string()))
        );
    }

    #[test]
    fn test_package_file_name() {
        assert_eq!(
            package_file_name("https://example.com/pool/main/h/holiday_1.0_amd64.deb"),
            "holiday_1.0_amd64.deb"
        );
        assert_eq!(package_file_name("holiday.deb"), "holiday.deb");
    }

    #[test]
    fn test_parse_manifest_keeps_order() {
        let specs = parse_manifest("http://example.com/holiday.deb\n\ndisneyland\nepcot\n");
        assert_eq!(
            specs,
            vec![
                PackageSpec::Url("http://example.com/holiday.deb".into()),
                PackageSpec::Name("disneyland".into()),
                PackageSpec::Name("epcot".into()),
            ]
        );
    }

    #[test]
    fn test_parse_manifest_empty() {
        assert!(parse_manifest("").is_empty());
        assert!(parse_manifest("\n\n").is_empty());
    }
}

//! Client address to country resolution
//!
//! Lookups run against an in-memory range table loaded once from a TOML file.
//! Anything that cannot be resolved (no address, loopback, private ranges,
//! garbage input, no matching range) maps to the configured default country.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::net::{IpAddr, Ipv6Addr, SocketAddr};
use std::path::Path;

/// Country used when nothing better is known
pub const DEFAULT_COUNTRY: &str = "NG";

/// One inclusive address range
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeoRange {
    pub start: IpAddr,
    pub end: IpAddr,
    pub country: String,
}

#[derive(Debug, Deserialize)]
struct GeoFile {
    #[serde(default)]
    ranges: Vec<GeoFileRange>,
}

#[derive(Debug, Deserialize)]
struct GeoFileRange {
    start: String,
    end: String,
    country: String,
}

/// Address range table
#[derive(Debug, Clone, Default)]
pub struct GeoDatabase {
    ranges: Vec<GeoRange>,
}

impl GeoDatabase {
    pub fn new(mut ranges: Vec<GeoRange>) -> Self {
        ranges.sort_by(|a, b| a.start.cmp(&b.start));
        Self { ranges }
    }

    /// Parse a TOML range table:
    ///
    /// ```toml
    /// [[ranges]]
    /// start = "41.58.0.0"
    /// end = "41.58.255.255"
    /// country = "NG"
    /// ```
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let file: GeoFile = toml::from_str(content).context("Failed to parse geo database")?;
        let mut ranges = Vec::with_capacity(file.ranges.len());
        for (idx, r) in file.ranges.into_iter().enumerate() {
            let start: IpAddr = r
                .start
                .trim()
                .parse()
                .with_context(|| format!("Invalid start address in range {}: {}", idx, r.start))?;
            let end: IpAddr = r
                .end
                .trim()
                .parse()
                .with_context(|| format!("Invalid end address in range {}: {}", idx, r.end))?;
            if start.is_ipv4() != end.is_ipv4() || start > end {
                anyhow::bail!("Invalid range {}: {} - {}", idx, r.start, r.end);
            }
            ranges.push(GeoRange {
                start,
                end,
                country: r.country.trim().to_ascii_uppercase(),
            });
        }
        Ok(Self::new(ranges))
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read geo database: {}", path.display()))?;
        Self::from_toml_str(&content)
    }

    pub fn len(&self) -> usize {
        self.ranges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ranges.is_empty()
    }

    /// Country of the range containing `ip`, if any
    pub fn lookup(&self, ip: IpAddr) -> Option<&str> {
        // Ranges are sorted by start; the candidate is the last one starting at or before ip.
        let idx = self.ranges.partition_point(|r| r.start <= ip);
        let candidate = self.ranges[..idx]
            .iter()
            .rev()
            .find(|r| r.start.is_ipv4() == ip.is_ipv4())?;
        (ip <= candidate.end).then_some(candidate.country.as_str())
    }
}

/// Maps client addresses to a country code
#[derive(Debug, Clone)]
pub struct GeoResolver {
    database: GeoDatabase,
    default_country: String,
}

impl GeoResolver {
    pub fn new(database: GeoDatabase, default_country: impl Into<String>) -> Self {
        Self {
            database,
            default_country: default_country.into().to_ascii_uppercase(),
        }
    }

    pub fn default_country(&self) -> &str {
        &self.default_country
    }

    /// Resolve a raw client address to a country code. Never fails.
    pub fn resolve(&self, client_address: Option<&str>) -> String {
        let Some(raw) = client_address.map(str::trim).filter(|s| !s.is_empty()) else {
            return self.default_country.clone();
        };

        let Some(ip) = parse_client_address(raw) else {
            tracing::debug!(address = %raw, "unparseable client address, using default country");
            return self.default_country.clone();
        };

        if is_local(&ip) {
            return self.default_country.clone();
        }

        match self.database.lookup(ip) {
            Some(country) => {
                tracing::debug!(address = %ip, country = %country, "resolved client country");
                country.to_string()
            }
            None => {
                tracing::debug!(address = %ip, "no geo match, using default country");
                self.default_country.clone()
            }
        }
    }
}

impl Default for GeoResolver {
    fn default() -> Self {
        Self::new(GeoDatabase::default(), DEFAULT_COUNTRY)
    }
}

/// Accepts bare addresses, `addr:port`, `[v6]:port`, IPv4-mapped IPv6 and
/// forwarded-for lists (first hop wins).
fn parse_client_address(raw: &str) -> Option<IpAddr> {
    let first = raw.split(',').next()?.trim();

    let ip = first
        .parse::<IpAddr>()
        .ok()
        .or_else(|| first.parse::<SocketAddr>().ok().map(|s| s.ip()))?;

    Some(match ip {
        IpAddr::V6(v6) => unmap_v4(v6),
        v4 => v4,
    })
}

fn unmap_v4(v6: Ipv6Addr) -> IpAddr {
    match v6.to_ipv4_mapped() {
        Some(v4) => IpAddr::V4(v4),
        None => IpAddr::V6(v6),
    }
}

fn is_local(ip: &IpAddr) -> bool {
    match ip {
        IpAddr::V4(v4) => {
            v4.is_loopback() || v4.is_unspecified() || v4.is_private() || v4.is_link_local()
        }
        IpAddr::V6(v6) => v6.is_loopback() || v6.is_unspecified(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
        [[ranges]]
        start = "41.58.0.0"
        end = "41.58.255.255"
        country = "ng"

        [[ranges]]
        start = "81.2.69.0"
        end = "81.2.69.255"
        country = "GB"

        [[ranges]]
        start = "2001:db8::"
        end = "2001:db8::ffff"
        country = "US"
    "#;

    fn resolver() -> GeoResolver {
        GeoResolver::new(GeoDatabase::from_toml_str(SAMPLE).unwrap(), "NG")
    }

    #[test]
    fn test_loopback_and_absent_use_default() {
        let r = resolver();
        assert_eq!(r.resolve(None), "NG");
        assert_eq!(r.resolve(Some("")), "NG");
        assert_eq!(r.resolve(Some("127.0.0.1")), "NG");
        assert_eq!(r.resolve(Some("::1")), "NG");
        assert_eq!(r.resolve(Some("10.1.2.3")), "NG");
    }

    #[test]
    fn test_malformed_uses_default() {
        let r = resolver();
        assert_eq!(r.resolve(Some("not-an-ip")), "NG");
        assert_eq!(r.resolve(Some("999.1.1.1")), "NG");
    }

    #[test]
    fn test_lookup_hits_range() {
        let r = resolver();
        assert_eq!(r.resolve(Some("81.2.69.160")), "GB");
        assert_eq!(r.resolve(Some("41.58.3.4")), "NG");
        assert_eq!(r.resolve(Some("2001:db8::10")), "US");
        assert_eq!(r.resolve(Some("8.8.8.8")), "NG");
    }

    #[test]
    fn test_forwarded_mapped_and_port_forms() {
        let r = resolver();
        assert_eq!(r.resolve(Some("81.2.69.1, 10.0.0.1")), "GB");
        assert_eq!(r.resolve(Some("::ffff:81.2.69.1")), "GB");
        assert_eq!(r.resolve(Some("81.2.69.1:5001")), "GB");
        assert_eq!(r.resolve(Some("::ffff:127.0.0.1")), "NG");
    }

    #[test]
    fn test_invalid_database_is_rejected() {
        let bad = r#"
            [[ranges]]
            start = "10.0.0.9"
            end = "10.0.0.1"
            country = "XX"
        "#;
        assert!(GeoDatabase::from_toml_str(bad).is_err());
        assert!(GeoDatabase::from_toml_str("[[ranges]]\nstart = \"x\"\nend = \"y\"\ncountry = \"Z\"").is_err());
    }
}

//! HTTP client construction and the outbound target guard shared by every
//! collaborator that fetches URLs it did not choose itself.

use std::net::IpAddr;
use std::time::Duration;

use reqwest::Client;
use reqwest::redirect::Policy;
use url::{Host, Url};

use crate::error::{BriefwrightError, Result};

/// Maximum number of redirects followed by collaborator requests.
pub const MAX_REDIRECTS: usize = 3;

const USER_AGENT: &str = concat!("briefwright/", env!("CARGO_PKG_VERSION"));

/// Build the reqwest client used by every HTTP collaborator.
///
/// Redirects are capped at [`MAX_REDIRECTS`] and never followed into a
/// private target.
pub fn build_client(timeout_secs: u64) -> Result<Client> {
    let redirects = Policy::custom(|attempt| {
        if attempt.previous().len() >= MAX_REDIRECTS {
            attempt.error("too many redirects")
        } else if is_private_target(attempt.url()) {
            attempt.stop()
        } else {
            attempt.follow()
        }
    });

    Client::builder()
        .user_agent(USER_AGENT)
        .redirect(redirects)
        .timeout(Duration::from_secs(timeout_secs))
        .build()
        .map_err(|e| BriefwrightError::Network(format!("failed to build HTTP client: {e}")))
}

/// Parse `raw` and refuse non-HTTP schemes and private hosts.
pub fn public_target(raw: &str) -> Result<Url> {
    let url = Url::parse(raw.trim())
        .map_err(|e| BriefwrightError::validation(format!("{raw}: {e}")))?;
    if is_private_target(&url) {
        return Err(BriefwrightError::validation(format!(
            "{raw}: refusing to fetch private or non-HTTP target"
        )));
    }
    Ok(url)
}

/// True for non-HTTP schemes, loopback/private addresses and local hostnames.
pub fn is_private_target(url: &Url) -> bool {
    if !matches!(url.scheme(), "http" | "https") {
        return true;
    }

    match url.host() {
        Some(Host::Ipv4(ip)) => is_private_ip(&IpAddr::V4(ip)),
        Some(Host::Ipv6(ip)) => is_private_ip(&IpAddr::V6(ip)),
        Some(Host::Domain(domain)) => {
            let domain = domain.to_ascii_lowercase();
            domain == "localhost" || domain.ends_with(".local") || domain.ends_with(".internal")
        }
        None => true,
    }
}

fn is_private_ip(ip: &IpAddr) -> bool {
    match ip {
        IpAddr::V4(v4) => {
            let [a, b, ..] = v4.octets();
            v4.is_loopback()
                || v4.is_private()
                || v4.is_link_local()
                || v4.is_broadcast()
                || v4.is_unspecified()
                // 100.64.0.0/10
                || (a == 100 && (b & 0xC0) == 64)
        }
        IpAddr::V6(v6) => {
            let first = v6.segments()[0];
            v6.is_loopback()
                || v6.is_unspecified()
                // fc00::/7 unique local, fe80::/10 link local
                || (first & 0xfe00) == 0xfc00
                || (first & 0xffc0) == 0xfe80
                || v6.to_ipv4_mapped().is_some_and(|v4| is_private_ip(&IpAddr::V4(v4)))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn private_targets_are_detected() {
        let private = [
            "file:///etc/passwd",
            "http://127.0.0.1:8080/",
            "http://10.1.2.3/",
            "http://192.168.0.10/",
            "http://169.254.169.254/latest/meta-data/",
            "http://100.64.1.1/",
            "http://localhost/",
            "http://printer.local/",
            "http://[::1]/",
            "http://[fd00::1]/",
            "http://[::ffff:127.0.0.1]/",
        ];
        for url in private {
            assert!(is_private_target(&Url::parse(url).unwrap()), "{url}");
        }
        assert!(!is_private_target(&Url::parse("https://www.si.edu/").unwrap()));
    }

    #[test]
    fn public_target_rejects_loopback_and_garbage() {
        assert!(matches!(
            public_target("http://127.0.0.1/castes.csv"),
            Err(BriefwrightError::Validation { .. })
        ));
        assert!(public_target("not a url").is_err());
        let url = public_target(" https://data.example.org/castes.csv ").unwrap();
        assert_eq!(url.host_str(), Some("data.example.org"));
    }

    #[test]
    fn client_builds() {
        assert!(build_client(10).is_ok());
    }
}

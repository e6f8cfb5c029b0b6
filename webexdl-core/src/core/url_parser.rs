use std::sync::LazyLock;

use regex::Regex;

use crate::error::{PipelineError, PipelineResult};
use crate::models::recording::PageIdentity;
use crate::models::settings::DEFAULT_VENDOR_DOMAIN;

static DEFAULT_PATTERN: LazyLock<AddressPattern> =
    LazyLock::new(|| AddressPattern::new(DEFAULT_VENDOR_DOMAIN));

#[derive(Debug, Clone)]
pub struct AddressPattern {
    vendor_domain: String,
    re: Regex,
}

impl AddressPattern {
    pub fn new(vendor_domain: &str) -> Self {
        let pattern = format!(
            r"^https?://(.+?)\.{}/(?:recordingservice|webappng)/sites/([^/]+)/.*?([a-f0-9]{{32}})[^?]*(\?.*)?",
            regex::escape(vendor_domain)
        );
        let re = Regex::new(&pattern).expect("vendor domain is escaped");
        Self {
            vendor_domain: vendor_domain.to_string(),
            re,
        }
    }

    pub fn vendor_domain(&self) -> &str {
        &self.vendor_domain
    }

    pub fn is_match(&self, address: &str) -> bool {
        self.re.is_match(address)
    }

    pub fn parse(&self, address: &str) -> PipelineResult<PageIdentity> {
        let caps = self
            .re
            .captures(address)
            .ok_or_else(|| PipelineError::AddressMismatch(address.to_string()))?;

        let group = |i: usize| caps.get(i).map(|m| m.as_str().to_string());

        let (Some(subdomain), Some(site_name), Some(recording_id)) = (group(1), group(2), group(3))
        else {
            return Err(PipelineError::AddressMismatch(address.to_string()));
        };

        Ok(PageIdentity {
            subdomain,
            site_name,
            recording_id,
            auth_params: group(4),
            vendor_domain: self.vendor_domain.clone(),
        })
    }
}

pub fn parse_page_address(address: &str) -> PipelineResult<PageIdentity> {
    DEFAULT_PATTERN.parse(address)
}

#[cfg(test)]
mod tests {
    use super::*;

    const ID: &str = "abcd1234abcd1234abcd1234abcd1234";

    #[test]
    fn parses_webappng_playback_address() {
        let identity = parse_page_address(&format!(
            "https://acme.webex.com/webappng/sites/acme/recording/playback/{}",
            ID
        ))
        .unwrap();
        assert_eq!(identity.subdomain, "acme");
        assert_eq!(identity.site_name, "acme");
        assert_eq!(identity.recording_id, ID);
        assert_eq!(identity.auth_params, None);
        assert_eq!(
            identity.metadata_url(),
            format!("https://acme.webex.com/webappng/api/v1/recordings/{}/stream", ID)
        );
    }

    #[test]
    fn parses_recordingservice_address() {
        let identity = parse_page_address(&format!(
            "https://eu-corp.webex.com/recordingservice/sites/corpsite/recording/{}/playback",
            ID
        ))
        .unwrap();
        assert_eq!(identity.subdomain, "eu-corp");
        assert_eq!(identity.site_name, "corpsite");
        assert_eq!(identity.recording_id, ID);
    }

    #[test]
    fn keeps_query_string_verbatim() {
        let identity = parse_page_address(&format!(
            "https://acme.webex.com/webappng/sites/acme/recording/{}/playback?siteurl=acme&ticket=a%2Fb==",
            ID
        ))
        .unwrap();
        assert_eq!(identity.auth_params.as_deref(), Some("?siteurl=acme&ticket=a%2Fb=="));
        assert!(identity
            .metadata_url()
            .ends_with(&format!("/recordings/{}/stream?siteurl=acme&ticket=a%2Fb==", ID)));
    }

    #[test]
    fn http_scheme_accepted() {
        assert!(parse_page_address(&format!(
            "http://acme.webex.com/webappng/sites/acme/recording/{}",
            ID
        ))
        .is_ok());
    }

    #[test]
    fn uppercase_id_rejected() {
        let err = parse_page_address(
            "https://acme.webex.com/webappng/sites/acme/recording/ABCD1234ABCD1234ABCD1234ABCD1234",
        )
        .unwrap_err();
        assert!(matches!(err, PipelineError::AddressMismatch(_)));
    }

    #[test]
    fn unknown_service_path_rejected() {
        assert!(parse_page_address(&format!(
            "https://acme.webex.com/meet/sites/acme/{}",
            ID
        ))
        .is_err());
    }

    #[test]
    fn other_domain_rejected() {
        assert!(parse_page_address(&format!(
            "https://acme.example.com/webappng/sites/acme/recording/{}",
            ID
        ))
        .is_err());
    }

    #[test]
    fn short_id_rejected() {
        assert!(parse_page_address("https://acme.webex.com/webappng/sites/acme/recording/abcd").is_err());
    }

    #[test]
    fn custom_vendor_domain() {
        let pattern = AddressPattern::new("webex.example");
        let identity = pattern
            .parse(&format!("https://x.webex.example/webappng/sites/s/r/{}", ID))
            .unwrap();
        assert_eq!(identity.vendor_domain, "webex.example");
        assert!(identity.metadata_url().starts_with("https://x.webex.example/webappng/api/v1/"));
        assert!(!pattern.is_match(&format!("https://x.webexXexample/webappng/sites/s/r/{}", ID)));
    }
}

//! Safety module: PII detection and redaction
//!
//! Provides real-time PII detection and redaction for completion requests before
//! they reach an upstream provider. Two backends are available:
//!
//! - [`Backend::Fallback`]: five regex patterns (email, phone, credit card, US SSN, IP).
//! - [`Backend::Rich`]: the fallback patterns plus heuristic matchers for person
//!   names, locations and date/time expressions. This is a regex heuristic, not a
//!   statistical named-entity model — it trades some recall for zero extra
//!   dependencies and deterministic behavior.

#![cfg_attr(not(feature = "enabled"), allow(unused))]

#[cfg(feature = "enabled")]
mod implementation {
    use std::collections::HashSet;

    use gateway_types::RedactionResult;
    use once_cell::sync::Lazy;
    use regex::Regex;

    /// All entity kinds this crate knows how to detect.
    pub const ALL_ENTITIES: &[&str] = &[
        "EMAIL_ADDRESS",
        "PHONE_NUMBER",
        "CREDIT_CARD",
        "US_SSN",
        "IP_ADDRESS",
        "PERSON",
        "LOCATION",
        "DATE_TIME",
    ];

    static EMAIL_ADDRESS: Lazy<Regex> =
        Lazy::new(|| Regex::new(r"[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}").unwrap());
    static PHONE_NUMBER: Lazy<Regex> =
        Lazy::new(|| Regex::new(r"\b\d{3}[-.\s]?\d{3}[-.\s]?\d{4}\b").unwrap());
    static CREDIT_CARD: Lazy<Regex> =
        Lazy::new(|| Regex::new(r"\b\d{4}[- ]?\d{4}[- ]?\d{4}[- ]?\d{4}\b").unwrap());
    static US_SSN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b\d{3}-\d{2}-\d{4}\b").unwrap());
    static IP_ADDRESS: Lazy<Regex> = Lazy::new(|| {
        Regex::new(r"\b(?:(?:25[0-5]|2[0-4]\d|[01]?\d?\d)\.){3}(?:25[0-5]|2[0-4]\d|[01]?\d?\d)\b").unwrap()
    });

    // Heuristic matchers used only by the rich backend. These approximate what a
    // named-entity model would catch, they don't replace one.
    static PERSON: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b[A-Z][a-z]+ [A-Z][a-z]+\b").unwrap());
    static LOCATION: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b[A-Z][a-z]+, [A-Z]{2}\b").unwrap());
    static DATE_TIME: Lazy<Regex> = Lazy::new(|| {
        Regex::new(r"\b\d{4}-\d{2}-\d{2}(?:[ T]\d{2}:\d{2}(?::\d{2})?)?\b|\b\d{1,2}/\d{1,2}/\d{2,4}\b").unwrap()
    });

    fn base_patterns() -> [(&'static str, &'static Lazy<Regex>); 5] {
        [
            ("EMAIL_ADDRESS", &EMAIL_ADDRESS),
            ("PHONE_NUMBER", &PHONE_NUMBER),
            ("CREDIT_CARD", &CREDIT_CARD),
            ("US_SSN", &US_SSN),
            ("IP_ADDRESS", &IP_ADDRESS),
        ]
    }

    fn rich_patterns() -> [(&'static str, &'static Lazy<Regex>); 3] {
        [("PERSON", &PERSON), ("LOCATION", &LOCATION), ("DATE_TIME", &DATE_TIME)]
    }

    /// Which pattern set a [`PiiDetector`] runs.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub enum Backend {
        /// Five regex entity kinds: email, phone, credit card, SSN, IP address.
        Fallback,
        /// Fallback entities plus heuristic person/location/date-time matchers.
        Rich,
    }

    /// Detects and redacts PII in free text.
    pub struct PiiDetector {
        backend: Backend,
        enabled: bool,
        entities: Option<HashSet<String>>,
    }

    impl PiiDetector {
        /// Create a detector. `enabled = false` makes [`Self::redact`] a no-op,
        /// matching the gateway-wide PII redaction toggle. Every entity kind the
        /// backend supports is active until [`Self::with_entities`] narrows it.
        pub fn new(backend: Backend, enabled: bool) -> Self {
            Self { backend, enabled, entities: None }
        }

        /// Restrict detection to the given entity kinds, e.g. from the
        /// `PII_ENTITIES` config list. An entity kind absent from this set is
        /// never matched, even if the backend otherwise supports it.
        pub fn with_entities(mut self, entities: impl IntoIterator<Item = String>) -> Self {
            self.entities = Some(entities.into_iter().collect());
            self
        }

        fn entity_enabled(&self, name: &str) -> bool {
            self.entities.as_ref().map(|set| set.contains(name)).unwrap_or(true)
        }

        /// True if `text` contains any entity this detector's backend recognizes.
        pub fn check(&self, text: &str) -> bool {
            if !self.enabled {
                return false;
            }
            let hit = base_patterns().iter().any(|(name, re)| self.entity_enabled(name) && re.is_match(text));
            if hit {
                return true;
            }
            self.backend == Backend::Rich
                && rich_patterns().iter().any(|(name, re)| self.entity_enabled(name) && re.is_match(text))
        }

        /// Redact all recognized PII in `text`, returning the redacted text and a
        /// summary of what was found. When the detector is disabled, returns the
        /// text unchanged with an empty summary.
        pub fn redact(&self, text: &str) -> RedactionResult {
            if !self.enabled {
                return RedactionResult {
                    redacted_text: text.to_string(),
                    redacted: false,
                    entities_found: Vec::new(),
                    redaction_count: 0,
                };
            }

            let mut redacted = text.to_string();
            let mut entities_found = Vec::new();
            let mut redaction_count = 0usize;

            for (name, re) in base_patterns() {
                if !self.entity_enabled(name) {
                    continue;
                }
                let count = re.find_iter(&redacted).count();
                if count > 0 {
                    redacted = re.replace_all(&redacted, format!("<{name}>")).into_owned();
                    redaction_count += count;
                    entities_found.push(name.to_string());
                }
            }

            if self.backend == Backend::Rich {
                for (name, re) in rich_patterns() {
                    if !self.entity_enabled(name) {
                        continue;
                    }
                    let count = re.find_iter(&redacted).count();
                    if count > 0 {
                        redacted = re.replace_all(&redacted, format!("<{name}>")).into_owned();
                        redaction_count += count;
                        entities_found.push(name.to_string());
                    }
                }
            }

            RedactionResult {
                redacted_text: redacted,
                redacted: redaction_count > 0,
                entities_found,
                redaction_count,
            }
        }
    }
}

#[cfg(feature = "enabled")]
pub use implementation::*;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn redacts_email() {
        let d = PiiDetector::new(Backend::Fallback, true);
        let r = d.redact("contact me at jane.doe@example.com please");
        assert_eq!(r.redaction_count, 1);
        assert!(r.entities_found.contains(&"EMAIL_ADDRESS".to_string()));
        assert!(!r.redacted_text.contains("jane.doe@example.com"));
    }

    #[test]
    fn redacts_phone() {
        let d = PiiDetector::new(Backend::Fallback, true);
        let r = d.redact("call 555-123-4567 tomorrow");
        assert_eq!(r.redaction_count, 1);
        assert!(r.entities_found.contains(&"PHONE_NUMBER".to_string()));
    }

    #[test]
    fn redacts_credit_card() {
        let d = PiiDetector::new(Backend::Fallback, true);
        let r = d.redact("card number 4111 1111 1111 1111 expires soon");
        assert_eq!(r.redaction_count, 1);
        assert!(r.entities_found.contains(&"CREDIT_CARD".to_string()));
    }

    #[test]
    fn redacts_ssn() {
        let d = PiiDetector::new(Backend::Fallback, true);
        let r = d.redact("ssn is 123-45-6789 on file");
        assert!(r.entities_found.contains(&"US_SSN".to_string()));
    }

    #[test]
    fn redacts_ip_address() {
        let d = PiiDetector::new(Backend::Fallback, true);
        let r = d.redact("the server lives at 192.168.1.10 internally");
        assert!(r.entities_found.contains(&"IP_ADDRESS".to_string()));
    }

    #[test]
    fn clean_text_has_zero_redaction_count() {
        let d = PiiDetector::new(Backend::Fallback, true);
        let r = d.redact("what's a good recipe for lentil soup?");
        assert_eq!(r.redaction_count, 0);
        assert!(!r.redacted);
    }

    #[test]
    fn multiple_entities_in_one_message_all_counted() {
        let d = PiiDetector::new(Backend::Fallback, true);
        let r = d.redact("email jane@example.com or call 555-222-3333");
        assert!(r.redaction_count >= 2);
    }

    #[test]
    fn disabled_detector_is_a_no_op() {
        let d = PiiDetector::new(Backend::Fallback, false);
        let text = "email jane@example.com";
        let r = d.redact(text);
        assert_eq!(r.redacted_text, text);
        assert_eq!(r.redaction_count, 0);
        assert!(!r.redacted);
    }

    #[test]
    fn redaction_placeholder_is_the_bare_entity_kind() {
        let d = PiiDetector::new(Backend::Fallback, true);
        let r = d.redact("email jane@example.com please");
        assert!(r.redacted_text.contains("<EMAIL_ADDRESS>"));
        assert!(!r.redacted_text.contains("_REDACTED"));
    }

    #[test]
    fn entity_allowlist_filters_out_other_kinds() {
        let d = PiiDetector::new(Backend::Fallback, true).with_entities(["PHONE_NUMBER".to_string()]);
        let r = d.redact("email jane@example.com or call 555-222-3333");
        assert_eq!(r.entities_found, vec!["PHONE_NUMBER".to_string()]);
        assert!(r.redacted_text.contains("jane@example.com"));
        assert!(r.redacted_text.contains("<PHONE_NUMBER>"));
    }

    #[test]
    fn rich_backend_catches_more_than_fallback() {
        let text = "Jane Smith lives in Austin, TX and visited on 2024-03-01";
        let fallback = PiiDetector::new(Backend::Fallback, true).redact(text);
        let rich = PiiDetector::new(Backend::Rich, true).redact(text);
        assert!(rich.redaction_count > fallback.redaction_count);
    }
}

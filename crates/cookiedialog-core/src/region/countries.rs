//! Countries where a consent prompt is required.

/// EU member states, the remaining EEA members (IS, LI, NO) and the UK.
pub const CONSENT_REQUIRED_COUNTRIES: &[&str] = &[
    // EU-27
    "AT", "BE", "BG", "HR", "CY", "CZ", "DK", "EE", "FI", "FR", "DE", "GR", "HU", "IE", "IT",
    "LV", "LT", "LU", "MT", "NL", "PL", "PT", "RO", "SK", "SI", "ES", "SE",
    // EEA
    "IS", "LI", "NO",
    // UK
    "GB",
];

/// Case-insensitive membership check on an ISO 3166-1 alpha-2 code.
pub fn requires_consent(country_code: &str) -> bool {
    let code = country_code.trim();
    CONSENT_REQUIRED_COUNTRIES
        .iter()
        .any(|c| c.eq_ignore_ascii_case(code))
}

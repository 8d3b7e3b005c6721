use anyhow::{Result, bail};
use pkg_constants::limits::{MAX_DNS1123_LABEL_LEN, MAX_LABEL_PART_LEN, MAX_PORT, MIN_PORT};
use pkg_constants::policy::ANY_PORT;

/// Validate a DNS-1123 label (names, namespaces, named ports).
/// Rules: lowercase `[a-z0-9-]`, max 63 chars, no leading/trailing hyphens.
pub fn validate_dns1123_label(value: &str) -> Result<()> {
    if value.trim().is_empty() {
        bail!("must not be empty");
    }
    if value.len() > MAX_DNS1123_LABEL_LEN {
        bail!(
            "'{}' exceeds {} characters (got {})",
            value,
            MAX_DNS1123_LABEL_LEN,
            value.len()
        );
    }
    if value.starts_with('-') || value.ends_with('-') {
        bail!("'{}' must not start or end with a hyphen", value);
    }
    if !value
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
    {
        bail!(
            "'{}' must contain only lowercase letters, digits, and hyphens [a-z0-9-]",
            value
        );
    }
    Ok(())
}

/// Validate one part (key or non-empty value) of a Kubernetes label.
/// Rules: `[A-Za-z0-9_.-]`, max 63 chars, alphanumeric at both ends.
pub fn validate_label_part(value: &str) -> Result<()> {
    if value.is_empty() {
        bail!("must not be empty");
    }
    if value.len() > MAX_LABEL_PART_LEN {
        bail!(
            "'{}' exceeds {} characters (got {})",
            value,
            MAX_LABEL_PART_LEN,
            value.len()
        );
    }
    let alnum_edge = |c: Option<char>| c.is_some_and(|c| c.is_ascii_alphanumeric());
    if !alnum_edge(value.chars().next()) || !alnum_edge(value.chars().last()) {
        bail!("'{}' must start and end with a letter or digit", value);
    }
    if !value
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
    {
        bail!(
            "'{}' must contain only letters, digits, '-', '_' and '.'",
            value
        );
    }
    Ok(())
}

/// How a port string typed on a rule edge is interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PortSyntax {
    /// Blank or whitespace only.
    Empty,
    /// The literal `any`, in any case.
    Any,
    Number(u16),
    /// All digits, but outside 1-65535.
    NumberOutOfRange,
    /// `start-end` with both bounds in 1-65535.
    Range(u16, u16),
    /// `start-end` with a bound outside 1-65535. Still a range, never a port name.
    RangeOutOfBounds,
    /// A DNS-1123 label naming a container port.
    Named,
    Invalid,
}

/// Classify a port string. Precedence: empty, `any`, number, range, named.
pub fn classify_port(value: &str) -> PortSyntax {
    if value.trim().is_empty() {
        return PortSyntax::Empty;
    }
    if value.eq_ignore_ascii_case(ANY_PORT) {
        return PortSyntax::Any;
    }
    if is_digits(value) {
        return match parse_port_number(value) {
            Some(n) => PortSyntax::Number(n),
            None => PortSyntax::NumberOutOfRange,
        };
    }
    if let Some((start, end)) = value.split_once('-') {
        if is_digits(start) && is_digits(end) {
            return match (parse_port_number(start), parse_port_number(end)) {
                (Some(s), Some(e)) => PortSyntax::Range(s, e),
                _ => PortSyntax::RangeOutOfBounds,
            };
        }
    }
    if validate_dns1123_label(value).is_ok() {
        PortSyntax::Named
    } else {
        PortSyntax::Invalid
    }
}

fn is_digits(s: &str) -> bool {
    !s.is_empty() && s.chars().all(|c| c.is_ascii_digit())
}

/// Parse an all-digit string into a port in 1-65535.
fn parse_port_number(s: &str) -> Option<u16> {
    let digits = s.trim_start_matches('0');
    // Anything longer than five significant digits cannot be a port.
    if digits.len() > 5 {
        return None;
    }
    let n: u32 = if digits.is_empty() { 0 } else { digits.parse().ok()? };
    u16::try_from(n)
        .ok()
        .filter(|n| (MIN_PORT..=MAX_PORT).contains(n))
}

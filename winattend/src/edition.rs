//! Choosing which edition of Windows an answer file installs.

use crate::diagnostics::Diagnostics;

/// Check a requested edition against the editions a variant knows about.
///
/// Unknown requests are reported and dropped. Whether the edition is actually
/// staged on the media doesn't matter here.
pub fn validate_request(
    preference: &[&str],
    requested: Option<&str>,
    diagnostics: &dyn Diagnostics,
) -> Option<String> {
    let requested = requested.map(str::trim).filter(|r| !r.is_empty())?;
    let requested = requested.to_lowercase();

    if preference.iter().any(|known| *known == requested) {
        Some(requested)
    } else {
        diagnostics.error(&format!(
            "The requested edition '{}' is not known for this variant (expected one of: {}), ignoring it",
            requested,
            preference.join(", ")
        ));
        None
    }
}

/// Pick the edition to install.
///
/// In order of precedence:
/// 1. the (already validated) requested edition, even when it isn't staged
/// 2. the most preferred edition that is staged
/// 3. the first staged edition
/// 4. the most preferred edition
pub fn resolve_edition(preference: &[&str], staged: &[String], requested: Option<&str>) -> String {
    if let Some(requested) = requested {
        return requested.to_string();
    }

    if let Some(preferred) = preference
        .iter()
        .find(|edition| staged.iter().any(|s| s == *edition))
    {
        return preferred.to_string();
    }

    staged
        .first()
        .cloned()
        .or_else(|| preference.first().map(|edition| edition.to_string()))
        .unwrap_or_default()
}

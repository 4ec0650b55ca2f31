use crate::domain::{OrgUnitId, OutputFormat};
use crate::error::Dhis2Error;

pub const PERIOD: &str = "LAST_5_YEARS";
pub const DISPLAY_PROPERTY: &str = "NAME";
pub const OUTPUT_ID_SCHEME: &str = "UID";

/// Builds the full analytics URL for one organisation unit.
///
/// The indicator dimension joins every id with `;`; the join leaves no
/// trailing separator, so nothing may be trimmed off the result without
/// truncating the final identifier.
pub fn build_analytics_query(
    endpoint: &str,
    org_unit: &OrgUnitId,
    indicator_ids: &[String],
    format: OutputFormat,
) -> Result<String, Dhis2Error> {
    if indicator_ids.is_empty() {
        return Err(Dhis2Error::EmptyIndicatorList);
    }

    let dx = indicator_ids.join(";");
    Ok(format!(
        "{endpoint}.{format}?dimension=dx:{dx}\
         &dimension=pe:{PERIOD}\
         &dimension=ou:{ou}\
         &displayProperty={DISPLAY_PROPERTY}\
         &outputIdScheme={OUTPUT_ID_SCHEME}",
        ou = org_unit.as_str(),
    ))
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    const ENDPOINT: &str = "https://hiskenya.org/api/25/analytics";

    fn ids(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    #[test]
    fn query_carries_all_dimensions() {
        let url = build_analytics_query(
            ENDPOINT,
            &OrgUnitId::new("HfVjCurKxh2"),
            &ids(&["N3FFtxkRDCy", "YW8qksk9vDB"]),
            OutputFormat::Csv,
        )
        .unwrap();

        assert!(url.starts_with("https://hiskenya.org/api/25/analytics.csv?"));
        assert!(url.contains("dimension=dx:N3FFtxkRDCy;YW8qksk9vDB"));
        assert!(url.contains("dimension=pe:LAST_5_YEARS"));
        assert!(url.contains("dimension=ou:HfVjCurKxh2"));
        assert!(url.contains("displayProperty=NAME"));
        assert!(url.contains("outputIdScheme=UID"));
    }

    #[test]
    fn joined_ids_are_untruncated() {
        let url = build_analytics_query(
            ENDPOINT,
            &OrgUnitId::new("ou1"),
            &ids(&["abc", "def"]),
            OutputFormat::Csv,
        )
        .unwrap();

        // The last id keeps its final character and no stray `;` remains.
        assert!(url.contains("dimension=dx:abc;def&"));
    }

    #[test]
    fn single_indicator_has_no_separator() {
        let url = build_analytics_query(
            ENDPOINT,
            &OrgUnitId::new("ou1"),
            &ids(&["abc"]),
            OutputFormat::Json,
        )
        .unwrap();

        assert!(url.contains("analytics.json?dimension=dx:abc&"));
    }

    #[test]
    fn deterministic_for_same_inputs() {
        let args = (
            OrgUnitId::new("ou1"),
            ids(&["x", "y", "z"]),
            OutputFormat::Csv,
        );
        let first = build_analytics_query(ENDPOINT, &args.0, &args.1, args.2).unwrap();
        let second = build_analytics_query(ENDPOINT, &args.0, &args.1, args.2).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn empty_indicator_list_rejected() {
        let err = build_analytics_query(ENDPOINT, &OrgUnitId::new("ou1"), &[], OutputFormat::Csv)
            .unwrap_err();
        assert_matches!(err, Dhis2Error::EmptyIndicatorList);
    }
}

//! Attribute extraction from ntuple and manifest paths.
//!
//! Both functions are total: any string is accepted and unexpected shapes
//! degrade to `None`, never an error.

/// Directory segment marking the dataset campaign in manifest paths.
pub const CAMPAIGN_BRANCH: &str = "RunII_102X_v1";

/// Username owning an ntuple, taken as the path segment after `user`.
///
/// e.g. `/nfs/dust/cms/user/robin/UHH2/Ntuple.root` -> `robin`
#[must_use]
pub fn get_user_from_filename(ntuple_filename: &str) -> Option<String> {
    if !ntuple_filename.contains("/user/") {
        return None;
    }
    let parts: Vec<&str> = ntuple_filename.split('/').collect();
    let ind = parts.iter().position(|p| *p == "user")?;
    if ind == parts.len() - 1 {
        return None;
    }
    Some(parts[ind + 1].to_string())
}

/// Dataset year from a manifest's relative path.
///
/// The segment after the campaign branch when present, e.g.
/// `RunII_102X_v1/2017v2/MC_TTbar.xml` -> `2017v2`; otherwise the first
/// segment, whatever it is. No validation that it looks like a year.
#[must_use]
pub fn get_year_from_dir(dirname: &str) -> Option<String> {
    let parts: Vec<&str> = dirname.split('/').collect();
    if let Some(ind) = parts.iter().position(|p| *p == CAMPAIGN_BRANCH) {
        if ind == parts.len() - 1 {
            return None;
        }
        Some(parts[ind + 1].to_string())
    } else {
        Some(parts[0].to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_after_user_segment() {
        assert_eq!(
            get_user_from_filename("/nfs/dust/cms/user/robin/UHH2/x.root"),
            Some("robin".to_string())
        );
    }

    #[test]
    fn test_user_segment_last_is_absent() {
        // "/user/" never matches a trailing segment, so this degrades to None.
        assert_eq!(get_user_from_filename("/nfs/dust/cms/user"), None);
    }

    #[test]
    fn test_no_user_segment_is_absent() {
        assert_eq!(get_user_from_filename("/pnfs/desy.de/cms/store/x.root"), None);
    }

    #[test]
    fn test_user_substring_of_segment_does_not_match() {
        assert_eq!(get_user_from_filename("/nfs/superuser/robin/x.root"), None);
    }

    #[test]
    fn test_year_after_campaign_branch() {
        assert_eq!(
            get_year_from_dir("RunII_102X_v1/2017v2/MC_TTbar.xml"),
            Some("2017v2".to_string())
        );
    }

    #[test]
    fn test_year_branch_nested_deeper() {
        assert_eq!(
            get_year_from_dir("common/datasets/RunII_102X_v1/2018/MC_QCD.xml"),
            Some("2018".to_string())
        );
    }

    #[test]
    fn test_year_branch_as_last_segment_is_absent() {
        assert_eq!(get_year_from_dir("common/RunII_102X_v1"), None);
    }

    #[test]
    fn test_year_without_branch_takes_first_segment() {
        assert_eq!(get_year_from_dir("2016v3/sample.xml"), Some("2016v3".to_string()));
    }

    #[test]
    fn test_year_first_segment_is_not_validated() {
        assert_eq!(get_year_from_dir("scratch/sample.xml"), Some("scratch".to_string()));
    }
}

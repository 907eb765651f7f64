use crate::utils::error::{MokhberError, Result};
use url::Url;

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

fn invalid(field_name: &str, value: &str, reason: String) -> MokhberError {
    MokhberError::InvalidConfigValueError {
        field: field_name.to_string(),
        value: value.to_string(),
        reason,
    }
}

pub fn validate_url(field_name: &str, url_str: &str) -> Result<()> {
    if url_str.is_empty() {
        return Err(invalid(field_name, url_str, "URL cannot be empty".to_string()));
    }

    match Url::parse(url_str) {
        Ok(url) => match url.scheme() {
            "http" | "https" => Ok(()),
            scheme => Err(invalid(
                field_name,
                url_str,
                format!("Unsupported URL scheme: {}", scheme),
            )),
        },
        Err(e) => Err(invalid(field_name, url_str, format!("Invalid URL format: {}", e))),
    }
}

/// Validates a list of URLs that must contain at least one entry.
pub fn validate_url_list(field_name: &str, urls: &[String]) -> Result<()> {
    if urls.is_empty() {
        return Err(MokhberError::ConfigValidationError {
            field: field_name.to_string(),
            message: "at least one URL is required".to_string(),
        });
    }
    for (i, url) in urls.iter().enumerate() {
        validate_url(&format!("{}[{}]", field_name, i), url)?;
    }
    Ok(())
}

pub fn validate_path(field_name: &str, path: &str) -> Result<()> {
    if path.is_empty() {
        return Err(invalid(field_name, path, "Path cannot be empty".to_string()));
    }

    if path.contains('\0') {
        return Err(invalid(field_name, path, "Path contains null bytes".to_string()));
    }

    Ok(())
}

pub fn validate_positive_number(field_name: &str, value: usize, min_value: usize) -> Result<()> {
    if value < min_value {
        return Err(invalid(
            field_name,
            &value.to_string(),
            format!("Value must be at least {}", min_value),
        ));
    }
    Ok(())
}

pub fn validate_non_empty_string(field_name: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(invalid(
            field_name,
            value,
            "Value cannot be empty or whitespace-only".to_string(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_url() {
        assert!(validate_url("feed", "https://www.sciencedaily.com/rss/top.xml").is_ok());
        assert!(validate_url("feed", "http://feeds.feedburner.com/nvidiablog").is_ok());
        assert!(validate_url("feed", "").is_err());
        assert!(validate_url("feed", "invalid-url").is_err());
        assert!(validate_url("feed", "ftp://example.com").is_err());
    }

    #[test]
    fn test_validate_url_list_requires_entries() {
        assert!(validate_url_list("sources[0].urls", &[]).is_err());
        let urls = vec!["https://example.com/feed".to_string(), "nope".to_string()];
        let err = validate_url_list("sources[0].urls", &urls).unwrap_err();
        assert!(err.to_string().contains("sources[0].urls[1]"));
    }

    #[test]
    fn test_validate_path_and_numbers() {
        assert!(validate_path("history_file", "posted_links3.txt").is_ok());
        assert!(validate_path("history_file", "").is_err());
        assert!(validate_path("history_file", "a\0b").is_err());
        assert!(validate_positive_number("sample_size", 20, 1).is_ok());
        assert!(validate_positive_number("sample_size", 0, 1).is_err());
        assert!(validate_non_empty_string("name", "  ").is_err());
    }
}

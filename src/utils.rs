use crate::errors::{CommonError, Fields};

/// Colors are stored as a bare 6-hex-digit string. A leading `#` from the
/// client is stripped here and added back only when serializing out.
pub fn normalize_color(input: &str) -> Result<String, Fields> {
    let bare = input.strip_prefix('#').unwrap_or(input);
    if bare.len() != 6 || !bare.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(Fields::Color(CommonError::Invalid));
    }
    Ok(bare.to_lowercase())
}

pub fn display_color(stored: &str) -> String {
    format!("#{}", stored)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_color_strips_marker() {
        assert_eq!(normalize_color("#ab12ef").unwrap(), "ab12ef");
        assert_eq!(normalize_color("ab12ef").unwrap(), "ab12ef");
        assert_eq!(normalize_color("#AB12EF").unwrap(), "ab12ef");
    }

    #[test]
    fn test_normalize_color_rejects_garbage() {
        assert_eq!(normalize_color("#ab12e"), Err(Fields::Color(CommonError::Invalid)));
        assert_eq!(normalize_color("ab12eff"), Err(Fields::Color(CommonError::Invalid)));
        assert_eq!(normalize_color("#zz12ef"), Err(Fields::Color(CommonError::Invalid)));
        assert_eq!(normalize_color(""), Err(Fields::Color(CommonError::Invalid)));
    }

    #[test]
    fn test_color_round_trip() {
        let stored = normalize_color("#ab12ef").unwrap();
        assert_eq!(display_color(&stored), "#ab12ef");
    }
}

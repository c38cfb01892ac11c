use hotsox_shared::errors::AppError;

pub const COLORS: &[&str] = &[
    "black", "white", "grey", "red", "blue", "green", "yellow", "orange", "pink", "purple",
    "brown", "multicolor",
];
pub const FABRICS: &[&str] = &[
    "cotton", "wool", "polyester", "nylon", "silk", "bamboo", "cashmere", "blend",
];
pub const FABRIC_THICKNESSES: &[&str] = &["thin", "medium", "thick"];
pub const TYPES: &[&str] = &[
    "no-show", "ankle", "crew", "knee-high", "over-the-knee", "toe", "compression",
];
pub const SIZES: &[&str] = &["xs", "s", "m", "l", "xl", "xxl"];
pub const CONDITIONS: &[&str] = &["new", "like-new", "used", "worn-out"];
pub const INOUTDOOR: &[&str] = &["indoor", "outdoor", "both"];

fn check(field: &str, value: &str, choices: &[&str]) -> Result<(), AppError> {
    if choices.contains(&value) {
        Ok(())
    } else {
        Err(AppError::Validation(format!(
            "{field} must be one of: {}",
            choices.join(", ")
        )))
    }
}

/// Choice-valued sock fields, borrowed from a create or update request.
#[derive(Debug, Default)]
pub struct SockChoices<'a> {
    pub color: Option<&'a str>,
    pub fabric: Option<&'a str>,
    pub fabric_thickness: Option<&'a str>,
    pub sock_type: Option<&'a str>,
    pub size: Option<&'a str>,
    pub condition: Option<&'a str>,
    pub inoutdoor: Option<&'a str>,
}

impl SockChoices<'_> {
    /// Checks every present field against its vocabulary.
    pub fn validate(&self) -> Result<(), AppError> {
        let fields = [
            ("info_color", self.color, COLORS),
            ("info_fabric", self.fabric, FABRICS),
            ("info_fabric_thickness", self.fabric_thickness, FABRIC_THICKNESSES),
            ("info_type", self.sock_type, TYPES),
            ("info_size", self.size, SIZES),
            ("info_condition", self.condition, CONDITIONS),
            ("info_inoutdoor", self.inoutdoor, INOUTDOOR),
        ];
        for (field, value, choices) in fields {
            if let Some(value) = value {
                check(field, value, choices)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_known_values() {
        let choices = SockChoices {
            color: Some("red"),
            fabric: Some("wool"),
            fabric_thickness: Some("thick"),
            sock_type: Some("crew"),
            size: Some("m"),
            condition: Some("used"),
            inoutdoor: Some("both"),
        };
        assert!(choices.validate().is_ok());
    }

    #[test]
    fn absent_fields_are_skipped() {
        assert!(SockChoices::default().validate().is_ok());
    }

    #[test]
    fn rejects_unknown_value_naming_the_field() {
        let choices = SockChoices {
            size: Some("huge"),
            ..Default::default()
        };
        match choices.validate() {
            Err(AppError::Validation(msg)) => assert!(msg.starts_with("info_size")),
            other => panic!("unexpected {other:?}"),
        }
    }
}

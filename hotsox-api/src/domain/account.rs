use chrono::NaiveDate;

use hotsox_shared::errors::{AppError, ErrorCode};

const DAYS_PER_YEAR: f64 = 365.2425;
const MIN_AGE: f64 = 18.0;

pub const USERNAME_BLACKLIST: [&str; 4] = ["Admin", "Administrator", "admin", "administrator"];
pub const GENDERS: [&str; 3] = ["female", "male", "diverse"];
pub const GENDER_PREFERENCES: [&str; 4] = ["female", "male", "diverse", "everyone"];

/// Rejects birthdays less than 18 calendar-approximated years before `today`.
pub fn validate_birthday(birthday: NaiveDate, today: NaiveDate) -> Result<(), AppError> {
    let days = (today - birthday).num_days() as f64;
    let years = (days / DAYS_PER_YEAR * 100.0).round() / 100.0;
    if years < MIN_AGE {
        return Err(AppError::new(
            ErrorCode::UnderAge,
            "you must be at least 18 years old to use HotSox",
        ));
    }
    Ok(())
}

pub fn age_in_years(birthday: NaiveDate, today: NaiveDate) -> i32 {
    let days = (today - birthday).num_days().abs() as f64;
    (days / DAYS_PER_YEAR) as i32
}

pub fn validate_username(username: &str) -> Result<(), AppError> {
    let len = username.chars().count();
    if !(3..=150).contains(&len) {
        return Err(AppError::new(
            ErrorCode::InvalidUsername,
            "username must be between 3 and 150 characters",
        ));
    }
    if !username
        .chars()
        .all(|c| c.is_alphanumeric() || matches!(c, '@' | '.' | '+' | '-' | '_'))
    {
        return Err(AppError::new(
            ErrorCode::InvalidUsername,
            "username may only contain letters, digits and @/./+/-/_",
        ));
    }
    if USERNAME_BLACKLIST.contains(&username) {
        return Err(AppError::new(ErrorCode::InvalidUsername, "this username is not allowed"));
    }
    Ok(())
}

/// Uppercases the first letter of every alphabetic run and lowercases the rest.
pub fn title_case(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut prev_alpha = false;
    for c in value.trim().chars() {
        if c.is_alphabetic() {
            if prev_alpha {
                out.extend(c.to_lowercase());
            } else {
                out.extend(c.to_uppercase());
            }
            prev_alpha = true;
        } else {
            out.push(c);
            prev_alpha = false;
        }
    }
    out
}

pub fn validate_gender(value: &str) -> Result<(), AppError> {
    if GENDERS.contains(&value) {
        Ok(())
    } else {
        Err(AppError::Validation(format!(
            "info_gender must be one of: {}",
            GENDERS.join(", ")
        )))
    }
}

pub fn validate_gender_preference(value: &str) -> Result<(), AppError> {
    if GENDER_PREFERENCES.contains(&value) {
        Ok(())
    } else {
        Err(AppError::Validation(format!(
            "info_gender_preference must be one of: {}",
            GENDER_PREFERENCES.join(", ")
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn adult_birthday_is_accepted() {
        assert!(validate_birthday(date(2000, 1, 1), date(2024, 5, 4)).is_ok());
    }

    #[test]
    fn minor_birthday_is_rejected() {
        let err = validate_birthday(date(2010, 1, 1), date(2024, 5, 4)).unwrap_err();
        assert_eq!(err.error_code(), Some(ErrorCode::UnderAge));
    }

    #[test]
    fn eighteenth_birthday_passes_after_rounding() {
        // 6574 days is 17.998 years, which rounds to 18.00
        let today = date(2024, 5, 4);
        let birthday = today - chrono::Duration::days(6574);
        assert!(validate_birthday(birthday, today).is_ok());

        let birthday = today - chrono::Duration::days(6570);
        assert!(validate_birthday(birthday, today).is_err());
    }

    #[test]
    fn age_truncates_and_ignores_sign() {
        assert_eq!(age_in_years(date(2000, 5, 5), date(2024, 5, 4)), 23);
        assert_eq!(age_in_years(date(2000, 5, 4), date(2024, 5, 4)), 24);
        assert_eq!(age_in_years(date(2024, 5, 4), date(2000, 5, 4)), 24);
    }

    #[test]
    fn username_rules() {
        assert!(validate_username("sock.lover+1@x").is_ok());
        assert!(validate_username("ab").is_err());
        assert!(validate_username("has space").is_err());
        assert!(validate_username("admin").is_err());
        assert!(validate_username("Administrator").is_err());
        assert!(validate_username("ADMIN").is_ok());
        assert!(validate_username(&"a".repeat(151)).is_err());
    }

    #[test]
    fn names_are_title_cased() {
        assert_eq!(title_case("anna-LENA"), "Anna-Lena");
        assert_eq!(title_case("  o'neil "), "O'Neil");
        assert_eq!(title_case("jürgen"), "Jürgen");
    }

    #[test]
    fn gender_choices() {
        assert!(validate_gender("diverse").is_ok());
        assert!(validate_gender("everyone").is_err());
        assert!(validate_gender_preference("everyone").is_ok());
        assert!(validate_gender_preference("robot").is_err());
    }
}

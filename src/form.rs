//! Parameter entry: raw form fields in, validated negotiation parameters out.
//!
//! Every field is required. Text fields must be non-blank; numeric fields
//! must parse as finite, non-negative numbers and the current salary may
//! not exceed the desired one, so the derived bounds are always ordered.
//! Bad input is rejected here rather than forwarded to the backend.

use crate::bounds::{derive_bounds, NegotiationBounds};
use crate::error::{NegotiationError, Result};
use crate::protocol::Role;

/// Form fields exactly as the user typed them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NegotiationForm {
    pub job_title: String,
    pub company: String,
    pub location: String,
    pub current_salary: String,
    pub desired_salary: String,
    pub years_experience: String,
}

/// Validated input to session creation. The role is fixed for the session.
#[derive(Debug, Clone, PartialEq)]
pub struct NegotiationParameters {
    pub role: Role,
    pub job_title: String,
    pub company: String,
    pub location: String,
    pub current_salary: f64,
    pub desired_salary: f64,
    pub years_experience: f64,
}

impl NegotiationParameters {
    pub fn bounds(&self) -> NegotiationBounds {
        derive_bounds(self.current_salary, self.desired_salary)
    }
}

impl NegotiationForm {
    /// Validate the form for the given role.
    pub fn validate(&self, role: Role) -> Result<NegotiationParameters> {
        let job_title = required_text("job_title", &self.job_title)?;
        let company = required_text("company", &self.company)?;
        let location = required_text("location", &self.location)?;
        let current_salary = parse_amount("current_salary", &self.current_salary)?;
        let desired_salary = parse_amount("desired_salary", &self.desired_salary)?;
        let years_experience = parse_amount("years_experience", &self.years_experience)?;

        if current_salary > desired_salary {
            return Err(NegotiationError::InvalidInput {
                field: "desired_salary",
                reason: format!(
                    "must be at least the current salary ({current_salary})"
                ),
            });
        }

        if !derive_bounds(current_salary, desired_salary).is_finite() {
            return Err(NegotiationError::InvalidInput {
                field: "desired_salary",
                reason: "is too large".into(),
            });
        }

        Ok(NegotiationParameters {
            role,
            job_title,
            company,
            location,
            current_salary,
            desired_salary,
            years_experience,
        })
    }
}

fn required_text(field: &'static str, raw: &str) -> Result<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(NegotiationError::InvalidInput {
            field,
            reason: "is required".into(),
        });
    }
    Ok(trimmed.to_string())
}

/// Parse a non-negative finite number. Thousands separators (`,` and `_`)
/// are accepted, so `120,000` reads as `120000`.
pub fn parse_amount(field: &'static str, raw: &str) -> Result<f64> {
    let cleaned: String = raw
        .trim()
        .chars()
        .filter(|c| *c != ',' && *c != '_')
        .collect();
    if cleaned.is_empty() {
        return Err(NegotiationError::InvalidInput {
            field,
            reason: "is required".into(),
        });
    }
    let value: f64 = cleaned.parse().map_err(|_| NegotiationError::InvalidInput {
        field,
        reason: format!("{:?} is not a number", raw.trim()),
    })?;
    if !value.is_finite() {
        return Err(NegotiationError::InvalidInput {
            field,
            reason: "must be a finite number".into(),
        });
    }
    if value < 0.0 {
        return Err(NegotiationError::InvalidInput {
            field,
            reason: "must not be negative".into(),
        });
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn filled() -> NegotiationForm {
        NegotiationForm {
            job_title: "Engineer".into(),
            company: "Acme".into(),
            location: "Berlin".into(),
            current_salary: "100000".into(),
            desired_salary: "120000".into(),
            years_experience: "5".into(),
        }
    }

    #[test]
    fn test_validate_filled_form() {
        let params = filled().validate(Role::JobSeeker).unwrap();
        assert_eq!(params.role, Role::JobSeeker);
        assert_eq!(params.job_title, "Engineer");
        assert_eq!(params.current_salary, 100_000.0);
        assert_eq!(params.desired_salary, 120_000.0);
        assert_eq!(params.years_experience, 5.0);
    }

    #[test]
    fn test_validate_trims_text() {
        let mut form = filled();
        form.job_title = "  Staff Engineer ".into();
        let params = form.validate(Role::Recruiter).unwrap();
        assert_eq!(params.job_title, "Staff Engineer");
    }

    #[test]
    fn test_bounds_do_not_depend_on_role() {
        let seeker = filled().validate(Role::JobSeeker).unwrap().bounds();
        let recruiter = filled().validate(Role::Recruiter).unwrap().bounds();
        assert_eq!(seeker, recruiter);
    }

    #[rstest]
    #[case::blank_title(|f: &mut NegotiationForm| f.job_title = "   ".into(), "job_title")]
    #[case::blank_company(|f: &mut NegotiationForm| f.company.clear(), "company")]
    #[case::blank_location(|f: &mut NegotiationForm| f.location.clear(), "location")]
    #[case::nan_salary(|f: &mut NegotiationForm| f.current_salary = "NaN".into(), "current_salary")]
    #[case::word_salary(|f: &mut NegotiationForm| f.desired_salary = "lots".into(), "desired_salary")]
    #[case::inf_years(|f: &mut NegotiationForm| f.years_experience = "inf".into(), "years_experience")]
    #[case::negative_years(|f: &mut NegotiationForm| f.years_experience = "-1".into(), "years_experience")]
    #[case::inverted(|f: &mut NegotiationForm| f.current_salary = "130000".into(), "desired_salary")]
    #[case::overflowing_bounds(|f: &mut NegotiationForm| f.desired_salary = "1e307".into(), "desired_salary")]
    fn test_validate_rejects(#[case] edit: fn(&mut NegotiationForm), #[case] expected: &str) {
        let mut form = filled();
        edit(&mut form);
        match form.validate(Role::JobSeeker) {
            Err(NegotiationError::InvalidInput { field, .. }) => assert_eq!(field, expected),
            other => panic!("expected InvalidInput for {expected}, got {other:?}"),
        }
    }

    #[rstest]
    #[case::sub_cent_desired("0", "0.004")]
    #[case::sub_cent_both("0.001", "0.004")]
    #[case::tiny_gap("0.005", "0.006")]
    fn test_validate_sub_cent_bounds_are_ordered(#[case] current: &str, #[case] desired: &str) {
        let mut form = filled();
        form.current_salary = current.into();
        form.desired_salary = desired.into();
        let bounds = form.validate(Role::JobSeeker).unwrap().bounds();
        assert!(bounds.is_consistent(), "{bounds:?}");
        assert!(bounds.is_finite());
    }

    #[rstest]
    #[case("120000", 120_000.0)]
    #[case("120,000", 120_000.0)]
    #[case("1_000.50", 1_000.5)]
    #[case(" 7 ", 7.0)]
    #[case("0", 0.0)]
    fn test_parse_amount_accepts(#[case] raw: &str, #[case] expected: f64) {
        assert_eq!(parse_amount("x", raw).unwrap(), expected);
    }

    #[test]
    fn test_parse_amount_empty_is_required() {
        let err = parse_amount("current_salary", "  ").unwrap_err();
        assert_eq!(err.to_string(), "invalid current_salary: is required");
    }
}

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use super::fields::{
    is_valid_email, parse_date, required_measure, required_text, FieldValue,
};
use super::micros_to_rfc3339;
use crate::constants::{MIN_ADDRESS_LEN, MIN_FULL_NAME_LEN, MIN_HEIGHT_CM, MIN_WEIGHT_KG};
use crate::error::AppError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Hand {
    Right,
    Left,
}

impl Hand {
    pub fn as_str(&self) -> &'static str {
        match self {
            Hand::Right => "Right",
            Hand::Left => "Left",
        }
    }

    fn parse(value: &str) -> Option<Self> {
        match value {
            "Right" => Some(Hand::Right),
            "Left" => Some(Hand::Left),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BowlerType {
    Fast,
    Medium,
    Spinner,
}

impl BowlerType {
    pub fn as_str(&self) -> &'static str {
        match self {
            BowlerType::Fast => "Fast",
            BowlerType::Medium => "Medium",
            BowlerType::Spinner => "Spinner",
        }
    }

    fn parse(value: &str) -> Option<Self> {
        match value {
            "Fast" => Some(BowlerType::Fast),
            "Medium" => Some(BowlerType::Medium),
            "Spinner" => Some(BowlerType::Spinner),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FieldCategory {
    General,
    WicketKeeper,
}

impl FieldCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            FieldCategory::General => "General",
            FieldCategory::WicketKeeper => "Wicket Keeper",
        }
    }

    fn parse(value: &str) -> Option<Self> {
        match value {
            "General" => Some(FieldCategory::General),
            "Wicket Keeper" => Some(FieldCategory::WicketKeeper),
            _ => None,
        }
    }
}

/// Playing category of a registrant; each variant carries only the fields
/// that category requires
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlayingRole {
    Batsman {
        hand: Hand,
    },
    Bowler {
        bowler_type: BowlerType,
        arm: Hand,
    },
    AllRounder {
        hand: Hand,
        bowler_type: BowlerType,
        arm: Hand,
    },
}

impl PlayingRole {
    pub fn category(&self) -> &'static str {
        match self {
            PlayingRole::Batsman { .. } => "Batsman",
            PlayingRole::Bowler { .. } => "Bowler",
            PlayingRole::AllRounder { .. } => "All-Rounder",
        }
    }

    pub fn hand(&self) -> Option<Hand> {
        match *self {
            PlayingRole::Batsman { hand } | PlayingRole::AllRounder { hand, .. } => Some(hand),
            PlayingRole::Bowler { .. } => None,
        }
    }

    pub fn bowler_type(&self) -> Option<BowlerType> {
        match *self {
            PlayingRole::Bowler { bowler_type, .. }
            | PlayingRole::AllRounder { bowler_type, .. } => Some(bowler_type),
            PlayingRole::Batsman { .. } => None,
        }
    }

    pub fn arm(&self) -> Option<Hand> {
        match *self {
            PlayingRole::Bowler { arm, .. } | PlayingRole::AllRounder { arm, .. } => Some(arm),
            PlayingRole::Batsman { .. } => None,
        }
    }

    /// Build the role for `category`, pulling in only the fields it needs
    fn from_form(category: &str, form: &RegistrationForm) -> Result<Self, AppError> {
        let hand = || choice(form.hand.as_ref(), "Batting hand", category, Hand::parse);
        let bowler_type =
            || choice(form.bowler_type.as_ref(), "Bowler type", category, BowlerType::parse);
        let arm = || choice(form.arm_category.as_ref(), "Bowling arm", category, Hand::parse);

        match category {
            "Batsman" => Ok(PlayingRole::Batsman { hand: hand()? }),
            "Bowler" => Ok(PlayingRole::Bowler {
                bowler_type: bowler_type()?,
                arm: arm()?,
            }),
            "All-Rounder" => Ok(PlayingRole::AllRounder {
                hand: hand()?,
                bowler_type: bowler_type()?,
                arm: arm()?,
            }),
            other => Err(AppError::Validation(format!(
                "`{}` is not a valid category!",
                other
            ))),
        }
    }
}

/// Conditional field required by `category`
fn choice<T>(
    value: Option<&FieldValue>,
    label: &str,
    category: &str,
    parse: fn(&str) -> Option<T>,
) -> Result<T, AppError> {
    let text = value
        .map(FieldValue::to_text)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| {
            AppError::Validation(format!("{} is required for {}!", label, category))
        })?;

    parse(&text).ok_or_else(|| {
        AppError::Validation(format!(
            "`{}` is not a valid {}!",
            text,
            label.to_lowercase()
        ))
    })
}

/// Registration form as submitted by the client
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistrationForm {
    pub form_no: Option<FieldValue>,
    pub full_name: Option<FieldValue>,
    pub email: Option<FieldValue>,
    pub address: Option<FieldValue>,
    pub mobile: Option<FieldValue>,
    pub dob: Option<FieldValue>,
    pub height: Option<FieldValue>,
    pub weight: Option<FieldValue>,
    pub category: Option<FieldValue>,
    pub hand: Option<FieldValue>,
    pub bowler_type: Option<FieldValue>,
    pub arm_category: Option<FieldValue>,
    pub field_category: Option<FieldValue>,
}

/// A fully validated registration, ready to be stored
#[derive(Debug, Clone, PartialEq)]
pub struct NewRegistration {
    pub form_no: String,
    pub full_name: String,
    pub email: String,
    pub address: String,
    pub mobile: String,
    pub dob: NaiveDate,
    pub height: f64,
    pub weight: f64,
    pub role: PlayingRole,
    pub field_category: FieldCategory,
}

impl RegistrationForm {
    /// Validate every field, failing on the first problem found
    pub fn validate(&self) -> Result<NewRegistration, AppError> {
        let form_no = required_text(self.form_no.as_ref(), "Form number")?;

        let full_name = required_text(self.full_name.as_ref(), "Full name")?;
        if full_name.chars().count() < MIN_FULL_NAME_LEN {
            return Err(AppError::Validation(format!(
                "Full name must contain at least {} characters!",
                MIN_FULL_NAME_LEN
            )));
        }

        let email = required_text(self.email.as_ref(), "Email")?;
        if !is_valid_email(&email) {
            return Err(AppError::Validation(
                "Please enter a valid email address!".to_string(),
            ));
        }

        let address = required_text(self.address.as_ref(), "Address")?;
        if address.chars().count() < MIN_ADDRESS_LEN {
            return Err(AppError::Validation(format!(
                "Address must contain at least {} characters!",
                MIN_ADDRESS_LEN
            )));
        }

        let mobile = required_text(self.mobile.as_ref(), "Mobile number")?;

        let dob_text = required_text(self.dob.as_ref(), "Date of birth")?;
        let dob = parse_date(&dob_text).ok_or_else(|| {
            AppError::Validation("Invalid date format! Use YYYY-MM-DD.".to_string())
        })?;

        let height = required_measure(self.height.as_ref(), "Height", MIN_HEIGHT_CM, "cm")?;
        let weight = required_measure(self.weight.as_ref(), "Weight", MIN_WEIGHT_KG, "kg")?;

        let category = required_text(self.category.as_ref(), "Category")?;
        let role = PlayingRole::from_form(&category, self)?;

        let field_category_text = required_text(self.field_category.as_ref(), "Field category")?;
        let field_category = FieldCategory::parse(&field_category_text).ok_or_else(|| {
            AppError::Validation(format!(
                "`{}` is not a valid field category!",
                field_category_text
            ))
        })?;

        Ok(NewRegistration {
            form_no,
            full_name,
            email,
            address,
            mobile,
            dob,
            height,
            weight,
            role,
            field_category,
        })
    }
}

/// Registration record stored in redb
/// Dates are kept as day numbers and timestamps as Unix microseconds
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegistrationRecord {
    pub form_no: String,
    pub full_name: String,
    pub email: String,
    pub address: String,
    pub mobile: String,
    /// Days since 0001-01-01 (CE)
    pub dob_days: i32,
    pub height: f64,
    pub weight: f64,
    pub role: PlayingRole,
    pub field_category: FieldCategory,
    pub created_at: i64,
}

impl RegistrationRecord {
    pub fn new(registration: NewRegistration, created_at: i64) -> Self {
        Self {
            form_no: registration.form_no,
            full_name: registration.full_name,
            email: registration.email,
            address: registration.address,
            mobile: registration.mobile,
            dob_days: registration.dob.num_days_from_ce(),
            height: registration.height,
            weight: registration.weight,
            role: registration.role,
            field_category: registration.field_category,
            created_at,
        }
    }

    /// Index keys that must be unique across all registrations, with the
    /// client-facing name of the field each one guards
    pub fn unique_keys(&self) -> [(&'static str, String); 2] {
        [
            ("formNo", format!("formNo:{}", self.form_no)),
            ("email", format!("email:{}", self.email.to_lowercase())),
        ]
    }

    pub fn into_view(self, id: &str) -> Registration {
        let dob = NaiveDate::from_num_days_from_ce_opt(self.dob_days)
            .map(|d| d.format("%Y-%m-%d").to_string())
            .unwrap_or_default();

        Registration {
            id: id.to_string(),
            form_no: self.form_no,
            full_name: self.full_name,
            email: self.email,
            address: self.address,
            mobile: self.mobile,
            dob,
            height: self.height,
            weight: self.weight,
            category: self.role.category(),
            hand: self.role.hand().map(|h| h.as_str()),
            bowler_type: self.role.bowler_type().map(|b| b.as_str()),
            arm_category: self.role.arm().map(|a| a.as_str()),
            field_category: self.field_category.as_str(),
            created_at: micros_to_rfc3339(self.created_at),
        }
    }
}

/// Registration as returned by the API; fields that do not apply to the
/// category are null
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Registration {
    pub id: String,
    pub form_no: String,
    pub full_name: String,
    pub email: String,
    pub address: String,
    pub mobile: String,
    pub dob: String,
    pub height: f64,
    pub weight: f64,
    pub category: &'static str,
    pub hand: Option<&'static str>,
    pub bowler_type: Option<&'static str>,
    pub arm_category: Option<&'static str>,
    pub field_category: &'static str,
    pub created_at: String,
}

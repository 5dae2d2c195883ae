//! Address form validation.
//!
//! A submission is checked as a whole; every failing field gets a message and
//! nothing is saved unless all fields pass.

use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::collections::BTreeMap;
use validator::{Validate, ValidationError, ValidationErrors};

use crate::domain::aggregates::AddressDetails;
use crate::domain::value_objects::{PhoneError, PhoneNumber};
use crate::selector::SelectedLocation;

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase", default)]
pub struct AddressForm {
    #[validate(custom = "full_name_present")]
    pub full_name: String,
    #[validate(custom = "ten_digit_phone")]
    pub phone_number: String,
    #[validate(length(min = 1, message = "Please choose a province"))]
    pub province_code: String,
    pub province_name: String,
    #[validate(length(min = 1, message = "Please choose a district"))]
    pub district_code: String,
    pub district_name: String,
    #[validate(length(min = 1, message = "Please choose a ward"))]
    pub ward_code: String,
    pub ward_name: String,
    #[validate(custom = "street_present")]
    pub street_address: String,
    pub is_default: bool,
}

/// Free-text part of the form the user types in.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AddressDraft {
    pub full_name: String,
    pub phone_number: String,
    pub street_address: String,
    pub is_default: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AddressField {
    FullName,
    PhoneNumber,
    Province,
    District,
    Ward,
    StreetAddress,
}

impl AddressField {
    fn from_field_name(name: &str) -> Option<Self> {
        match name {
            "full_name" | "fullName" => Some(Self::FullName),
            "phone_number" | "phoneNumber" => Some(Self::PhoneNumber),
            "province_code" | "provinceCode" => Some(Self::Province),
            "district_code" | "districtCode" => Some(Self::District),
            "ward_code" | "wardCode" => Some(Self::Ward),
            "street_address" | "streetAddress" => Some(Self::StreetAddress),
            _ => None,
        }
    }
}

/// Field-level messages for a rejected submission.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<AddressField, String>);

impl FieldErrors {
    pub fn get(&self, field: AddressField) -> Option<&str> { self.0.get(&field).map(String::as_str) }
    pub fn contains(&self, field: AddressField) -> bool { self.0.contains_key(&field) }
    pub fn is_empty(&self) -> bool { self.0.is_empty() }
    pub fn len(&self) -> usize { self.0.len() }
    pub fn fields(&self) -> impl Iterator<Item = AddressField> + '_ { self.0.keys().copied() }
}

impl From<&ValidationErrors> for FieldErrors {
    fn from(errors: &ValidationErrors) -> Self {
        let mut map = BTreeMap::new();
        for (name, list) in errors.field_errors() {
            let Some(field) = AddressField::from_field_name(name) else { continue };
            let message = list
                .first()
                .and_then(|e| e.message.as_ref())
                .map(|m| m.to_string())
                .unwrap_or_else(|| "Invalid value".to_string());
            map.insert(field, message);
        }
        Self(map)
    }
}

impl std::fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let fields: Vec<String> = self.0.keys().map(|k| format!("{k:?}")).collect();
        write!(f, "invalid fields: {}", fields.join(", "))
    }
}

impl AddressForm {
    pub fn from_parts(draft: &AddressDraft, location: &SelectedLocation) -> Self {
        let (province_code, province_name) = split(location.province.as_ref());
        let (district_code, district_name) = split(location.district.as_ref());
        let (ward_code, ward_name) = split(location.ward.as_ref());
        Self {
            full_name: draft.full_name.clone(), phone_number: draft.phone_number.clone(),
            province_code, province_name, district_code, district_name, ward_code, ward_name,
            street_address: draft.street_address.clone(), is_default: draft.is_default,
        }
    }

    /// Validates every field and, when all pass, yields trimmed address details.
    pub fn into_details(self) -> Result<AddressDetails, FieldErrors> {
        if let Err(errors) = self.validate() {
            return Err(FieldErrors::from(&errors));
        }
        let phone_number = PhoneNumber::parse(self.phone_number.as_str()).map_err(|e| {
            let mut map = BTreeMap::new();
            map.insert(AddressField::PhoneNumber, phone_message(&e).to_string());
            FieldErrors(map)
        })?;
        Ok(AddressDetails {
            full_name: self.full_name.trim().to_string(),
            phone_number,
            province_code: self.province_code,
            province_name: self.province_name,
            district_code: self.district_code,
            district_name: self.district_name,
            ward_code: self.ward_code,
            ward_name: self.ward_name,
            street_address: self.street_address.trim().to_string(),
            is_default: self.is_default,
        })
    }
}

fn split(option: Option<&crate::location::LocationOption>) -> (String, String) {
    option.map(|o| (o.code.clone(), o.name.clone())).unwrap_or_default()
}

fn error(code: &'static str, message: &'static str) -> ValidationError {
    let mut e = ValidationError::new(code);
    e.message = Some(Cow::Borrowed(message));
    e
}

fn phone_message(e: &PhoneError) -> &'static str {
    match e { PhoneError::Empty => "Please enter a phone number", PhoneError::Format => "Phone number must be 10 digits" }
}

fn full_name_present(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() { return Err(error("required", "Please enter your full name")); }
    Ok(())
}

fn street_present(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() { return Err(error("required", "Please enter the street address")); }
    Ok(())
}

fn ten_digit_phone(value: &str) -> Result<(), ValidationError> {
    match PhoneNumber::parse(value) {
        Ok(_) => Ok(()),
        Err(e @ PhoneError::Empty) => Err(error("required", phone_message(&e))),
        Err(e @ PhoneError::Format) => Err(error("phone_format", phone_message(&e))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::location::LocationOption;

    fn complete() -> AddressForm {
        AddressForm {
            full_name: " Nguyen Van A ".into(), phone_number: "0912345678".into(),
            province_code: "01".into(), province_name: "Ha Noi".into(),
            district_code: "002".into(), district_name: "Hoan Kiem".into(),
            ward_code: "00037".into(), ward_name: "Phuc Tan".into(),
            street_address: "1 Hang Bac".into(), is_default: false,
        }
    }

    #[test]
    fn test_valid_form() {
        let details = complete().into_details().unwrap();
        assert_eq!(details.full_name, "Nguyen Van A");
        assert_eq!(details.phone_number.as_str(), "0912345678");
    }

    #[test]
    fn test_every_failing_field_reported() {
        let errors = AddressForm { phone_number: "12345".into(), ..AddressForm::default() }.into_details().unwrap_err();
        assert_eq!(errors.len(), 6);
        assert_eq!(errors.get(AddressField::PhoneNumber), Some("Phone number must be 10 digits"));
        assert_eq!(errors.get(AddressField::Ward), Some("Please choose a ward"));
    }

    #[test]
    fn test_blank_values_rejected() {
        let form = AddressForm { full_name: "   ".into(), street_address: "\t".into(), phone_number: String::new(), ..complete() };
        let errors = form.into_details().unwrap_err();
        let fields: Vec<_> = errors.fields().collect();
        assert_eq!(fields, vec![AddressField::FullName, AddressField::PhoneNumber, AddressField::StreetAddress]);
        assert_eq!(errors.get(AddressField::PhoneNumber), Some("Please enter a phone number"));
    }

    #[test]
    fn test_from_parts_uses_selection() {
        let draft = AddressDraft { full_name: "A".into(), phone_number: "0912345678".into(), street_address: "S".into(), is_default: true };
        let location = SelectedLocation { province: Some(LocationOption::new("01", "Ha Noi")), district: None, ward: None };
        let form = AddressForm::from_parts(&draft, &location);
        assert_eq!(form.province_name, "Ha Noi");
        assert!(form.district_code.is_empty());
        let errors = form.into_details().unwrap_err();
        assert!(errors.contains(AddressField::District));
        assert!(errors.contains(AddressField::Ward));
        assert!(!errors.contains(AddressField::Province));
    }

    #[test]
    fn test_errors_serialize_by_field() {
        let errors = AddressForm::default().into_details().unwrap_err();
        let json = serde_json::to_value(&errors).unwrap();
        assert_eq!(json["streetAddress"], "Please enter the street address");
    }
}

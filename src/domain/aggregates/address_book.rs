//! Address Book Aggregate
//!
//! A user's saved delivery addresses. Whenever the book is non-empty exactly
//! one address is the default.

use serde::{Deserialize, Serialize};
use uuid::Uuid;
use crate::domain::events::{AddressEvent, DomainEvent};
use crate::domain::value_objects::PhoneNumber;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Address {
    pub id: String,
    pub full_name: String,
    pub phone_number: PhoneNumber,
    pub province_code: String,
    pub province_name: String,
    pub district_code: String,
    pub district_name: String,
    pub ward_code: String,
    pub ward_name: String,
    pub street_address: String,
    pub is_default: bool,
}

impl Address {
    /// "street, ward, district, province"
    pub fn display_line(&self) -> String {
        format!("{}, {}, {}, {}", self.street_address, self.ward_name, self.district_name, self.province_name)
    }

    #[cfg(test)]
    pub(crate) fn for_test() -> Self {
        Self {
            id: "a1".into(),
            full_name: "Nguyen Van A".into(),
            phone_number: PhoneNumber::parse("0912345678").expect("valid phone"),
            province_code: "01".into(),
            province_name: "Ha Noi".into(),
            district_code: "002".into(),
            district_name: "Hoan Kiem".into(),
            ward_code: "00037".into(),
            ward_name: "Phuc Tan".into(),
            street_address: "1 Hang Bac".into(),
            is_default: true,
        }
    }
}

/// Validated address content, without identity.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AddressDetails {
    pub full_name: String,
    pub phone_number: PhoneNumber,
    pub province_code: String,
    pub province_name: String,
    pub district_code: String,
    pub district_name: String,
    pub ward_code: String,
    pub ward_name: String,
    pub street_address: String,
    pub is_default: bool,
}

impl AddressDetails {
    fn into_address(self, id: String) -> Address {
        Address {
            id, full_name: self.full_name, phone_number: self.phone_number,
            province_code: self.province_code, province_name: self.province_name,
            district_code: self.district_code, district_name: self.district_name,
            ward_code: self.ward_code, ward_name: self.ward_name,
            street_address: self.street_address, is_default: self.is_default,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "Vec<Address>", into = "Vec<Address>")]
pub struct AddressBook {
    addresses: Vec<Address>,
    events: Vec<DomainEvent>,
}

impl AddressBook {
    pub fn new() -> Self { Self::default() }

    pub fn addresses(&self) -> &[Address] { &self.addresses }
    pub fn len(&self) -> usize { self.addresses.len() }
    pub fn is_empty(&self) -> bool { self.addresses.is_empty() }
    pub fn get(&self, id: &str) -> Option<&Address> { self.addresses.iter().find(|a| a.id == id) }
    pub fn default_address(&self) -> Option<&Address> { self.addresses.iter().find(|a| a.is_default) }

    /// The first address saved becomes the default regardless of the flag.
    pub fn add(&mut self, details: AddressDetails) -> &Address {
        let id = Uuid::new_v4().to_string();
        let make_default = details.is_default || self.addresses.is_empty();
        if make_default {
            self.demote_all();
        }
        let mut address = details.into_address(id.clone());
        address.is_default = make_default;
        self.addresses.push(address);
        self.raise_event(AddressEvent::Added { address_id: id.clone() });
        if make_default {
            self.raise_event(AddressEvent::DefaultChanged { address_id: id });
        }
        let last = self.addresses.len() - 1;
        &self.addresses[last]
    }

    pub fn update(&mut self, id: &str, details: AddressDetails) -> Result<&Address, AddressBookError> {
        let index = self.position(id)?;
        let was_default = self.addresses[index].is_default;
        let make_default = details.is_default;
        if make_default {
            self.demote_all();
        }
        self.addresses[index] = details.into_address(id.to_string());
        self.raise_event(AddressEvent::Updated { address_id: id.to_string() });
        if make_default && !was_default {
            self.raise_event(AddressEvent::DefaultChanged { address_id: id.to_string() });
        }
        self.ensure_default();
        Ok(&self.addresses[index])
    }

    /// Removing the default promotes the first remaining address.
    pub fn remove(&mut self, id: &str) -> Result<Address, AddressBookError> {
        let index = self.position(id)?;
        let removed = self.addresses.remove(index);
        self.raise_event(AddressEvent::Removed { address_id: removed.id.clone() });
        self.ensure_default();
        Ok(removed)
    }

    pub fn set_default(&mut self, id: &str) -> Result<(), AddressBookError> {
        let index = self.position(id)?;
        if self.addresses[index].is_default {
            return Ok(());
        }
        self.demote_all();
        self.addresses[index].is_default = true;
        self.raise_event(AddressEvent::DefaultChanged { address_id: id.to_string() });
        Ok(())
    }

    pub fn take_events(&mut self) -> Vec<DomainEvent> { std::mem::take(&mut self.events) }

    fn position(&self, id: &str) -> Result<usize, AddressBookError> {
        self.addresses.iter().position(|a| a.id == id).ok_or_else(|| AddressBookError::NotFound(id.to_string()))
    }

    fn demote_all(&mut self) {
        for address in &mut self.addresses {
            address.is_default = false;
        }
    }

    /// Restores "exactly one default": keeps the first flagged address, or
    /// promotes the first address when none is flagged.
    fn ensure_default(&mut self) {
        let mut seen = false;
        for address in &mut self.addresses {
            if address.is_default && seen {
                address.is_default = false;
            }
            seen |= address.is_default;
        }
        if !seen {
            if let Some(first) = self.addresses.first_mut() {
                first.is_default = true;
                let address_id = first.id.clone();
                self.raise_event(AddressEvent::DefaultChanged { address_id });
            }
        }
    }

    fn raise_event(&mut self, e: AddressEvent) { self.events.push(DomainEvent::Address(e)); }
}

impl From<Vec<Address>> for AddressBook {
    fn from(addresses: Vec<Address>) -> Self {
        let mut book = Self { addresses, events: vec![] };
        book.ensure_default();
        book.events.clear();
        book
    }
}

impl From<AddressBook> for Vec<Address> {
    fn from(book: AddressBook) -> Self { book.addresses }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AddressBookError {
    #[error("address {0} not found")]
    NotFound(String),
}

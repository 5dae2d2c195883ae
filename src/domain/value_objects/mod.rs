//! Value Objects for the storefront

use regex::Regex;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::LazyLock;

static PHONE_PATTERN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[0-9]{10}$").expect("phone pattern compiles"));

/// Identifier of a storefront user; keys carts and address books.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(String);

impl UserId {
    pub fn new(value: impl Into<String>) -> Result<Self, IdError> {
        let value = value.into().trim().to_string();
        if value.is_empty() { return Err(IdError::Empty); }
        Ok(Self(value))
    }
    pub fn as_str(&self) -> &str { &self.0 }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "{}", self.0) }
}

/// Catalog product identifier, the unique key of a cart line.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProductId(String);

impl ProductId {
    pub fn new(value: impl Into<String>) -> Self { Self(value.into()) }
    pub fn as_str(&self) -> &str { &self.0 }
}

impl fmt::Display for ProductId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "{}", self.0) }
}

impl From<&str> for ProductId {
    fn from(value: &str) -> Self { Self::new(value) }
}

impl PartialEq<str> for ProductId {
    fn eq(&self, other: &str) -> bool { self.0 == other }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IdError {
    #[error("identifier is empty")]
    Empty,
}

/// Ten-digit phone number as accepted by the address form.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PhoneNumber(String);

impl PhoneNumber {
    pub fn parse(value: impl Into<String>) -> Result<Self, PhoneError> {
        let value = value.into();
        let trimmed = value.trim();
        if trimmed.is_empty() { return Err(PhoneError::Empty); }
        if !Self::is_valid(trimmed) { return Err(PhoneError::Format); }
        Ok(Self(trimmed.to_string()))
    }
    pub fn is_valid(value: &str) -> bool { PHONE_PATTERN.is_match(value) }
    pub fn as_str(&self) -> &str { &self.0 }
}

impl TryFrom<String> for PhoneNumber {
    type Error = PhoneError;
    fn try_from(value: String) -> Result<Self, Self::Error> { Self::parse(value) }
}

impl From<PhoneNumber> for String {
    fn from(value: PhoneNumber) -> Self { value.0 }
}

impl fmt::Display for PhoneNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "{}", self.0) }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PhoneError {
    #[error("phone number is empty")]
    Empty,
    #[error("phone number must be exactly 10 digits")]
    Format,
}

/// Money value object
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Money { amount: Decimal, currency: String }

impl Money {
    pub fn new(amount: Decimal, currency: &str) -> Self { Self { amount, currency: currency.to_uppercase() } }
    pub fn usd(amount: Decimal) -> Self { Self::new(amount, "USD") }
    pub fn zero(currency: &str) -> Self { Self::new(Decimal::ZERO, currency) }
    pub fn amount(&self) -> Decimal { self.amount }
    pub fn currency(&self) -> &str { &self.currency }
    pub fn is_negative(&self) -> bool { self.amount.is_sign_negative() && !self.amount.is_zero() }
    pub fn checked_add(&self, other: &Money) -> Result<Money, MoneyError> {
        if self.currency != other.currency { return Err(MoneyError::CurrencyMismatch); }
        let amount = self.amount.checked_add(other.amount).ok_or(MoneyError::Overflow)?;
        Ok(Money::new(amount, &self.currency))
    }
    pub fn checked_sub(&self, other: &Money) -> Result<Money, MoneyError> {
        if self.currency != other.currency { return Err(MoneyError::CurrencyMismatch); }
        let amount = self.amount.checked_sub(other.amount).ok_or(MoneyError::Overflow)?;
        Ok(Money::new(amount, &self.currency))
    }
    pub fn checked_multiply(&self, qty: u32) -> Result<Money, MoneyError> {
        let amount = self.amount.checked_mul(Decimal::from(qty)).ok_or(MoneyError::Overflow)?;
        Ok(Money::new(amount, &self.currency))
    }
}

impl Default for Money { fn default() -> Self { Self::zero("USD") } }

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "{} {:.2}", self.currency, self.amount) }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MoneyError {
    #[error("currency mismatch")]
    CurrencyMismatch,
    #[error("amount out of range")]
    Overflow,
}

/// Line quantity; never below one.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct Quantity(u32);

impl Quantity {
    pub const ONE: Quantity = Quantity(1);

    /// Raises zero to one.
    pub fn at_least_one(value: u32) -> Self { Self(value.max(1)) }
    pub fn value(&self) -> u32 { self.0 }
    /// `None` at `u32::MAX`.
    pub fn checked_increment(&self) -> Option<Self> { self.0.checked_add(1).map(Self) }
    /// `None` when the result would drop below one.
    pub fn decrement(&self) -> Option<Self> {
        if self.0 <= 1 { None } else { Some(Self(self.0 - 1)) }
    }
}

impl Default for Quantity { fn default() -> Self { Self::ONE } }

impl TryFrom<u32> for Quantity {
    type Error = QuantityError;
    fn try_from(value: u32) -> Result<Self, Self::Error> {
        if value == 0 { return Err(QuantityError::Zero); }
        Ok(Self(value))
    }
}

impl From<Quantity> for u32 {
    fn from(value: Quantity) -> Self { value.0 }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum QuantityError {
    #[error("quantity must be at least 1")]
    Zero,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_phone_number() {
        assert_eq!(PhoneNumber::parse(" 0912345678 ").unwrap().as_str(), "0912345678");
        assert_eq!(PhoneNumber::parse("").unwrap_err(), PhoneError::Empty);
        assert_eq!(PhoneNumber::parse("091234567").unwrap_err(), PhoneError::Format);
        assert_eq!(PhoneNumber::parse("09123456789").unwrap_err(), PhoneError::Format);
        assert_eq!(PhoneNumber::parse("09123x5678").unwrap_err(), PhoneError::Format);
    }

    #[test]
    fn test_money_add() {
        let a = Money::usd(Decimal::new(100, 0));
        let b = Money::usd(Decimal::new(50, 0));
        assert_eq!(a.checked_add(&b).unwrap().amount(), Decimal::new(150, 0));
        assert_eq!(a.checked_add(&Money::zero("vnd")), Err(MoneyError::CurrencyMismatch));
        assert_eq!(a.checked_sub(&b).unwrap().amount(), Decimal::new(50, 0));
    }

    #[test]
    fn test_money_overflow_is_an_error() {
        let max = Money::usd(Decimal::MAX);
        assert_eq!(max.checked_multiply(2), Err(MoneyError::Overflow));
        assert_eq!(max.checked_add(&Money::usd(Decimal::ONE)), Err(MoneyError::Overflow));
        assert_eq!(Money::usd(Decimal::MIN).checked_sub(&Money::usd(Decimal::ONE)), Err(MoneyError::Overflow));
        assert_eq!(max.checked_multiply(1), Ok(max.clone()));
    }

    #[test]
    fn test_quantity_floor() {
        assert_eq!(Quantity::at_least_one(0).value(), 1);
        assert_eq!(Quantity::ONE.decrement(), None);
        assert_eq!(Quantity::at_least_one(2).decrement(), Some(Quantity::ONE));
        assert_eq!(Quantity::ONE.checked_increment(), Some(Quantity::at_least_one(2)));
        assert_eq!(Quantity::at_least_one(u32::MAX).checked_increment(), None);
        assert!(serde_json::from_str::<Quantity>("0").is_err());
    }

    #[test]
    fn test_user_id_rejects_blank() {
        assert_eq!(UserId::new("  "), Err(IdError::Empty));
        assert_eq!(UserId::new("u-1").unwrap().as_str(), "u-1");
    }
}

//! Cart Aggregate
//!
//! In-session shopping cart keyed by product id. Every operation is total:
//! requests that would break an invariant are reported as
//! [`CartOutcome::Ignored`] and leave the cart untouched.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use crate::domain::events::{CartEvent, DomainEvent};
use crate::domain::value_objects::{Money, ProductId, Quantity, UserId};
use crate::session::Session;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartLine {
    pub product_id: ProductId,
    pub name: String,
    pub unit_price: Money,
    pub previous_price: Option<Money>,
    pub quantity: Quantity,
    pub image_refs: Vec<String>,
}

impl CartLine {
    /// Saturating; a cart never admits a line whose total leaves the decimal range.
    pub fn line_total(&self) -> Money {
        Money::new(self.unit_price.amount().saturating_mul(Decimal::from(self.quantity.value())), self.unit_price.currency())
    }
}

/// Product as handed over by a product-detail view.
#[derive(Clone, Debug)]
pub struct NewCartLine {
    pub product_id: ProductId,
    pub name: String,
    pub unit_price: Money,
    pub previous_price: Option<Money>,
    pub quantity: u32,
    pub image_refs: Vec<String>,
}

impl NewCartLine {
    pub fn new(product_id: impl Into<ProductId>, name: impl Into<String>, unit_price: Money) -> Self {
        Self { product_id: product_id.into(), name: name.into(), unit_price, previous_price: None, quantity: 1, image_refs: vec![] }
    }
    pub fn with_quantity(mut self, quantity: u32) -> Self { self.quantity = quantity; self }
    pub fn with_previous_price(mut self, price: Money) -> Self { self.previous_price = Some(price); self }
    pub fn with_images(mut self, refs: Vec<String>) -> Self { self.image_refs = refs; self }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CartOutcome {
    Applied,
    Ignored(Ignored),
}

impl CartOutcome {
    pub fn is_applied(&self) -> bool { matches!(self, Self::Applied) }
}

/// Why a cart operation was a no-op.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Ignored {
    AlreadyInCart,
    NotInCart,
    AtMinimumQuantity,
    CurrencyMismatch,
    NegativePrice,
    /// The subtotal would no longer be representable.
    AmountTooLarge,
}

#[derive(Clone, Debug)]
pub struct CartStore {
    owner: UserId,
    currency: String,
    lines: Vec<CartLine>,
    updated_at: DateTime<Utc>,
    events: Vec<DomainEvent>,
}

/// Serializable form of a cart for the durable variant.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartSnapshot {
    pub owner: UserId,
    pub currency: String,
    pub lines: Vec<CartLine>,
    pub updated_at: DateTime<Utc>,
}

impl CartStore {
    pub fn new(owner: UserId, currency: &str) -> Self {
        Self { owner, currency: currency.to_uppercase(), lines: vec![], updated_at: Utc::now(), events: vec![] }
    }

    pub fn for_session(session: &Session, currency: &str) -> Self { Self::new(session.user_id().clone(), currency) }

    /// Rebuilds a cart from a snapshot, keeping the first line per product and
    /// dropping lines priced in another currency.
    pub fn restore(snapshot: CartSnapshot) -> Self {
        let mut cart = Self::new(snapshot.owner, &snapshot.currency);
        for line in snapshot.lines {
            if cart.contains(line.product_id.as_str())
                || line.unit_price.currency() != cart.currency
                || !cart.total_fits(&line.product_id, &line.unit_price, line.quantity.value())
            {
                tracing::warn!(product_id = %line.product_id, "dropping inconsistent cart line from snapshot");
                continue;
            }
            cart.lines.push(line);
        }
        cart.updated_at = snapshot.updated_at;
        cart
    }

    pub fn snapshot(&self) -> CartSnapshot {
        CartSnapshot { owner: self.owner.clone(), currency: self.currency.clone(), lines: self.lines.clone(), updated_at: self.updated_at }
    }

    pub fn owner(&self) -> &UserId { &self.owner }
    pub fn currency(&self) -> &str { &self.currency }
    pub fn lines(&self) -> &[CartLine] { &self.lines }
    pub fn line(&self, product_id: &str) -> Option<&CartLine> { self.lines.iter().find(|l| l.product_id == *product_id) }
    pub fn contains(&self, product_id: &str) -> bool { self.line(product_id).is_some() }
    pub fn len(&self) -> usize { self.lines.len() }
    pub fn is_empty(&self) -> bool { self.lines.is_empty() }
    pub fn updated_at(&self) -> DateTime<Utc> { self.updated_at }
    pub fn total_quantity(&self) -> u32 { self.lines.iter().map(|l| l.quantity.value()).sum() }

    /// Adds a product; an already present product is left as is.
    pub fn add_item(&mut self, item: NewCartLine) -> CartOutcome {
        if self.contains(item.product_id.as_str()) { return CartOutcome::Ignored(Ignored::AlreadyInCart); }
        if item.unit_price.currency() != self.currency { return CartOutcome::Ignored(Ignored::CurrencyMismatch); }
        if item.unit_price.is_negative() { return CartOutcome::Ignored(Ignored::NegativePrice); }
        let quantity = Quantity::at_least_one(item.quantity);
        if !self.total_fits(&item.product_id, &item.unit_price, quantity.value()) { return CartOutcome::Ignored(Ignored::AmountTooLarge); }
        self.raise_event(CartEvent::ItemAdded { product_id: item.product_id.clone(), quantity: quantity.value() });
        self.lines.push(CartLine {
            product_id: item.product_id, name: item.name, unit_price: item.unit_price,
            previous_price: item.previous_price, quantity, image_refs: item.image_refs,
        });
        self.touch();
        CartOutcome::Applied
    }

    pub fn increase_quantity(&mut self, product_id: &str) -> CartOutcome {
        let Some(index) = self.lines.iter().position(|l| l.product_id == *product_id) else {
            return CartOutcome::Ignored(Ignored::NotInCart);
        };
        let line = &self.lines[index];
        let quantity = match line.quantity.checked_increment() {
            Some(q) if self.total_fits(&line.product_id, &line.unit_price, q.value()) => q,
            _ => return CartOutcome::Ignored(Ignored::AmountTooLarge),
        };
        let line = &mut self.lines[index];
        line.quantity = quantity;
        let event = CartEvent::QuantityChanged { product_id: line.product_id.clone(), quantity: quantity.value() };
        self.raise_event(event);
        self.touch();
        CartOutcome::Applied
    }

    /// Never removes the line; use [`CartStore::remove_item`] for that.
    pub fn decrease_quantity(&mut self, product_id: &str) -> CartOutcome {
        let Some(line) = self.lines.iter_mut().find(|l| l.product_id == *product_id) else {
            return CartOutcome::Ignored(Ignored::NotInCart);
        };
        let Some(quantity) = line.quantity.decrement() else {
            return CartOutcome::Ignored(Ignored::AtMinimumQuantity);
        };
        line.quantity = quantity;
        let event = CartEvent::QuantityChanged { product_id: line.product_id.clone(), quantity: quantity.value() };
        self.raise_event(event);
        self.touch();
        CartOutcome::Applied
    }

    pub fn remove_item(&mut self, product_id: &str) -> CartOutcome {
        let Some(index) = self.lines.iter().position(|l| l.product_id == *product_id) else {
            return CartOutcome::Ignored(Ignored::NotInCart);
        };
        let line = self.lines.remove(index);
        self.raise_event(CartEvent::ItemRemoved { product_id: line.product_id });
        self.touch();
        CartOutcome::Applied
    }

    pub fn clear(&mut self) {
        let lines = self.lines.len();
        self.lines.clear();
        self.raise_event(CartEvent::Cleared { lines });
        self.touch();
    }

    /// Recomputed on every call.
    pub fn subtotal(&self) -> Money {
        let amount = self.lines.iter().fold(Decimal::ZERO, |acc, l| acc.saturating_add(l.line_total().amount()));
        Money::new(amount, &self.currency)
    }

    /// Total discount against previous prices, for display.
    pub fn savings(&self) -> Money {
        self.lines.iter().fold(Money::zero(&self.currency), |acc, l| match &l.previous_price {
            Some(prev) if prev.currency() == self.currency && prev.amount() > l.unit_price.amount() => {
                let saved = (prev.amount() - l.unit_price.amount()).saturating_mul(Decimal::from(l.quantity.value()));
                Money::new(acc.amount().saturating_add(saved), &self.currency)
            }
            _ => acc,
        })
    }

    pub fn take_events(&mut self) -> Vec<DomainEvent> { std::mem::take(&mut self.events) }

    /// Whether the subtotal stays representable with `product_id` at `price` × `quantity`.
    fn total_fits(&self, product_id: &ProductId, price: &Money, quantity: u32) -> bool {
        self.lines
            .iter()
            .filter(|l| l.product_id != *product_id)
            .map(|l| (&l.unit_price, l.quantity.value()))
            .chain([(price, quantity)])
            .try_fold(Decimal::ZERO, |sum, (price, qty)| sum.checked_add(price.amount().checked_mul(Decimal::from(qty))?))
            .is_some()
    }

    fn raise_event(&mut self, e: CartEvent) { self.events.push(DomainEvent::Cart(e)); }
    fn touch(&mut self) { self.updated_at = Utc::now(); }
}

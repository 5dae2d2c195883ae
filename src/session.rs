//! Explicit user session handed to the cart and address components.

use chrono::{DateTime, Utc};

use crate::domain::aggregates::CartStore;
use crate::domain::value_objects::UserId;

/// Signed-in user context. Components borrow it at construction instead of
/// reaching for ambient state.
#[derive(Clone, Debug)]
pub struct Session {
    user_id: UserId,
    started_at: DateTime<Utc>,
}

impl Session {
    pub fn new(user_id: UserId) -> Self {
        tracing::debug!(user_id = %user_id, "session started");
        Self { user_id, started_at: Utc::now() }
    }

    pub fn user_id(&self) -> &UserId { &self.user_id }
    pub fn started_at(&self) -> DateTime<Utc> { self.started_at }

    /// Ends the session. The user's cart does not outlive it.
    pub fn logout(self, cart: &mut CartStore) {
        if cart.owner() != &self.user_id {
            tracing::warn!(user_id = %self.user_id, owner = %cart.owner(), "logout with a cart owned by another user");
        }
        cart.clear();
        tracing::debug!(user_id = %self.user_id, "session ended");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::aggregates::NewCartLine;
    use crate::domain::value_objects::Money;
    use rust_decimal::Decimal;

    #[test]
    fn test_logout_clears_cart() {
        let session = Session::new(UserId::new("u1").unwrap());
        let mut cart = CartStore::for_session(&session, "usd");
        cart.add_item(NewCartLine::new("p1", "Shirt", Money::usd(Decimal::new(12, 0))));
        assert_eq!(cart.owner().as_str(), "u1");
        session.logout(&mut cart);
        assert!(cart.is_empty());
        assert_eq!(cart.subtotal().amount(), Decimal::ZERO);
    }
}

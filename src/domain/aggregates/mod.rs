//! Aggregates module
pub mod cart;
pub mod address_book;
pub mod order;

pub use cart::{CartLine, CartOutcome, CartSnapshot, CartStore, Ignored, NewCartLine};
pub use address_book::{Address, AddressBook, AddressBookError, AddressDetails};
pub use order::{Customer, Order, OrderError, OrderItem, OrderStatus, PaymentStatus, ShippingAddress};

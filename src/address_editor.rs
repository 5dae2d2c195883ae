//! Create, edit, delete and re-default a user's saved addresses.
//!
//! Every change is applied to a copy of the address book and the whole copy
//! is written to the store; the editor only adopts it once the write
//! succeeded. A failed write leaves the book and the form as they were so
//! the user can retry.

use thiserror::Error;

use crate::address_form::{AddressDraft, AddressForm, FieldErrors};
use crate::domain::aggregates::{Address, AddressBook, AddressBookError};
use crate::location::{LocationOption, LocationService};
use crate::selector::{AddressSelector, FetchOutcome, SelectorError};
use crate::session::Session;
use crate::storage::{AddressRepository, StorageError};

pub const SAVE_FAILED_NOTICE: &str = "We couldn't save your addresses. Please try again.";

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum EditMode {
    Creating,
    Editing(String),
}

#[derive(Debug, Error)]
pub enum EditorError {
    #[error("{0}")]
    Validation(FieldErrors),
    #[error(transparent)]
    Selector(#[from] SelectorError),
    #[error(transparent)]
    AddressBook(#[from] AddressBookError),
    #[error("could not save addresses: {0}")]
    Persistence(#[source] StorageError),
}

pub struct AddressEditor<'a> {
    session: &'a Session,
    locations: &'a dyn LocationService,
    repository: &'a AddressRepository,
    book: AddressBook,
    selector: AddressSelector,
    draft: AddressDraft,
    mode: EditMode,
    errors: FieldErrors,
    notice: Option<String>,
}

impl<'a> AddressEditor<'a> {
    /// Loads the user's addresses and the province list. An unreachable
    /// location service only leaves the province list empty.
    pub async fn open(session: &'a Session, locations: &'a dyn LocationService, repository: &'a AddressRepository) -> Result<AddressEditor<'a>, StorageError> {
        let book = repository.load(session.user_id()).await.inspect_err(|e| {
            tracing::error!(user_id = %session.user_id(), error = %e, "failed to load addresses");
        })?;
        let mut editor = Self {
            session, locations, repository, book,
            selector: AddressSelector::new(),
            draft: AddressDraft::default(),
            mode: EditMode::Creating,
            errors: FieldErrors::default(),
            notice: None,
        };
        editor.selector.refresh_provinces(locations).await;
        editor.begin_new();
        Ok(editor)
    }

    pub fn book(&self) -> &AddressBook { &self.book }
    pub fn selector(&self) -> &AddressSelector { &self.selector }
    pub fn draft(&self) -> &AddressDraft { &self.draft }
    pub fn draft_mut(&mut self) -> &mut AddressDraft { &mut self.draft }
    pub fn mode(&self) -> &EditMode { &self.mode }
    pub fn errors(&self) -> &FieldErrors { &self.errors }
    pub fn notice(&self) -> Option<&str> { self.notice.as_deref() }

    /// Empty form; the very first address defaults to being the default.
    pub fn begin_new(&mut self) {
        self.mode = EditMode::Creating;
        self.draft = AddressDraft { is_default: self.book.is_empty(), ..AddressDraft::default() };
        self.selector.reset();
        self.errors = FieldErrors::default();
    }

    pub async fn begin_edit(&mut self, id: &str) -> Result<(), EditorError> {
        let address = self.book.get(id).cloned().ok_or_else(|| AddressBookError::NotFound(id.to_string()))?;
        self.mode = EditMode::Editing(address.id.clone());
        self.draft = AddressDraft {
            full_name: address.full_name.clone(),
            phone_number: address.phone_number.to_string(),
            street_address: address.street_address.clone(),
            is_default: address.is_default,
        };
        self.errors = FieldErrors::default();
        self.selector.prefill(self.locations, &address).await?;
        Ok(())
    }

    pub async fn choose_province(&mut self, choice: Option<LocationOption>) -> Result<Option<FetchOutcome>, EditorError> {
        Ok(self.selector.choose_province(self.locations, choice).await?)
    }

    pub async fn choose_district(&mut self, choice: Option<LocationOption>) -> Result<Option<FetchOutcome>, EditorError> {
        Ok(self.selector.choose_district(self.locations, choice).await?)
    }

    pub async fn choose_ward(&mut self, choice: Option<LocationOption>) -> Result<Option<FetchOutcome>, EditorError> {
        Ok(self.selector.choose_ward(self.locations, choice).await?)
    }

    /// Validates the form and saves it as a new or edited address.
    pub async fn submit(&mut self) -> Result<Address, EditorError> {
        let form = AddressForm::from_parts(&self.draft, &self.selector.selection());
        let details = match form.into_details() {
            Ok(details) => details,
            Err(errors) => {
                self.errors = errors.clone();
                return Err(EditorError::Validation(errors));
            }
        };
        self.errors = FieldErrors::default();

        let mut next = self.book.clone();
        let saved = match &self.mode {
            EditMode::Creating => next.add(details).clone(),
            EditMode::Editing(id) => next.update(id, details)?.clone(),
        };
        self.commit(next).await?;
        self.begin_new();
        Ok(saved)
    }

    pub async fn delete(&mut self, id: &str) -> Result<Address, EditorError> {
        let mut next = self.book.clone();
        let removed = next.remove(id)?;
        self.commit(next).await?;
        if self.mode == EditMode::Editing(removed.id.clone()) {
            self.begin_new();
        }
        Ok(removed)
    }

    pub async fn set_default(&mut self, id: &str) -> Result<(), EditorError> {
        let mut next = self.book.clone();
        next.set_default(id)?;
        self.commit(next).await
    }

    async fn commit(&mut self, mut next: AddressBook) -> Result<(), EditorError> {
        let user_id = self.session.user_id();
        match self.repository.save(user_id, &next).await {
            Ok(()) => {
                for event in next.take_events() {
                    tracing::debug!(%user_id, ?event, "address book changed");
                }
                self.book = next;
                self.notice = None;
                Ok(())
            }
            Err(e) => {
                tracing::error!(%user_id, error = %e, "failed to save addresses");
                self.notice = Some(SAVE_FAILED_NOTICE.to_string());
                Err(EditorError::Persistence(e))
            }
        }
    }
}

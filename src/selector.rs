//! Cascading province → district → ward selection.
//!
//! Changing a level synchronously clears every level below it before the
//! child fetch is issued. Each fetch is described by a [`FetchRequest`] that
//! records which parent selection started it; a result is applied only while
//! that request is still the one pending for its level, so a late answer for
//! a superseded selection is dropped instead of overwriting newer options.

use thiserror::Error;

use crate::domain::aggregates::Address;
use crate::location::{LocationError, LocationLevel, LocationOption, LocationService};

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum LevelState {
    #[default]
    Unselected,
    Loading,
    Ready,
    Selected(LocationOption),
}

/// A pending option-list fetch, tagged with the selection that triggered it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FetchRequest {
    level: LocationLevel,
    parent_code: Option<String>,
    generation: u64,
}

impl FetchRequest {
    pub fn level(&self) -> LocationLevel { self.level }
    pub fn parent_code(&self) -> Option<&str> { self.parent_code.as_deref() }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FetchOutcome {
    Applied(usize),
    /// The fetch failed; the level is usable with an empty list.
    Degraded,
    /// A newer selection superseded this request; the result was dropped.
    Stale,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SelectorError {
    #[error("cannot select a {level} before its parent")]
    ParentNotSelected { level: LocationLevel },
    #[error("{code} is not a known {level}")]
    UnknownOption { level: LocationLevel, code: String },
    #[error("the {level} list is still loading")]
    StillLoading { level: LocationLevel },
}

/// Province, district and ward as currently chosen.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SelectedLocation {
    pub province: Option<LocationOption>,
    pub district: Option<LocationOption>,
    pub ward: Option<LocationOption>,
}

#[derive(Clone, Debug, Default)]
struct Slot {
    state: LevelState,
    options: Vec<LocationOption>,
    error: Option<String>,
    pending: Option<FetchRequest>,
}

impl Slot {
    fn selected(&self) -> Option<&LocationOption> {
        match &self.state { LevelState::Selected(option) => Some(option), _ => None }
    }

    fn invalidate(&mut self) {
        *self = Slot::default();
    }
}

#[derive(Clone, Debug, Default)]
pub struct AddressSelector {
    slots: [Slot; 3],
    generation: u64,
}

impl AddressSelector {
    pub fn new() -> Self { Self::default() }

    pub fn state(&self, level: LocationLevel) -> &LevelState { &self.slot(level).state }
    pub fn options(&self, level: LocationLevel) -> &[LocationOption] { &self.slot(level).options }
    pub fn error(&self, level: LocationLevel) -> Option<&str> { self.slot(level).error.as_deref() }
    pub fn pending(&self, level: LocationLevel) -> Option<&FetchRequest> { self.slot(level).pending.as_ref() }
    pub fn selected(&self, level: LocationLevel) -> Option<&LocationOption> { self.slot(level).selected() }
    pub fn has_selection(&self, level: LocationLevel) -> bool { self.selected(level).is_some() }
    pub fn is_loading(&self, level: LocationLevel) -> bool { self.slot(level).state == LevelState::Loading }

    pub fn selection(&self) -> SelectedLocation {
        SelectedLocation {
            province: self.selected(LocationLevel::Province).cloned(),
            district: self.selected(LocationLevel::District).cloned(),
            ward: self.selected(LocationLevel::Ward).cloned(),
        }
    }

    /// Drops all selections. The province list is kept since it does not depend on anything.
    pub fn reset(&mut self) {
        let province = &mut self.slots[LocationLevel::Province.index()];
        if province.selected().is_some() {
            province.state = LevelState::Unselected;
        }
        self.invalidate_below(LocationLevel::Province);
    }

    /// Starts (or restarts) loading the province list.
    pub fn load_provinces(&mut self) -> FetchRequest {
        let request = self.next_request(LocationLevel::Province, None);
        let slot = self.slot_mut(LocationLevel::Province);
        if slot.selected().is_none() {
            slot.state = LevelState::Loading;
        }
        slot.pending = Some(request.clone());
        request
    }

    pub fn select_province(&mut self, choice: Option<LocationOption>) -> Result<Option<FetchRequest>, SelectorError> {
        self.select(LocationLevel::Province, choice)
    }

    pub fn select_district(&mut self, choice: Option<LocationOption>) -> Result<Option<FetchRequest>, SelectorError> {
        self.select(LocationLevel::District, choice)
    }

    pub fn select_ward(&mut self, choice: Option<LocationOption>) -> Result<Option<FetchRequest>, SelectorError> {
        self.select(LocationLevel::Ward, choice)
    }

    /// Sets or clears `level`. `None` and sentinel options clear it. Returns
    /// the child fetch to run, if any.
    pub fn select(&mut self, level: LocationLevel, choice: Option<LocationOption>) -> Result<Option<FetchRequest>, SelectorError> {
        let choice = choice.filter(|option| !option.is_sentinel());
        let Some(choice) = choice else {
            self.slot_mut(level).state = LevelState::Unselected;
            self.invalidate_below(level);
            tracing::debug!(%level, "location level cleared");
            return Ok(None);
        };

        if let Some(parent) = level.parent() {
            if self.selected(parent).is_none() {
                return Err(SelectorError::ParentNotSelected { level });
            }
        }
        let slot = self.slot(level);
        if slot.pending.is_some() || slot.state == LevelState::Loading {
            return Err(SelectorError::StillLoading { level });
        }
        let option = self.resolve(level, choice)?;

        self.invalidate_below(level);
        tracing::debug!(%level, code = %option.code, "location level selected");
        let code = option.code.clone();
        self.slot_mut(level).state = LevelState::Selected(option);

        let Some(child) = level.child() else { return Ok(None) };
        let request = self.next_request(child, Some(code));
        let slot = self.slot_mut(child);
        slot.state = LevelState::Loading;
        slot.pending = Some(request.clone());
        Ok(Some(request))
    }

    /// Applies a finished fetch if `request` is still current for its level.
    pub fn complete(&mut self, request: &FetchRequest, result: Result<Vec<LocationOption>, LocationError>) -> FetchOutcome {
        let level = request.level;
        let slot = self.slot_mut(level);
        if slot.pending.as_ref() != Some(request) {
            tracing::debug!(%level, parent = ?request.parent_code, "discarding stale location response");
            return FetchOutcome::Stale;
        }
        slot.pending = None;
        if slot.state == LevelState::Loading {
            slot.state = LevelState::Ready;
        }
        match result {
            Ok(options) => {
                let count = options.len();
                slot.options = options;
                slot.error = None;
                FetchOutcome::Applied(count)
            }
            Err(e) => {
                tracing::warn!(%level, parent = ?request.parent_code, error = %e, "location fetch failed, continuing without options");
                slot.options.clear();
                slot.error = Some(e.to_string());
                FetchOutcome::Degraded
            }
        }
    }

    /// Runs `request` against `service` and applies the result.
    pub async fn fetch<S>(&mut self, service: &S, request: FetchRequest) -> FetchOutcome
    where
        S: LocationService + ?Sized,
    {
        let result = service.options(request.level, request.parent_code.as_deref()).await;
        self.complete(&request, result)
    }

    pub async fn refresh_provinces<S>(&mut self, service: &S) -> FetchOutcome
    where
        S: LocationService + ?Sized,
    {
        let request = self.load_provinces();
        self.fetch(service, request).await
    }

    /// Selects and, when the level has children, loads the child list.
    pub async fn choose<S>(&mut self, service: &S, level: LocationLevel, choice: Option<LocationOption>) -> Result<Option<FetchOutcome>, SelectorError>
    where
        S: LocationService + ?Sized,
    {
        match self.select(level, choice)? {
            Some(request) => Ok(Some(self.fetch(service, request).await)),
            None => Ok(None),
        }
    }

    pub async fn choose_province<S: LocationService + ?Sized>(&mut self, service: &S, choice: Option<LocationOption>) -> Result<Option<FetchOutcome>, SelectorError> {
        self.choose(service, LocationLevel::Province, choice).await
    }

    pub async fn choose_district<S: LocationService + ?Sized>(&mut self, service: &S, choice: Option<LocationOption>) -> Result<Option<FetchOutcome>, SelectorError> {
        self.choose(service, LocationLevel::District, choice).await
    }

    pub async fn choose_ward<S: LocationService + ?Sized>(&mut self, service: &S, choice: Option<LocationOption>) -> Result<Option<FetchOutcome>, SelectorError> {
        self.choose(service, LocationLevel::Ward, choice).await
    }

    /// Rebuilds the cascade for a stored address: province, then its
    /// districts, then the district, then its wards, then the ward. A stored
    /// code that the service no longer lists stops the replay at that level.
    pub async fn prefill<S>(&mut self, service: &S, address: &Address) -> Result<(), SelectorError>
    where
        S: LocationService + ?Sized,
    {
        self.reset();
        if self.options(LocationLevel::Province).is_empty() {
            self.refresh_provinces(service).await;
        }
        let stored = [
            (LocationLevel::Province, &address.province_code, &address.province_name),
            (LocationLevel::District, &address.district_code, &address.district_name),
            (LocationLevel::Ward, &address.ward_code, &address.ward_name),
        ];
        for (level, code, name) in stored {
            if code.trim().is_empty() {
                break;
            }
            match self.choose(service, level, Some(LocationOption::new(code.as_str(), name.as_str()))).await {
                Ok(_) => {}
                Err(SelectorError::UnknownOption { level, code }) => {
                    tracing::warn!(%level, %code, address_id = %address.id, "stored location no longer offered");
                    break;
                }
                Err(e) => return Err(e),
            }
        }
        Ok(())
    }

    /// Free-form codes are only taken when the list could not be fetched.
    fn resolve(&self, level: LocationLevel, choice: LocationOption) -> Result<LocationOption, SelectorError> {
        let slot = self.slot(level);
        if slot.options.is_empty() && slot.error.is_some() {
            return Ok(LocationOption::new(choice.code.trim(), choice.name.trim()));
        }
        slot.options
            .iter()
            .find(|option| option.code == choice.code.trim())
            .cloned()
            .ok_or(SelectorError::UnknownOption { level, code: choice.code })
    }

    fn invalidate_below(&mut self, level: LocationLevel) {
        let mut next = level.child();
        while let Some(child) = next {
            self.slot_mut(child).invalidate();
            next = child.child();
        }
    }

    fn next_request(&mut self, level: LocationLevel, parent_code: Option<String>) -> FetchRequest {
        self.generation += 1;
        FetchRequest { level, parent_code, generation: self.generation }
    }

    fn slot(&self, level: LocationLevel) -> &Slot { &self.slots[level.index()] }
    fn slot_mut(&mut self, level: LocationLevel) -> &mut Slot { &mut self.slots[level.index()] }
}

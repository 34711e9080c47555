//! Photo Slots Aggregate
//!
//! Four fixed slots with at most one primary photo.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

/// Number of photo slots on a profile
pub const PHOTO_SLOT_COUNT: usize = 4;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PhotoSlot {
    pub id: u8,
    pub url: Option<String>,
    pub is_primary: bool,
}

impl PhotoSlot {
    pub fn has_photo(&self) -> bool {
        self.url.is_some()
    }
}

/// Photo slots aggregate root
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct PhotoSlots {
    slots: [PhotoSlot; PHOTO_SLOT_COUNT],
}

impl Default for PhotoSlots {
    fn default() -> Self {
        Self::new()
    }
}

impl PhotoSlots {
    /// Empty slots, slot 1 primary
    pub fn new() -> Self {
        Self {
            slots: [1u8, 2, 3, 4].map(|id| PhotoSlot { id, url: None, is_primary: id == 1 }),
        }
    }

    /// Rebuild from per-slot URLs in slot order (`None` keeps a slot empty).
    /// `primary` selects the first slot holding that URL, slot 1 otherwise.
    pub fn from_positions<'a>(urls: impl IntoIterator<Item = Option<&'a str>>, primary: Option<&str>) -> Self {
        let mut photos = Self::new();
        for (slot, url) in photos.slots.iter_mut().zip(urls) {
            slot.url = url.map(str::to_string);
        }
        let primary_id = primary.and_then(|primary| {
            photos
                .slots
                .iter()
                .find(|slot| slot.url.as_deref() == Some(primary))
                .map(|slot| slot.id)
        });
        if let Some(id) = primary_id {
            photos.set_primary(id);
        }
        photos
    }

    pub fn slots(&self) -> &[PhotoSlot] {
        &self.slots
    }

    pub fn get(&self, slot_id: u8) -> Option<&PhotoSlot> {
        self.slots.iter().find(|slot| slot.id == slot_id)
    }

    /// Count of slots holding a photo
    pub fn uploaded(&self) -> usize {
        self.slots.iter().filter(|slot| slot.has_photo()).count()
    }

    pub fn has_any(&self) -> bool {
        self.uploaded() > 0
    }

    /// Overwrite a slot's URL; the primary flag is left alone
    pub fn set_photo(&mut self, slot_id: u8, url: impl Into<String>) -> Result<(), PhotoError> {
        let slot = self.slot_mut(slot_id)?;
        slot.url = Some(url.into());
        Ok(())
    }

    pub fn clear_photo(&mut self, slot_id: u8) -> Result<(), PhotoError> {
        let slot = self.slot_mut(slot_id)?;
        slot.url = None;
        Ok(())
    }

    /// Make one slot the only primary. Unknown slots leave everything untouched.
    pub fn make_primary(&mut self, slot_id: u8) -> Result<(), PhotoError> {
        if self.get(slot_id).is_none() {
            return Err(PhotoError::UnknownSlot(slot_id));
        }
        self.set_primary(slot_id);
        debug!(slot_id, "primary photo slot changed");
        Ok(())
    }

    /// URL of the primary slot, else the first uploaded photo in slot order
    pub fn primary_url(&self) -> Option<&str> {
        self.slots
            .iter()
            .find(|slot| slot.is_primary && slot.has_photo())
            .or_else(|| self.slots.iter().find(|slot| slot.has_photo()))
            .and_then(|slot| slot.url.as_deref())
    }

    /// Uploaded URLs in slot order
    pub fn urls(&self) -> Vec<String> {
        self.slots.iter().filter_map(|slot| slot.url.clone()).collect()
    }

    /// One entry per slot, `None` where the slot is empty
    pub fn positions(&self) -> Vec<Option<String>> {
        self.slots.iter().map(|slot| slot.url.clone()).collect()
    }

    fn set_primary(&mut self, slot_id: u8) {
        for slot in &mut self.slots {
            slot.is_primary = slot.id == slot_id;
        }
    }

    fn slot_mut(&mut self, slot_id: u8) -> Result<&mut PhotoSlot, PhotoError> {
        self.slots
            .iter_mut()
            .find(|slot| slot.id == slot_id)
            .ok_or(PhotoError::UnknownSlot(slot_id))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PhotoError {
    #[error("photo slot {0} does not exist (slots are 1-4)")]
    UnknownSlot(u8),
}

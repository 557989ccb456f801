//! Photo and audio handles attached to the scene.
//!
//! Binary data never passes through here; the store hands out opaque
//! handles (URLs or paths) and the library pairs them with frame slots.

use fnv::FnvHashMap;

use crate::constants::MEDIA_SLOT_SCAN;
use crate::error::CollaboratorError;

/// Opaque reference to a stored resource.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct MediaHandle(pub String);

impl MediaHandle {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Key-value blob store collaborator.
pub trait MediaStore {
    fn put_image(&mut self, index: usize, source: &str) -> Result<MediaHandle, CollaboratorError>;
    fn image(&self, index: usize) -> Result<Option<MediaHandle>, CollaboratorError>;
    fn delete_image(&mut self, index: usize) -> Result<(), CollaboratorError>;
    fn put_audio(&mut self, title: &str, source: &str) -> Result<MediaHandle, CollaboratorError>;
    fn audio_titles(&self) -> Result<Vec<String>, CollaboratorError>;
    fn delete_audio(&mut self, title: &str) -> Result<(), CollaboratorError>;
}

/// In-process store; handles are the sources themselves.
#[derive(Default, Debug)]
pub struct MemoryMediaStore {
    images: FnvHashMap<usize, MediaHandle>,
    audio: Vec<(String, MediaHandle)>,
}

impl MediaStore for MemoryMediaStore {
    fn put_image(&mut self, index: usize, source: &str) -> Result<MediaHandle, CollaboratorError> {
        let handle = MediaHandle(source.to_string());
        self.images.insert(index, handle.clone());
        Ok(handle)
    }

    fn image(&self, index: usize) -> Result<Option<MediaHandle>, CollaboratorError> {
        Ok(self.images.get(&index).cloned())
    }

    fn delete_image(&mut self, index: usize) -> Result<(), CollaboratorError> {
        self.images.remove(&index);
        Ok(())
    }

    fn put_audio(&mut self, title: &str, source: &str) -> Result<MediaHandle, CollaboratorError> {
        let handle = MediaHandle(source.to_string());
        match self.audio.iter_mut().find(|(t, _)| t == title) {
            Some(entry) => entry.1 = handle.clone(),
            None => self.audio.push((title.to_string(), handle.clone())),
        }
        Ok(handle)
    }

    fn audio_titles(&self) -> Result<Vec<String>, CollaboratorError> {
        Ok(self.audio.iter().map(|(t, _)| t.clone()).collect())
    }

    fn delete_audio(&mut self, title: &str) -> Result<(), CollaboratorError> {
        self.audio.retain(|(t, _)| t != title);
        Ok(())
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MediaSlot {
    pub handle: MediaHandle,
    pub rotation_degrees: u16,
}

impl MediaSlot {
    /// Texture rotation applied to the photo plane.
    pub fn texture_rotation(&self) -> f32 {
        -(self.rotation_degrees as f32).to_radians() + std::f32::consts::PI
    }
}

/// Frame-indexed photo slots plus the viewer selection.
#[derive(Default, Debug)]
pub struct MediaLibrary {
    slots: FnvHashMap<usize, MediaSlot>,
    viewing: Option<usize>,
}

impl MediaLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pull every stored image in the scanned index range.
    pub fn load(store: &dyn MediaStore) -> Result<Self, CollaboratorError> {
        let mut lib = Self::new();
        for index in 0..MEDIA_SLOT_SCAN {
            if let Some(handle) = store.image(index)? {
                lib.slots.insert(
                    index,
                    MediaSlot {
                        handle,
                        rotation_degrees: 0,
                    },
                );
            }
        }
        log::info!("[media] loaded {} photo(s)", lib.slots.len());
        Ok(lib)
    }

    pub fn slot(&self, index: usize) -> Option<&MediaSlot> {
        self.slots.get(&index)
    }

    pub fn has_image(&self, index: usize) -> bool {
        self.slots.contains_key(&index)
    }

    /// Store `source` in slot `index`, replacing any previous photo.
    pub fn upload(
        &mut self,
        store: &mut dyn MediaStore,
        index: usize,
        source: &str,
    ) -> Result<(), CollaboratorError> {
        let handle = store.put_image(index, source)?;
        self.slots.insert(
            index,
            MediaSlot {
                handle,
                rotation_degrees: 0,
            },
        );
        log::info!("[media] slot {} updated", index);
        Ok(())
    }

    /// Quarter turn clockwise. Returns the new rotation, if the slot is filled.
    pub fn rotate(&mut self, index: usize) -> Option<u16> {
        let slot = self.slots.get_mut(&index)?;
        slot.rotation_degrees = (slot.rotation_degrees + 90) % 360;
        Some(slot.rotation_degrees)
    }

    pub fn delete(&mut self, store: &mut dyn MediaStore, index: usize) -> Result<(), CollaboratorError> {
        store.delete_image(index)?;
        self.slots.remove(&index);
        if self.viewing == Some(index) {
            self.viewing = None;
        }
        log::info!("[media] slot {} cleared", index);
        Ok(())
    }

    pub fn open_viewer(&mut self, index: usize) -> bool {
        if self.has_image(index) {
            self.viewing = Some(index);
            true
        } else {
            false
        }
    }

    pub fn close_viewer(&mut self) {
        self.viewing = None;
    }

    pub fn viewing(&self) -> Option<usize> {
        self.viewing
    }
}

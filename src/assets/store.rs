use std::collections::HashMap;
use std::path::{Path, PathBuf};

use rayon::prelude::*;

use crate::assets::decode::{PreparedImage, decode_image};
use crate::assets::source::read_image_bytes;
use crate::foundation::error::{ShortreelError, ShortreelResult};
use crate::foundation::math::Fnv1a64;
use crate::project::model::{ImageRef, ImageSource};
use crate::project::state::ProjectState;

/// Stable hashed identifier of a prepared image, derived from its source.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct AssetId(pub(crate) u64);

impl AssetId {
    /// Identifier for an image source. Equal sources share one id.
    pub fn for_source(source: &ImageSource) -> Self {
        let mut hasher = Fnv1a64::new_default();
        match source {
            ImageSource::Path(p) => {
                hasher.write_u8(b'P');
                hasher.write_bytes(p.to_string_lossy().as_bytes());
            }
            ImageSource::DataUrl(url) => {
                hasher.write_u8(b'D');
                hasher.write_bytes(url.as_bytes());
            }
        }
        Self(hasher.finish())
    }

    /// Access raw 64-bit identifier.
    pub fn as_u64(self) -> u64 {
        self.0
    }
}

/// Immutable store of decoded images, built before the frame loop so frames never touch IO.
#[derive(Clone, Debug, Default)]
pub struct PreparedAssetStore {
    root: PathBuf,
    images: HashMap<AssetId, PreparedImage>,
}

impl PreparedAssetStore {
    /// Empty store resolving relative paths against `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            images: HashMap::new(),
        }
    }

    /// Decode every image the project references (background, thumbnail, segments).
    ///
    /// Loads run in parallel and join all-or-nothing: the first failure is returned and no
    /// store is produced.
    #[tracing::instrument(skip(state, root))]
    pub fn prepare(state: &ProjectState, root: impl Into<PathBuf>) -> ShortreelResult<Self> {
        let mut store = Self::new(root);
        store.load_all(referenced_images(state))?;
        tracing::debug!(images = store.len(), "assets prepared");
        Ok(store)
    }

    /// Decode and add `images`, skipping ones already present.
    pub fn load_all<'a>(
        &mut self,
        images: impl IntoIterator<Item = &'a ImageRef>,
    ) -> ShortreelResult<()> {
        let mut pending = Vec::<(AssetId, &ImageRef)>::new();
        for img in images {
            let id = AssetId::for_source(&img.source);
            if self.images.contains_key(&id) || pending.iter().any(|(p, _)| *p == id) {
                continue;
            }
            pending.push((id, img));
        }

        let root = self.root.as_path();
        let decoded = pending
            .par_iter()
            .map(|(id, img)| load_one(img, root).map(|prepared| (*id, prepared)))
            .collect::<ShortreelResult<Vec<_>>>()?;
        self.images.extend(decoded);
        Ok(())
    }

    /// Root directory used when resolving relative image paths.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Lookup a prepared image by id.
    pub fn image(&self, id: AssetId) -> ShortreelResult<&PreparedImage> {
        self.images
            .get(&id)
            .ok_or_else(|| ShortreelError::evaluation(format!("unknown AssetId {}", id.as_u64())))
    }

    /// Lookup the prepared image for a reference.
    pub fn image_for(&self, img: &ImageRef) -> Option<(AssetId, &PreparedImage)> {
        let id = AssetId::for_source(&img.source);
        self.images.get(&id).map(|p| (id, p))
    }

    /// Number of prepared images.
    pub fn len(&self) -> usize {
        self.images.len()
    }

    /// Whether the store holds no images.
    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }
}

/// Every image a render of `state` can draw.
pub(crate) fn referenced_images(state: &ProjectState) -> Vec<&ImageRef> {
    state
        .background
        .iter()
        .chain(state.thumbnail.image.iter())
        .chain(state.segments.iter().filter_map(|s| s.image.as_ref()))
        .collect()
}

fn load_one(img: &ImageRef, root: &Path) -> ShortreelResult<PreparedImage> {
    let label = describe(img);
    let bytes = read_image_bytes(&img.source, root)
        .map_err(|e| ShortreelError::asset(format!("failed to load image {label}: {e}")))?;
    decode_image(&bytes)
        .map_err(|e| ShortreelError::asset(format!("failed to decode image {label}: {e}")))
}

fn describe(img: &ImageRef) -> String {
    match (&img.name, &img.source) {
        (Some(name), _) => format!("'{name}'"),
        (None, ImageSource::Path(p)) => format!("'{}'", p.display()),
        (None, ImageSource::DataUrl(_)) => "(inline data URL)".to_owned(),
    }
}

#[cfg(test)]
#[path = "../../tests/unit/assets/store.rs"]
mod tests;

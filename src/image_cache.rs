//! Single-entry decoded image cache keyed by image source.
//!
//! A scene has at most one background image, so one slot is enough: the
//! cached value is reused while the source is unchanged and replaced as soon
//! as a different source is requested.

#[cfg(test)]
#[path = "image_cache_test.rs"]
mod image_cache_test;

/// Holds the decoded form of the most recently requested image source.
pub struct ImageCache<T> {
    entry: Option<(String, T)>,
}

impl<T> ImageCache<T> {
    #[must_use]
    pub fn new() -> Self {
        Self { entry: None }
    }

    /// Return the decoded value for `source`, decoding only when the source changed.
    ///
    /// # Errors
    ///
    /// Propagates the decoder's error. The previous entry is dropped in that case.
    pub fn get_or_decode<E>(&mut self, source: &str, decode: impl FnOnce(&str) -> Result<T, E>) -> Result<&T, E> {
        let fresh = match self.entry.take() {
            Some((cached, value)) if cached == source => (cached, value),
            _ => (source.to_owned(), decode(source)?),
        };
        let (_, value) = self.entry.insert(fresh);
        Ok(value)
    }

    /// The source currently cached, if any.
    #[must_use]
    pub fn source(&self) -> Option<&str> {
        self.entry.as_ref().map(|(source, _)| source.as_str())
    }

    /// Drop the cached value.
    pub fn clear(&mut self) {
        self.entry = None;
    }
}

impl<T> Default for ImageCache<T> {
    fn default() -> Self {
        Self::new()
    }
}

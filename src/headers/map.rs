use std::collections::{HashMap, hash_map};

/// HTTP header fields, keyed by lower-cased field name.
///
/// Each name maps to exactly one value. [`insert`] replaces any previous value, which means a
/// repeated field in a request keeps only its last occurrence. Use [`append`] to join values
/// into a single comma separated list instead.
///
/// Names passed to any method are compared case-insensitively.
///
/// ```rust
/// use h1wire::headers::HeaderMap;
///
/// let mut map = HeaderMap::new();
/// map.insert("Content-Type", "text/html");
/// assert_eq!(map.get("content-type"), Some("text/html"));
/// assert_eq!(map.get("CONTENT-TYPE"), Some("text/html"));
/// ```
///
/// [`insert`]: HeaderMap::insert
/// [`append`]: HeaderMap::append
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct HeaderMap {
    fields: HashMap<String, String>,
}

impl HeaderMap {
    /// Create new empty [`HeaderMap`].
    ///
    /// This function does not allocate.
    #[inline]
    pub fn new() -> Self {
        Self {
            fields: HashMap::new(),
        }
    }

    /// Returns the number of fields.
    #[inline]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Returns `true` if the map has no field.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Returns `true` if the map contains a value for given field name.
    #[inline]
    pub fn contains_key(&self, name: &str) -> bool {
        self.fields.contains_key(&*lowercase(name))
    }

    /// Returns the value of the given field name.
    #[inline]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.fields.get(&*lowercase(name)).map(String::as_str)
    }

    /// Insert a field, returning the previous value if any.
    pub fn insert(&mut self, name: impl AsRef<str>, value: impl Into<String>) -> Option<String> {
        self.fields
            .insert(name.as_ref().to_ascii_lowercase(), value.into())
    }

    /// Insert a field, or join the value to the existing one with `", "`.
    ///
    /// ```rust
    /// use h1wire::headers::HeaderMap;
    ///
    /// let mut map = HeaderMap::new();
    /// map.append("Trailer", "X-Content-Sha256");
    /// map.append("Trailer", "X-Content-Length");
    /// assert_eq!(map.get("trailer"), Some("X-Content-Sha256, X-Content-Length"));
    /// ```
    pub fn append(&mut self, name: impl AsRef<str>, value: impl AsRef<str>) {
        match self.fields.entry(name.as_ref().to_ascii_lowercase()) {
            hash_map::Entry::Occupied(mut entry) => {
                let current = entry.get_mut();
                current.push_str(", ");
                current.push_str(value.as_ref());
            }
            hash_map::Entry::Vacant(entry) => {
                entry.insert(value.as_ref().to_owned());
            }
        }
    }

    /// Returns a mutable reference to the value of the given field name.
    #[inline]
    pub fn get_mut(&mut self, name: &str) -> Option<&mut String> {
        self.fields.get_mut(&*lowercase(name))
    }

    /// Remove a field, returning its value if it was present.
    #[inline]
    pub fn remove(&mut self, name: &str) -> Option<String> {
        self.fields.remove(&*lowercase(name))
    }

    /// Returns an iterator over fields as name and value pair.
    ///
    /// Iteration order is unspecified.
    #[inline]
    pub fn iter(&self) -> Iter<'_> {
        Iter {
            iter: self.fields.iter(),
        }
    }
}

fn lowercase(name: &str) -> std::borrow::Cow<'_, str> {
    if name.bytes().any(|b| b.is_ascii_uppercase()) {
        std::borrow::Cow::Owned(name.to_ascii_lowercase())
    } else {
        std::borrow::Cow::Borrowed(name)
    }
}

impl<'a> IntoIterator for &'a HeaderMap {
    type Item = (&'a str, &'a str);

    type IntoIter = Iter<'a>;

    #[inline]
    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<K: AsRef<str>, V: Into<String>> FromIterator<(K, V)> for HeaderMap {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        let mut map = HeaderMap::new();
        for (name, value) in iter {
            map.insert(name, value);
        }
        map
    }
}

/// Iterator over [`HeaderMap`] fields.
#[derive(Debug)]
pub struct Iter<'a> {
    iter: hash_map::Iter<'a, String, String>,
}

impl<'a> Iterator for Iter<'a> {
    type Item = (&'a str, &'a str);

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        self.iter
            .next()
            .map(|(name, value)| (name.as_str(), value.as_str()))
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        self.iter.size_hint()
    }
}

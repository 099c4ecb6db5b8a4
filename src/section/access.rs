use super::*;

impl Section {
    /// Look up the raw value under `container'key`.
    pub fn find_value(&self, path: &str) -> Option<&Value> {
        let (container, key) = resolver::split_last(path);
        let section = match container {
            Some(container) => self.find(container)?,
            None => self,
        };
        section.attributes.get(key)
    }

    /// Get a typed value using `'`-separated paths.
    ///
    /// # Examples
    /// ```
    /// # use xcl::Section;
    /// # fn main() -> Result<(), xcl::XclError> {
    /// let config: Section = "[server]\nhost = s'localhost\nport = u'8080\n".parse()?;
    /// let host: String = config.get("server'host")?;
    /// let port: u64 = config.get("server'port")?;
    /// assert_eq!((host.as_str(), port), ("localhost", 8080));
    /// # Ok(())
    /// # }
    /// ```
    ///
    /// # Errors
    /// [`XclError::NotFound`] if nothing is stored there, [`XclError::TypeMismatch`]
    /// if the stored tag is not the one `T` expects.
    pub fn get<T>(&self, path: &str) -> Result<T, XclError>
    where
        T: TryFrom<Value, Error = XclError>,
    {
        self.get_optional(path)?
            .ok_or_else(|| XclError::not_found(path))
    }

    /// Get an optional typed value - returns `None` if the key doesn't exist.
    ///
    /// A value stored under a different tag is still an error.
    pub fn get_optional<T>(&self, path: &str) -> Result<Option<T>, XclError>
    where
        T: TryFrom<Value, Error = XclError>,
    {
        match self.find_value(path) {
            Some(value) => T::try_from(value.clone())
                .map(Some)
                .map_err(|e| e.at_path(path)),
            None => Ok(None),
        }
    }

    /// Get a value with a fallback default.
    ///
    /// The default also covers a value stored under a different tag; use
    /// [`Section::get_optional`] to see the type mismatch.
    pub fn get_or<T>(&self, path: &str, default: T) -> T
    where
        T: TryFrom<Value, Error = XclError>,
    {
        self.get(path).unwrap_or(default)
    }

    /// Check if a value exists under `path`, whatever its type.
    pub fn has(&self, path: &str) -> bool {
        self.find_value(path).is_some()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.attributes.keys().map(String::as_str)
    }

    pub fn section_names(&self) -> impl Iterator<Item = &str> {
        self.sections.keys().map(String::as_str)
    }
}

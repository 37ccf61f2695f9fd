//! Persisted dark/light theme preference

use super::error::SessionError;
use std::fmt;
use std::path::{Path, PathBuf};

/// Storage key for the theme value
pub const THEME_KEY: &str = "visionflow-theme";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Theme {
    #[default]
    Dark,
    Light,
}

impl Theme {
    pub fn as_str(&self) -> &'static str {
        match self {
            Theme::Dark => "dark",
            Theme::Light => "light",
        }
    }

    /// Only an exact `"dark"` is dark; any other stored value reads as light.
    pub fn from_stored(value: &str) -> Self {
        if value == "dark" {
            Theme::Dark
        } else {
            Theme::Light
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            Theme::Dark => Theme::Light,
            Theme::Light => Theme::Dark,
        }
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// String key/value storage for preferences.
#[cfg_attr(test, mockall::automock)]
pub trait ThemeStore {
    fn get(&self, key: &str) -> Result<Option<String>, SessionError>;

    fn set(&mut self, key: &str, value: &str) -> Result<(), SessionError>;
}

/// Stores each key as a small file in a directory
#[derive(Debug, Clone)]
pub struct FileThemeStore {
    dir: PathBuf,
}

impl FileThemeStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(key)
    }
}

impl ThemeStore for FileThemeStore {
    fn get(&self, key: &str) -> Result<Option<String>, SessionError> {
        let path = self.path_for(key);
        match std::fs::read_to_string(&path) {
            Ok(value) => Ok(Some(value.trim().to_string())),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(SessionError::ThemeStore(format!("{:?}: {}", path, e))),
        }
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), SessionError> {
        std::fs::create_dir_all(&self.dir)
            .map_err(|e| SessionError::ThemeStore(format!("{:?}: {}", self.dir, e)))?;
        let path = self.path_for(key);
        std::fs::write(&path, value)
            .map_err(|e| SessionError::ThemeStore(format!("{:?}: {}", path, e)))
    }
}

/// Current theme plus the store it is persisted to
#[derive(Debug)]
pub struct ThemeController<S: ThemeStore> {
    store: S,
    theme: Theme,
}

impl<S: ThemeStore> ThemeController<S> {
    /// Read the stored theme, writing `"dark"` if nothing is stored yet
    pub fn load_or_init(mut store: S) -> Result<Self, SessionError> {
        let theme = match store.get(THEME_KEY)? {
            Some(value) => Theme::from_stored(&value),
            None => {
                store.set(THEME_KEY, Theme::Dark.as_str())?;
                tracing::debug!("No stored theme, initialised to dark");
                Theme::Dark
            }
        };
        Ok(Self { store, theme })
    }

    pub fn theme(&self) -> Theme {
        self.theme
    }

    pub fn is_dark(&self) -> bool {
        self.theme == Theme::Dark
    }

    pub fn set(&mut self, theme: Theme) -> Result<(), SessionError> {
        self.store.set(THEME_KEY, theme.as_str())?;
        self.theme = theme;
        Ok(())
    }

    /// Flip the theme and persist it
    pub fn toggle(&mut self) -> Result<Theme, SessionError> {
        self.set(self.theme.toggled())?;
        tracing::info!("Theme switched to {}", self.theme);
        Ok(self.theme)
    }

    pub fn into_store(self) -> S {
        self.store
    }
}

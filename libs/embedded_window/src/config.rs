use crate::{Error, Result};

/// Window geometry of a [`WindowedReader`](crate::WindowedReader).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Config {
    chunk_size: usize,
    window_size: usize,
}

impl Config {
    /// 1 KiB alignment, 16 KiB windows.
    pub const DEFAULT: Config = Config {
        chunk_size: 1024,
        window_size: 16 * 1024,
    };

    /// 32 KiB alignment, 256 KiB windows. Fewer, larger reads for bulk input.
    pub const LARGE: Config = Config {
        chunk_size: 32 * 1024,
        window_size: 256 * 1024,
    };

    /// Creates a custom geometry.
    /// `chunk_size` must be a power of two and `window_size` non-zero.
    /// ```
    /// # use embedded_window::{Config, Error};
    /// let config = Config::new(4096, 64 * 1024).unwrap();
    /// assert_eq!(config.chunk_size(), 4096);
    /// assert_eq!(Config::new(1000, 4096), Err(Error::InvalidConfig));
    /// ```
    pub const fn new(chunk_size: usize, window_size: usize) -> Result<Self> {
        if !chunk_size.is_power_of_two() || window_size == 0 {
            return Err(Error::InvalidConfig);
        }
        Ok(Config {
            chunk_size,
            window_size,
        })
    }

    pub const fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    pub const fn window_size(&self) -> usize {
        self.window_size
    }
}

impl Default for Config {
    fn default() -> Self {
        Config::DEFAULT
    }
}

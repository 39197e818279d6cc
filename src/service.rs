use std::fmt;

/// A streaming service playlists can be copied from or to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Service {
    Spotify,
    YouTube,
}

impl Service {
    pub const ALL: [Service; 2] = [Service::Spotify, Service::YouTube];

    /// Resolve a 1-based menu entry.
    pub fn from_menu(choice: usize) -> Option<Self> {
        choice
            .checked_sub(1)
            .and_then(|index| Self::ALL.get(index).copied())
    }

    pub fn menu_number(self) -> usize {
        match self {
            Service::Spotify => 1,
            Service::YouTube => 2,
        }
    }

    /// Key used for the cached credential file of this provider.
    pub fn credential_key(self) -> &'static str {
        match self {
            Service::Spotify => "spotify",
            Service::YouTube => "youtube",
        }
    }

    /// Menu line, e.g. `1. Spotify | 2. YouTube`.
    pub fn menu() -> String {
        Self::ALL
            .iter()
            .map(|s| format!("{}. {}", s.menu_number(), s))
            .collect::<Vec<_>>()
            .join(" | ")
    }
}

impl fmt::Display for Service {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Service::Spotify => write!(f, "Spotify"),
            Service::YouTube => write!(f, "YouTube"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_menu_numbers_round_trip() {
        for service in Service::ALL {
            assert_eq!(Service::from_menu(service.menu_number()), Some(service));
        }
    }

    #[test]
    fn test_out_of_range_menu_choice() {
        assert_eq!(Service::from_menu(0), None);
        assert_eq!(Service::from_menu(3), None);
    }

    #[test]
    fn test_menu_text() {
        assert_eq!(Service::menu(), "1. Spotify | 2. YouTube");
    }
}
